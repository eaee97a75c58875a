//! Rule table: the phrase inventory consulted by the candidate collector
//!
//! The search only uses three operations: [`PrefixTree::root_node`],
//! [`PrefixTree::follow`] and [`PrefixTree::target_rules`]. Everything else
//! here (special tokens, the unknown-word rule, loading) is set up once and
//! shared read-only across decodes.

pub mod plain;
pub mod prefix_tree;

pub use plain::{load_plain_rule_table, parse_plain_rule_table};
pub use prefix_tree::{NodeId, PrefixTree};

use crate::error::{DecodeResult, DecoderError};
use crate::types::{Cost, UNKNOWN_WORD_INDEX, WordIndex};
use std::collections::HashMap;

/// A candidate target phrase with its feature costs
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRule {
    /// Target word indexes
    pub target: Vec<WordIndex>,
    /// Rule-table cost columns, in table order
    pub costs: Vec<Cost>,
    /// Output the source words unchanged instead of `target`
    pub pass_through: bool,
}

impl TargetRule {
    pub fn new(target: Vec<WordIndex>, costs: Vec<Cost>) -> Self {
        TargetRule {
            target,
            costs,
            pass_through: false,
        }
    }

    /// Rule that copies its source word to the output
    pub fn pass_through(costs: Vec<Cost>) -> Self {
        TargetRule {
            target: Vec::new(),
            costs,
            pass_through: true,
        }
    }

    /// Number of target words this rule emits
    pub fn target_len(&self, source_len: usize) -> usize {
        if self.pass_through {
            source_len
        } else {
            self.target.len()
        }
    }
}

/// Prefix tree plus the single-word fallbacks the collector relies on
#[derive(Debug, Clone)]
pub struct RuleTable {
    tree: PrefixTree,
    special_tokens: HashMap<WordIndex, Vec<TargetRule>>,
    unknown_word_rules: Vec<TargetRule>,
}

impl RuleTable {
    /// Wrap a loaded tree
    ///
    /// # Errors
    ///
    /// `DecoderError::RuleTable` when the tree is empty or stores no rule for
    /// the unknown word; without that rule full coverage cannot be
    /// guaranteed.
    pub fn new(tree: PrefixTree) -> DecodeResult<Self> {
        if tree.rule_count() == 0 {
            return Err(DecoderError::RuleTable("Invalid empty rule table".to_string()));
        }
        let unknown_word_rules = tree
            .follow(tree.root_node(), UNKNOWN_WORD_INDEX)
            .map(|node| tree.target_rules(node).to_vec())
            .unwrap_or_default();
        if unknown_word_rules.is_empty() {
            return Err(DecoderError::RuleTable(
                "No rule defined for UNKNOWN word".to_string(),
            ));
        }
        Ok(RuleTable {
            tree,
            special_tokens: HashMap::new(),
            unknown_word_rules,
        })
    }

    /// Wrap a tree, synthesizing a pass-through unknown-word rule with the
    /// given costs when the tree has none
    pub fn with_unknown_word_fallback(
        mut tree: PrefixTree,
        fallback_costs: Vec<Cost>,
    ) -> DecodeResult<Self> {
        let has_unknown = tree
            .follow(tree.root_node(), UNKNOWN_WORD_INDEX)
            .is_some_and(|node| !tree.target_rules(node).is_empty());
        if !has_unknown {
            tree.insert(&[UNKNOWN_WORD_INDEX], TargetRule::pass_through(fallback_costs));
        }
        Self::new(tree)
    }

    pub fn prefix_tree(&self) -> &PrefixTree {
        &self.tree
    }

    /// Register rules used for `word` whenever it appears as a single token
    pub fn register_special_token(&mut self, word: WordIndex, rules: Vec<TargetRule>) {
        self.special_tokens.entry(word).or_default().extend(rules);
    }

    pub fn special_token_rules(&self, word: WordIndex) -> Option<&[TargetRule]> {
        self.special_tokens
            .get(&word)
            .filter(|rules| !rules.is_empty())
            .map(|rules| rules.as_slice())
    }

    pub fn unknown_word_rules(&self) -> &[TargetRule] {
        &self.unknown_word_rules
    }
}
