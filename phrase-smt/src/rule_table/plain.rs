//! Plain text rule table reader
//!
//! One rule per line, fields separated by `#`:
//!
//! ```text
//! 1.2 0.7 # X # das Haus # the house # 12 3
//! ```
//!
//! 1. Costs, space separated
//! 2. Left-hand side: `X` for phrases; hierarchical `S` rules are skipped
//! 3. Source phrase
//! 4. Target phrase
//! 5. Further fields (counts, extra models) are ignored
//!
//! A source side of `<unknown-word>` defines the unknown-word rule.

use super::{PrefixTree, RuleTable, TargetRule};
use crate::error::{DecodeResult, DecoderError};
use crate::types::{Cost, UNKNOWN_WORD};
use crate::vocab::Vocabulary;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const COSTS_FIELD: usize = 0;
const LHS_FIELD: usize = 1;
const SOURCE_FIELD: usize = 2;
const TARGET_FIELD: usize = 3;
const MIN_FIELDS: usize = 4;

/// Load a rule table file, interning its words into `vocab`
///
/// When `pass_through_fallback` is set and the file has no unknown-word rule,
/// a pass-through rule with zero costs is synthesized; otherwise the missing
/// rule is a fatal [`DecoderError::RuleTable`].
pub fn load_plain_rule_table(
    path: &Path,
    vocab: &mut Vocabulary,
    pass_through_fallback: bool,
) -> DecodeResult<RuleTable> {
    info!("Loading plain text rule table from: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        DecoderError::Io(format!(
            "Failed to read rule table '{}': {}",
            path.display(),
            e
        ))
    })?;
    let tree = parse_plain_rule_table(&content, vocab)?;
    info!(
        "Rule table loaded: {} rules, longest source phrase {}",
        tree.rule_count(),
        tree.max_depth()
    );

    if pass_through_fallback {
        let columns = cost_columns(&tree);
        RuleTable::with_unknown_word_fallback(tree, vec![0.0; columns])
    } else {
        RuleTable::new(tree)
    }
}

/// Parse rule table text into a prefix tree
///
/// The first accepted line fixes the number of cost columns; later lines with
/// fewer costs are skipped with a warning.
pub fn parse_plain_rule_table(content: &str, vocab: &mut Vocabulary) -> DecodeResult<PrefixTree> {
    let mut tree = PrefixTree::new();
    let mut cost_columns: Option<usize> = None;

    for (line_idx, line) in content.lines().enumerate() {
        let line_number = line_idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('#').collect();
        if fields.len() < MIN_FIELDS {
            return Err(DecoderError::Parse(format!(
                "Bad rule table format in line {}: {}",
                line_number, line
            )));
        }

        if fields[LHS_FIELD].trim() == "S" {
            continue;
        }

        let costs = match parse_costs(fields[COSTS_FIELD]) {
            Some(costs) if !costs.is_empty() => costs,
            _ => {
                warn!("Ignoring rule with invalid costs at line: {}", line_number);
                continue;
            }
        };
        let columns = *cost_columns.get_or_insert(costs.len());
        if costs.len() < columns {
            warn!("Invalid count of costs at line: {}", line_number);
            continue;
        }

        let source_words: Vec<&str> = fields[SOURCE_FIELD].split_whitespace().collect();
        let target_words: Vec<&str> = fields[TARGET_FIELD].split_whitespace().collect();
        if source_words.is_empty() {
            warn!("Ignoring rule with empty source side at line: {}", line_number);
            continue;
        }
        if target_words.is_empty() {
            warn!("Ignoring rule with empty target side at line: {}", line_number);
            continue;
        }

        let source: Vec<_> = source_words
            .iter()
            .map(|w| {
                if *w == UNKNOWN_WORD {
                    vocab.source.index_of(w)
                } else {
                    vocab.source.intern(w)
                }
            })
            .collect();
        let target: Vec<_> = target_words.iter().map(|w| vocab.target.intern(w)).collect();

        tree.insert(&source, TargetRule::new(target, costs));
    }

    Ok(tree)
}

fn parse_costs(field: &str) -> Option<Vec<Cost>> {
    field
        .split_whitespace()
        .map(|c| c.parse::<Cost>().ok().filter(|v| v.is_finite()))
        .collect()
}

fn cost_columns(tree: &PrefixTree) -> usize {
    tree.rules().map(|rule| rule.costs.len()).max().unwrap_or(1)
}
