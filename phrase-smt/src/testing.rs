//! In-memory fixtures for unit tests

use crate::rule_table::{PrefixTree, RuleTable, TargetRule};
use crate::sentence::Sentence;
use crate::types::{Cost, WordIndex};
use crate::vocab::Vocabulary;

/// Cost of the pass-through rule for words missing from a test table
pub const UNKNOWN_WORD_COST: Cost = 10.0;

/// Build a one-column rule table from `(source, target, cost)` entries
pub fn rule_table(entries: &[(&str, &str, Cost)]) -> (RuleTable, Vocabulary) {
    let mut vocab = Vocabulary::new();
    let mut tree = PrefixTree::new();
    for (source, target, cost) in entries {
        let source: Vec<WordIndex> = source
            .split_whitespace()
            .map(|word| vocab.source.intern(word))
            .collect();
        let target = target
            .split_whitespace()
            .map(|word| vocab.target.intern(word))
            .collect();
        tree.insert(&source, TargetRule::new(target, vec![*cost]));
    }
    let table = RuleTable::with_unknown_word_fallback(tree, vec![UNKNOWN_WORD_COST])
        .expect("fixture table has an unknown-word rule");
    (table, vocab)
}

pub fn sentence(vocab: &Vocabulary, text: &str) -> Sentence {
    Sentence::from_text(text, &vocab.source)
}
