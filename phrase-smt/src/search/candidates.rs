//! Phrase candidates for every source span of a sentence

use crate::feature::FeatureSet;
use crate::rule_table::{NodeId, RuleTable, TargetRule};
use crate::sentence::Sentence;
use crate::types::Cost;
use std::rc::Rc;

/// Candidates for one source span, cheapest approximate cost first
#[derive(Debug, Clone)]
pub struct PhraseCandidateCollection {
    rules: Vec<Rc<TargetRule>>,
    approximate_costs: Vec<Cost>,
    usable: usize,
}

impl PhraseCandidateCollection {
    fn new(
        rules: Vec<TargetRule>,
        begin: usize,
        end: usize,
        features: &FeatureSet,
        max_target_phrase_count: usize,
    ) -> Self {
        let mut scored: Vec<(Cost, TargetRule)> = rules
            .into_iter()
            .map(|rule| (features.approximate_cost(begin, end, &rule), rule))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        let usable = scored.len().min(max_target_phrase_count);
        let (approximate_costs, rules) = scored
            .into_iter()
            .map(|(cost, rule)| (cost, Rc::new(rule)))
            .unzip();
        PhraseCandidateCollection {
            rules,
            approximate_costs,
            usable,
        }
    }

    /// Rules the decoder may expand with, at most `max_target_phrase_count`
    pub fn usable_rules(&self) -> &[Rc<TargetRule>] {
        &self.rules[..self.usable]
    }

    pub fn rules(&self) -> &[Rc<TargetRule>] {
        &self.rules
    }

    pub fn approximate_costs(&self) -> &[Cost] {
        &self.approximate_costs
    }

    /// Cheapest approximate cost, +∞ when there are no candidates
    pub fn best_approximate_cost(&self) -> Cost {
        self.approximate_costs
            .first()
            .copied()
            .unwrap_or(Cost::INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.usable == 0
    }
}

/// Candidate collections for all spans `[begin, begin + len)` of one sentence
#[derive(Debug)]
pub struct PhraseCandidateCollector {
    /// `spans[begin][len - 1]`
    spans: Vec<Vec<Option<PhraseCandidateCollection>>>,
    max_phrase_len: usize,
}

impl PhraseCandidateCollector {
    pub fn collect(
        sentence: &Sentence,
        rule_table: &RuleTable,
        features: &FeatureSet,
        max_target_phrase_count: usize,
    ) -> Self {
        let tree = rule_table.prefix_tree();
        let tokens = sentence.tokens();
        let mut spans = Vec::with_capacity(tokens.len());
        let mut max_phrase_len = 0;

        for begin in 0..tokens.len() {
            let mut row = Vec::new();
            let mut frontier: Vec<NodeId> = vec![tree.root_node()];

            for end in begin + 1..=tokens.len() {
                let token = &tokens[end - 1];
                let next: Vec<NodeId> = frontier
                    .iter()
                    .flat_map(|&node| {
                        token
                            .word_indexes
                            .iter()
                            .filter_map(move |&word| tree.follow(node, word))
                    })
                    .collect();

                let mut rules: Vec<TargetRule> = next
                    .iter()
                    .flat_map(|&node| tree.target_rules(node).iter().cloned())
                    .collect();

                if end - begin == 1 {
                    for &word in &token.word_indexes {
                        if let Some(special) = rule_table.special_token_rules(word) {
                            rules.extend(special.iter().cloned());
                        }
                    }
                    if rules.is_empty() {
                        rules.extend(rule_table.unknown_word_rules().iter().cloned());
                    }
                } else if next.is_empty() {
                    break;
                }

                if rules.is_empty() {
                    row.push(None);
                } else {
                    max_phrase_len = max_phrase_len.max(end - begin);
                    row.push(Some(PhraseCandidateCollection::new(
                        rules,
                        begin,
                        end,
                        features,
                        max_target_phrase_count,
                    )));
                }

                if next.is_empty() {
                    break;
                }
                frontier = next;
            }
            spans.push(row);
        }

        PhraseCandidateCollector {
            spans,
            max_phrase_len,
        }
    }

    /// Candidates for `[begin, begin + len)`, if any rule matches it
    pub fn get(&self, begin: usize, len: usize) -> Option<&PhraseCandidateCollection> {
        if len == 0 {
            return None;
        }
        self.spans
            .get(begin)
            .and_then(|row| row.get(len - 1))
            .and_then(|cell| cell.as_ref())
            .filter(|collection| !collection.is_empty())
    }

    /// Longest source phrase with at least one candidate
    pub fn max_phrase_len(&self) -> usize {
        self.max_phrase_len
    }

    pub fn sentence_len(&self) -> usize {
        self.spans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::PhraseTable;
    use crate::sentence::Token;
    use crate::testing::{rule_table, sentence};

    fn features() -> FeatureSet {
        FeatureSet::new().with(Box::new(PhraseTable::new(vec![1.0])))
    }

    #[test]
    fn test_collects_every_matching_span() {
        let (table, vocab) = rule_table(&[
            ("a", "X", 1.0),
            ("b", "Y", 1.0),
            ("a b", "W", 1.5),
            ("a b c d", "V", 0.1),
        ]);
        let sentence = sentence(&vocab, "a b c");
        let collector = PhraseCandidateCollector::collect(&sentence, &table, &features(), 100);

        assert_eq!(collector.get(0, 1).unwrap().rules().len(), 1);
        assert_eq!(collector.get(0, 2).unwrap().best_approximate_cost(), 1.5);
        // "a b c" is a prefix of a stored phrase but has no rule itself
        assert!(collector.get(0, 3).is_none());
        assert!(collector.get(1, 2).is_none());
        assert_eq!(collector.max_phrase_len(), 2);
    }

    #[test]
    fn test_unknown_words_fall_back() {
        let (table, vocab) = rule_table(&[("a", "X", 1.0)]);
        let sentence = sentence(&vocab, "a zzz");
        let collector = PhraseCandidateCollector::collect(&sentence, &table, &features(), 100);

        let fallback = collector.get(1, 1).unwrap();
        assert!(fallback.usable_rules()[0].pass_through);
    }

    #[test]
    fn test_special_tokens_replace_fallback() {
        let (mut table, mut vocab) = rule_table(&[("a", "X", 1.0)]);
        let number = vocab.source.intern("$number");
        let digits = vocab.target.intern("42");
        table.register_special_token(number, vec![TargetRule::new(vec![digits], vec![0.0])]);

        let sentence = Sentence::new(vec![Token::new("42", vec![number])]);
        let collector = PhraseCandidateCollector::collect(&sentence, &table, &features(), 100);
        let rules = collector.get(0, 1).unwrap().usable_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target, vec![digits]);
    }

    #[test]
    fn test_candidates_ranked_and_capped() {
        let (table, vocab) = rule_table(&[
            ("a", "X", 3.0),
            ("a", "Y", 1.0),
            ("a", "Z", 2.0),
        ]);
        let sentence = sentence(&vocab, "a");
        let collector = PhraseCandidateCollector::collect(&sentence, &table, &features(), 2);

        let collection = collector.get(0, 1).unwrap();
        assert_eq!(collection.approximate_costs(), &[1.0, 2.0, 3.0]);
        assert_eq!(collection.usable_rules().len(), 2);
        assert_eq!(collection.best_approximate_cost(), 1.0);
    }

    #[test]
    fn test_alternative_interpretations_are_followed() {
        let (table, mut vocab) = rule_table(&[("a", "X", 1.0), ("b c", "Y", 2.0)]);
        let a = vocab.source.intern("a");
        let b = vocab.source.intern("b");
        let c = vocab.source.intern("c");
        let sentence = Sentence::new(vec![
            Token::new("a|b", vec![a, b]),
            Token::new("c", vec![c]),
        ]);
        let collector = PhraseCandidateCollector::collect(&sentence, &table, &features(), 100);
        assert_eq!(collector.get(0, 2).unwrap().best_approximate_cost(), 2.0);
        assert_eq!(collector.get(0, 1).unwrap().best_approximate_cost(), 1.0);
    }
}
