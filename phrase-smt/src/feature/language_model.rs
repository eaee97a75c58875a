//! Target-side n-gram language model feature
//!
//! The state of a hypothesis is its last `order - 1` target words. Scores
//! are negated log10 probabilities scaled by the feature weight.

use super::{Extension, FeatureFunction, FeatureState, Scored};
use crate::lm::NGramModel;
use crate::rule_table::TargetRule;
use crate::types::{Cost, UNKNOWN_WORD_INDEX, WordIndex};
use crate::vocab::Vocabulary;

#[derive(Debug, Clone)]
pub struct LanguageModel {
    model: NGramModel,
    weight: Cost,
    sentence_start: WordIndex,
    sentence_end: WordIndex,
}

impl LanguageModel {
    pub fn new(model: NGramModel, weight: Cost, vocab: &Vocabulary) -> Self {
        LanguageModel {
            model,
            weight,
            sentence_start: vocab.sentence_start(),
            sentence_end: vocab.sentence_end(),
        }
    }

    /// Words the model sees for a rule; pass-through output is unknown to it
    fn target_words(rule: &TargetRule, source_len: usize) -> Vec<WordIndex> {
        if rule.pass_through {
            vec![UNKNOWN_WORD_INDEX; source_len]
        } else {
            rule.target.clone()
        }
    }

    /// Sum of log probabilities of `words` after `history`; `history` ends
    /// up holding the context for the next word
    fn extend_history(&self, history: &mut Vec<WordIndex>, words: &[WordIndex]) -> f64 {
        let context_len = self.model.order().saturating_sub(1);
        let mut log_prob = 0.0;
        for &word in words {
            log_prob += self.model.log_prob(history, word);
            history.push(word);
            if history.len() > context_len {
                let excess = history.len() - context_len;
                history.drain(..excess);
            }
        }
        log_prob
    }
}

impl FeatureFunction for LanguageModel {
    fn name(&self) -> &str {
        "LanguageModel"
    }

    fn initial_state(&self) -> FeatureState {
        FeatureState::History(vec![self.sentence_start])
    }

    fn score(&self, extension: &Extension<'_>) -> Scored {
        let mut history = match extension.previous_state {
            FeatureState::History(words) => words.clone(),
            _ => vec![self.sentence_start],
        };
        let mut words = Self::target_words(extension.rule, extension.end - extension.begin);
        if extension.is_final {
            words.push(self.sentence_end);
        }
        let log_prob = self.extend_history(&mut history, &words);
        Scored {
            cost: -log_prob * self.weight,
            state: FeatureState::History(history),
        }
    }

    /// Scores the phrase without any left context
    fn approximate_cost(&self, begin: usize, end: usize, rule: &TargetRule) -> Cost {
        let words = Self::target_words(rule, end - begin);
        let mut history = Vec::new();
        -self.extend_history(&mut history, &words) * self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::coverage::Coverage;

    const ARPA: &str = "\\data\\
ngram 1=4
ngram 2=2

\\1-grams:
-1.0\t<s>\t-0.5
-2.0\thouse\t-0.25
-3.0\t</s>
-1.5\tthe\t-0.3

\\2-grams:
-0.2\t<s> the
-0.4\tthe house

\\end\\
";

    fn model() -> (LanguageModel, Vocabulary) {
        let mut vocab = Vocabulary::new();
        let ngrams = NGramModel::from_arpa(ARPA, &mut vocab.target).unwrap();
        (LanguageModel::new(ngrams, 1.0, &vocab), vocab)
    }

    fn score(lm: &LanguageModel, state: &FeatureState, rule: &TargetRule, is_final: bool) -> Scored {
        let coverage = Coverage::new(2).with_range(0, 1);
        lm.score(&Extension {
            previous_state: state,
            begin: 0,
            end: 1,
            rule,
            coverage: &coverage,
            is_final,
        })
    }

    #[test]
    fn test_scores_with_sentence_start_context() {
        let (lm, vocab) = model();
        let the = vocab.target.index_of("the");
        let house = vocab.target.index_of("house");
        let rule = TargetRule::new(vec![the, house], vec![]);

        let scored = score(&lm, &lm.initial_state(), &rule, false);
        assert!((scored.cost - 0.6).abs() < 1e-9);
        assert_eq!(scored.state, FeatureState::History(vec![house]));
    }

    #[test]
    fn test_final_extension_adds_sentence_end() {
        let (lm, vocab) = model();
        let house = vocab.target.index_of("house");
        let rule = TargetRule::new(vec![house], vec![]);
        let state = FeatureState::History(vec![house]);

        // p(house | house) backs off: -0.25 + -2.0, then p(</s> | house): -0.25 + -3.0
        let scored = score(&lm, &state, &rule, true);
        assert!((scored.cost - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_approximate_cost_has_no_left_context() {
        let (lm, vocab) = model();
        let the = vocab.target.index_of("the");
        let house = vocab.target.index_of("house");
        let rule = TargetRule::new(vec![the, house], vec![]);
        assert!((lm.approximate_cost(0, 1, &rule) - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_pass_through_scores_unknown_words() {
        let (lm, _) = model();
        let rule = TargetRule::pass_through(vec![]);
        assert!((lm.approximate_cost(0, 2, &rule) - 20.0).abs() < 1e-9);
    }
}
