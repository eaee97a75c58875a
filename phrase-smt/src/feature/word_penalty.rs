use super::{Extension, FeatureFunction, Scored};
use crate::rule_table::TargetRule;
use crate::types::Cost;

/// Constant cost per produced target word
#[derive(Debug, Clone)]
pub struct WordPenalty {
    weight: Cost,
}

impl WordPenalty {
    pub fn new(weight: Cost) -> Self {
        WordPenalty { weight }
    }
}

impl FeatureFunction for WordPenalty {
    fn name(&self) -> &str {
        "WordPenalty"
    }

    fn score(&self, extension: &Extension<'_>) -> Scored {
        let words = extension
            .rule
            .target_len(extension.end - extension.begin);
        Scored::stateless(self.weight * words as Cost)
    }

    fn approximate_cost(&self, begin: usize, end: usize, rule: &TargetRule) -> Cost {
        self.weight * rule.target_len(end - begin) as Cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_target_words() {
        let penalty = WordPenalty::new(0.5);
        let rule = TargetRule::new(vec![1, 2, 3], vec![]);
        assert_eq!(penalty.approximate_cost(0, 1, &rule), 1.5);
    }

    #[test]
    fn test_pass_through_counts_source_words() {
        let penalty = WordPenalty::new(1.0);
        let rule = TargetRule::pass_through(vec![]);
        assert_eq!(penalty.approximate_cost(2, 4, &rule), 2.0);
    }
}
