use super::{Extension, FeatureFunction, Scored};
use crate::rule_table::TargetRule;
use crate::types::Cost;

/// Weighted sum of the rule-table cost columns
#[derive(Debug, Clone)]
pub struct PhraseTable {
    weights: Vec<Cost>,
}

impl PhraseTable {
    /// Columns without a weight contribute nothing
    pub fn new(weights: Vec<Cost>) -> Self {
        PhraseTable { weights }
    }

    fn rule_cost(&self, rule: &TargetRule) -> Cost {
        self.weights
            .iter()
            .zip(&rule.costs)
            .map(|(weight, cost)| weight * cost)
            .sum()
    }
}

impl FeatureFunction for PhraseTable {
    fn name(&self) -> &str {
        "PhraseTable"
    }

    fn score(&self, extension: &Extension<'_>) -> Scored {
        Scored::stateless(self.rule_cost(extension.rule))
    }

    fn approximate_cost(&self, _begin: usize, _end: usize, rule: &TargetRule) -> Cost {
        self.rule_cost(rule)
    }
}
