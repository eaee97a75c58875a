//! Feature functions
//!
//! Every score the decoder assigns comes from a [`FeatureFunction`]. The
//! decoder consults the registered functions of a [`FeatureSet`] in a fixed
//! order; each one may keep an opaque [`FeatureState`] per hypothesis, and two
//! hypotheses recombine only when every function agrees that their states
//! lead to the same future.
//!
//! # Example
//!
//! ```ignore
//! use phrase_smt::feature::{FeatureSet, PhraseTable, WordPenalty};
//!
//! let mut features = FeatureSet::new();
//! features.push(Box::new(PhraseTable::new(vec![1.0, 0.5])));
//! features.push(Box::new(WordPenalty::new(-0.3)));
//! ```

pub mod distortion;
pub mod language_model;
pub mod phrase_table;
pub mod word_penalty;

pub use distortion::DistortionModel;
pub use language_model::LanguageModel;
pub use phrase_table::PhraseTable;
pub use word_penalty::WordPenalty;

use crate::rule_table::TargetRule;
use crate::search::coverage::Coverage;
use crate::types::{Cost, WordIndex};

/// Per-hypothesis state a feature function needs to score later extensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FeatureState {
    #[default]
    None,
    /// Most recent target words, oldest first
    History(Vec<WordIndex>),
    /// Source position right after the last translated phrase
    Position(usize),
}

/// One step of the search: `previous` extended by `rule` over `[begin, end)`
#[derive(Debug, Clone, Copy)]
pub struct Extension<'a> {
    /// This feature's state on the predecessor hypothesis
    pub previous_state: &'a FeatureState,
    pub begin: usize,
    pub end: usize,
    pub rule: &'a TargetRule,
    /// Coverage after the extension
    pub coverage: &'a Coverage,
    /// Set when the extension completes the sentence
    pub is_final: bool,
}

/// Score of one extension together with the state for the new hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub cost: Cost,
    pub state: FeatureState,
}

impl Scored {
    pub fn stateless(cost: Cost) -> Self {
        Scored {
            cost,
            state: FeatureState::None,
        }
    }
}

/// Capability set of a scorer consulted by the decoder
///
/// Implementations must not have side effects beyond returning costs and the
/// state of the new hypothesis.
pub trait FeatureFunction: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// State of the empty root hypothesis
    fn initial_state(&self) -> FeatureState {
        FeatureState::None
    }

    /// Score a new hypothesis extension
    fn score(&self, extension: &Extension<'_>) -> Scored;

    /// Context-free cost estimate of `rule` over `[begin, end)`, used for the
    /// rest-cost heuristic
    ///
    /// Either this or [`FeatureFunction::position_rest_cost`] should return 0.
    fn approximate_cost(&self, begin: usize, end: usize, rule: &TargetRule) -> Cost {
        let _ = (begin, end, rule);
        0.0
    }

    fn supports_position_rest_cost(&self) -> bool {
        false
    }

    /// Rest cost that depends on where the last phrase was placed
    fn position_rest_cost(&self, coverage: &Coverage, begin: usize, end: usize) -> Cost {
        let _ = (coverage, begin, end);
        0.0
    }

    /// Whether two hypotheses with these states score every continuation
    /// identically
    fn same_future(&self, first: &FeatureState, second: &FeatureState) -> bool {
        first == second
    }
}

/// Ordered list of active feature functions
#[derive(Default)]
pub struct FeatureSet {
    functions: Vec<Box<dyn FeatureFunction>>,
}

impl FeatureSet {
    pub fn new() -> Self {
        FeatureSet {
            functions: Vec::new(),
        }
    }

    pub fn push(&mut self, function: Box<dyn FeatureFunction>) -> &mut Self {
        self.functions.push(function);
        self
    }

    pub fn with(mut self, function: Box<dyn FeatureFunction>) -> Self {
        self.functions.push(function);
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name()).collect()
    }

    pub fn initial_states(&self) -> Vec<FeatureState> {
        self.functions.iter().map(|f| f.initial_state()).collect()
    }

    /// Sum of approximate costs over functions without position-specific
    /// rest costs
    pub fn approximate_cost(&self, begin: usize, end: usize, rule: &TargetRule) -> Cost {
        self.functions
            .iter()
            .filter(|f| !f.supports_position_rest_cost())
            .map(|f| f.approximate_cost(begin, end, rule))
            .sum()
    }

    pub fn position_rest_cost(&self, coverage: &Coverage, begin: usize, end: usize) -> Cost {
        self.functions
            .iter()
            .filter(|f| f.supports_position_rest_cost())
            .map(|f| f.position_rest_cost(coverage, begin, end))
            .sum()
    }

    /// Score an extension with every function, returning the incremental cost
    /// and the new per-function states
    pub fn score(
        &self,
        previous_states: &[FeatureState],
        begin: usize,
        end: usize,
        rule: &TargetRule,
        coverage: &Coverage,
        is_final: bool,
    ) -> (Cost, Vec<FeatureState>) {
        debug_assert_eq!(previous_states.len(), self.functions.len());
        let mut cost = 0.0;
        let mut states = Vec::with_capacity(self.functions.len());
        for (function, previous_state) in self.functions.iter().zip(previous_states) {
            let scored = function.score(&Extension {
                previous_state,
                begin,
                end,
                rule,
                coverage,
                is_final,
            });
            cost += scored.cost;
            states.push(scored.state);
        }
        (cost, states)
    }

    pub fn same_future(&self, first: &[FeatureState], second: &[FeatureState]) -> bool {
        self.functions
            .iter()
            .zip(first.iter().zip(second))
            .all(|(function, (a, b))| function.same_future(a, b))
    }
}

impl std::fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureSet")
            .field("functions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(Cost);

    impl FeatureFunction for Constant {
        fn name(&self) -> &str {
            "Constant"
        }
        fn score(&self, _extension: &Extension<'_>) -> Scored {
            Scored::stateless(self.0)
        }
        fn approximate_cost(&self, _begin: usize, _end: usize, _rule: &TargetRule) -> Cost {
            self.0
        }
    }

    #[test]
    fn test_score_sums_in_order() {
        let features = FeatureSet::new()
            .with(Box::new(Constant(1.0)))
            .with(Box::new(PhraseTable::new(vec![2.0])));
        let rule = TargetRule::new(vec![1], vec![0.5]);
        let coverage = Coverage::new(1).with_range(0, 1);

        let (cost, states) =
            features.score(&features.initial_states(), 0, 1, &rule, &coverage, true);
        assert_eq!(cost, 2.0);
        assert_eq!(states, vec![FeatureState::None, FeatureState::None]);
        assert_eq!(features.names(), vec!["Constant", "PhraseTable"]);
    }

    #[test]
    fn test_approximate_cost_skips_position_specific_functions() {
        let features = FeatureSet::new()
            .with(Box::new(Constant(1.0)))
            .with(Box::new(DistortionModel::new(3.0)));
        let rule = TargetRule::new(vec![1], vec![]);
        assert_eq!(features.approximate_cost(0, 1, &rule), 1.0);
    }

    #[test]
    fn test_same_future_requires_agreement() {
        let features = FeatureSet::new()
            .with(Box::new(Constant(0.0)))
            .with(Box::new(DistortionModel::new(1.0)));
        let a = vec![FeatureState::None, FeatureState::Position(2)];
        let b = vec![FeatureState::None, FeatureState::Position(2)];
        let c = vec![FeatureState::None, FeatureState::Position(3)];
        assert!(features.same_future(&a, &b));
        assert!(!features.same_future(&a, &c));
    }
}
