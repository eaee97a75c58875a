//! Search-graph nodes

use super::coverage::Coverage;
use crate::feature::{FeatureSet, FeatureState};
use crate::rule_table::TargetRule;
use crate::types::Cost;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A partial translation: which source positions are covered, what it cost
/// to get here, and how it continues its predecessor
///
/// Everything except the recombination list is fixed at creation. Only the
/// lexical container that owns a node writes to that list.
pub struct Hypothesis {
    coverage: Coverage,
    cost: Cost,
    total_cost: Cost,
    begin: usize,
    end: usize,
    rule: Option<Rc<TargetRule>>,
    previous: Option<Rc<Hypothesis>>,
    states: Vec<FeatureState>,
    recombined: RefCell<Vec<Rc<Hypothesis>>>,
}

impl Hypothesis {
    /// The empty hypothesis every search starts from
    pub fn root(sentence_len: usize, features: &FeatureSet) -> Self {
        Hypothesis {
            coverage: Coverage::new(sentence_len),
            cost: 0.0,
            total_cost: 0.0,
            begin: 0,
            end: 0,
            rule: None,
            previous: None,
            states: features.initial_states(),
            recombined: RefCell::new(Vec::new()),
        }
    }

    /// Extend `previous` by translating `[begin, end)` with `rule`
    ///
    /// `coverage` is the coverage after the extension and `rest_cost` the
    /// heuristic cost of finishing from it.
    pub fn extend(
        previous: &Rc<Hypothesis>,
        begin: usize,
        end: usize,
        coverage: &Coverage,
        rule: Rc<TargetRule>,
        rest_cost: Cost,
        features: &FeatureSet,
    ) -> Self {
        debug_assert!(previous.coverage.is_range_free(begin, end));
        let is_final = coverage.is_complete();
        let (incremental, states) =
            features.score(&previous.states, begin, end, &rule, coverage, is_final);
        let cost = previous.cost + incremental;
        Hypothesis {
            coverage: coverage.clone(),
            cost,
            total_cost: cost + rest_cost,
            begin,
            end,
            rule: Some(rule),
            previous: Some(Rc::clone(previous)),
            states,
            recombined: RefCell::new(Vec::new()),
        }
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Accumulated cost of the translated part
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Accumulated cost plus the rest-cost estimate
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// Source span of the last phrase; empty for the root
    pub fn span(&self) -> (usize, usize) {
        (self.begin, self.end)
    }

    pub fn rule(&self) -> Option<&Rc<TargetRule>> {
        self.rule.as_ref()
    }

    pub fn previous(&self) -> Option<&Rc<Hypothesis>> {
        self.previous.as_ref()
    }

    pub fn states(&self) -> &[FeatureState] {
        &self.states
    }

    pub fn same_future(&self, other: &Hypothesis, features: &FeatureSet) -> bool {
        self.coverage == other.coverage && features.same_future(&self.states, &other.states)
    }

    /// Take `other` and all of its alternatives as alternatives of `self`
    pub fn absorb(&self, other: Rc<Hypothesis>) {
        let inherited: Vec<Rc<Hypothesis>> = other.recombined.borrow_mut().drain(..).collect();
        let mut recombined = self.recombined.borrow_mut();
        recombined.push(other);
        recombined.extend(inherited);
    }

    /// Number of hypotheses merged into this one
    pub fn recombined_count(&self) -> usize {
        self.recombined.borrow().len()
    }

    pub fn recombined(&self) -> Vec<Rc<Hypothesis>> {
        self.recombined.borrow().clone()
    }

    /// `(begin, end, rule)` of every phrase from the root to this node
    pub fn phrases(&self) -> Vec<(usize, usize, Rc<TargetRule>)> {
        let mut phrases = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            if let Some(rule) = &current.rule {
                phrases.push((current.begin, current.end, Rc::clone(rule)));
            }
            node = current.previous.as_deref();
        }
        phrases.reverse();
        phrases
    }
}

impl fmt::Debug for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hypothesis")
            .field("coverage", &self.coverage)
            .field("span", &(self.begin, self.end))
            .field("cost", &self.cost)
            .field("total_cost", &self.total_cost)
            .field("recombined", &self.recombined_count())
            .finish()
    }
}
