//! Hypotheses of one exact coverage
//!
//! Nodes are kept sorted by total cost. A new node with the same future as an
//! existing one is recombined with it instead of being added.

use super::hypothesis::Hypothesis;
use crate::feature::FeatureSet;
use crate::types::Cost;
use std::rc::Rc;

/// All hypotheses sharing one exact coverage, cheapest first
#[derive(Debug, Default)]
pub struct LexicalHypothesisContainer {
    nodes: Vec<Rc<Hypothesis>>,
}

impl LexicalHypothesisContainer {
    pub fn new() -> Self {
        LexicalHypothesisContainer { nodes: Vec::new() }
    }

    /// Insert `node`, recombining it with a same-future entry if there is one
    ///
    /// Returns `true` when the container grew by one node. With
    /// `keep_recombined` the dominated node stays reachable as an
    /// alternative of the cheaper one; otherwise it is dropped.
    pub fn insert_hypothesis(
        &mut self,
        node: Rc<Hypothesis>,
        features: &FeatureSet,
        keep_recombined: bool,
    ) -> bool {
        let found = self
            .nodes
            .iter()
            .position(|existing| existing.same_future(&node, features));

        let Some(idx) = found else {
            self.insert_sorted(node);
            return true;
        };

        // Ties keep the node that was there first
        if node.total_cost() < self.nodes[idx].total_cost() {
            let existing = self.nodes.remove(idx);
            if keep_recombined {
                node.absorb(existing);
            }
            self.insert_sorted(node);
        } else if keep_recombined {
            self.nodes[idx].absorb(node);
        }
        false
    }

    /// Collapse every node into the cheapest one
    pub fn finalize_recombination(&mut self, keep_recombined: bool) {
        if !keep_recombined || self.nodes.len() < 2 {
            return;
        }
        let rest = self.nodes.split_off(1);
        for other in rest {
            self.nodes[0].absorb(other);
        }
    }

    /// Cheapest total cost, or +∞ when empty
    pub fn best_cost(&self) -> Cost {
        self.nodes
            .first()
            .map(|n| n.total_cost())
            .unwrap_or(Cost::INFINITY)
    }

    pub fn worst_cost(&self) -> Cost {
        self.nodes
            .last()
            .map(|n| n.total_cost())
            .unwrap_or(Cost::INFINITY)
    }

    pub fn nodes(&self) -> &[Rc<Hypothesis>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keep only the `len` cheapest nodes
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    fn insert_sorted(&mut self, node: Rc<Hypothesis>) {
        let cost = node.total_cost();
        let pos = self.nodes.partition_point(|n| n.total_cost() <= cost);
        self.nodes.insert(pos, node);
    }
}
