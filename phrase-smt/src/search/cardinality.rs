//! Per-cardinality hypothesis stacks
//!
//! A cardinality container holds every hypothesis that has translated the
//! same number of source words, bucketed by exact coverage. It owns the two
//! pruning mechanisms of the search: a cost ceiling (`cost_limit`) checked
//! before insertion, and `prune()` which enforces the hard cap on the number
//! of hypotheses, keeping only nodes within the beam once the cap is exceeded.

use super::coverage::Coverage;
use super::hypothesis::Hypothesis;
use super::lexical::LexicalHypothesisContainer;
use crate::config::DecoderConfig;
use crate::feature::FeatureSet;
use crate::types::Cost;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct CardinalityHypothesisContainer {
    buckets: BTreeMap<Coverage, LexicalHypothesisContainer>,
    cost_limit: Cost,
    best_coverage: Option<Coverage>,
    worst_coverage: Option<Coverage>,
    total_nodes: usize,

    beam_width: Cost,
    max_size: usize,
    primary_coverage_share: usize,
    lazy_pruning_threshold: usize,
    keep_recombined: bool,
}

impl CardinalityHypothesisContainer {
    pub fn new(config: &DecoderConfig) -> Self {
        CardinalityHypothesisContainer {
            buckets: BTreeMap::new(),
            cost_limit: Cost::INFINITY,
            best_coverage: None,
            worst_coverage: None,
            total_nodes: 0,
            beam_width: config.search_beam_width,
            max_size: config.max_cardinality_container_size,
            primary_coverage_share: config.primary_coverage_share,
            lazy_pruning_threshold: config.lazy_pruning_threshold,
            keep_recombined: config.keep_recombined,
        }
    }

    /// Route `node` to the bucket of its coverage
    ///
    /// Returns `true` when the node was added rather than recombined.
    pub fn insert_new_hypothesis(&mut self, node: Rc<Hypothesis>, features: &FeatureSet) -> bool {
        let total_cost = node.total_cost();
        if total_cost + self.beam_width < self.cost_limit {
            self.cost_limit = total_cost + self.beam_width;
        }

        let coverage = node.coverage().clone();
        let bucket = self.buckets.entry(coverage.clone()).or_default();
        let grew = bucket.insert_hypothesis(node, features, self.keep_recombined);
        if grew {
            self.total_nodes += 1;
        }
        self.update_best_and_worst_locally(&coverage);

        if self.total_nodes > self.lazy_pruning_threshold {
            self.prune();
        }
        grew
    }

    /// True when a hypothesis of this total cost cannot survive
    pub fn must_be_pruned(&self, cost: Cost) -> bool {
        cost > self.cost_limit
    }

    /// Enforce the size cap
    ///
    /// Under the cap only the best/worst trackers are refreshed. Over it, up
    /// to `primary_coverage_share` nodes per coverage are reserved first and
    /// the rest of the capacity goes to the cheapest nodes within the beam.
    pub fn prune(&mut self) {
        if self.buckets.is_empty() {
            self.reset_trackers();
            return;
        }
        if self.total_nodes <= self.max_size {
            self.update_best_and_worst();
            return;
        }
        let bound = self.best_cost() + self.beam_width;

        let mut picked = vec![0usize; self.buckets.len()];
        let mut selected = 0;

        if self.primary_coverage_share > 0 {
            let mut order: Vec<(usize, Cost)> = self
                .buckets
                .values()
                .enumerate()
                .map(|(idx, bucket)| (idx, bucket.best_cost()))
                .collect();
            order.sort_by(|a, b| a.1.total_cmp(&b.1));
            let lengths: Vec<usize> = self.buckets.values().map(|b| b.len()).collect();
            for (idx, _) in order {
                if selected == self.max_size {
                    break;
                }
                let take = self
                    .primary_coverage_share
                    .min(lengths[idx])
                    .min(self.max_size - selected);
                picked[idx] = take;
                selected += take;
            }
        }

        while selected < self.max_size {
            let mut chosen: Option<(usize, Cost)> = None;
            for (idx, bucket) in self.buckets.values().enumerate() {
                let Some(node) = bucket.nodes().get(picked[idx]) else {
                    continue;
                };
                let cost = node.total_cost();
                if cost <= bound && chosen.is_none_or(|(_, best)| cost < best) {
                    chosen = Some((idx, cost));
                }
            }
            match chosen {
                Some((idx, _)) => {
                    picked[idx] += 1;
                    selected += 1;
                }
                None => break,
            }
        }

        for (bucket, keep) in self.buckets.values_mut().zip(&picked) {
            bucket.truncate(*keep);
        }
        self.remove_empty_buckets();
        self.update_best_and_worst();
        self.cost_limit = self.worst_cost();
    }

    /// Final pruning pass once a cardinality has been fully expanded
    pub fn finalize_pruning_and_cleanup(&mut self) {
        self.prune();
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&Coverage, &LexicalHypothesisContainer)> {
        self.buckets.iter()
    }

    pub fn bucket(&self, coverage: &Coverage) -> Option<&LexicalHypothesisContainer> {
        self.buckets.get(coverage)
    }

    pub fn bucket_mut(&mut self, coverage: &Coverage) -> Option<&mut LexicalHypothesisContainer> {
        self.buckets.get_mut(coverage)
    }

    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.total_nodes == 0
    }

    pub fn cost_limit(&self) -> Cost {
        self.cost_limit
    }

    pub fn best_coverage(&self) -> Option<&Coverage> {
        self.best_coverage.as_ref()
    }

    pub fn worst_coverage(&self) -> Option<&Coverage> {
        self.worst_coverage.as_ref()
    }

    /// Cheapest total cost over all buckets, +∞ when empty
    pub fn best_cost(&self) -> Cost {
        self.buckets
            .values()
            .map(|b| b.best_cost())
            .fold(Cost::INFINITY, Cost::min)
    }

    /// Most expensive surviving total cost, +∞ when empty
    pub fn worst_cost(&self) -> Cost {
        self.buckets
            .values()
            .map(|b| b.worst_cost())
            .reduce(Cost::max)
            .unwrap_or(Cost::INFINITY)
    }

    fn update_best_and_worst_locally(&mut self, coverage: &Coverage) {
        let Some(bucket) = self.buckets.get(coverage) else {
            return;
        };
        let (best, worst) = (bucket.best_cost(), bucket.worst_cost());

        let current_best = self
            .best_coverage
            .as_ref()
            .and_then(|c| self.buckets.get(c))
            .map(|b| b.best_cost());
        if current_best.is_none_or(|cost| best < cost) {
            self.best_coverage = Some(coverage.clone());
        }

        let current_worst = self
            .worst_coverage
            .as_ref()
            .and_then(|c| self.buckets.get(c))
            .map(|b| b.worst_cost());
        if current_worst.is_none_or(|cost| worst > cost) {
            self.worst_coverage = Some(coverage.clone());
        }
    }

    fn update_best_and_worst(&mut self) {
        self.best_coverage = None;
        self.worst_coverage = None;
        let mut best = Cost::INFINITY;
        let mut worst = Cost::NEG_INFINITY;
        for (coverage, bucket) in &self.buckets {
            if self.best_coverage.is_none() || bucket.best_cost() < best {
                best = bucket.best_cost();
                self.best_coverage = Some(coverage.clone());
            }
            if self.worst_coverage.is_none() || bucket.worst_cost() > worst {
                worst = bucket.worst_cost();
                self.worst_coverage = Some(coverage.clone());
            }
        }
        self.total_nodes = self.buckets.values().map(|b| b.len()).sum();
    }

    fn remove_empty_buckets(&mut self) {
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    fn reset_trackers(&mut self) {
        self.best_coverage = None;
        self.worst_coverage = None;
        self.total_nodes = 0;
        self.cost_limit = Cost::INFINITY;
    }
}
