//! Cardinality-by-cardinality beam search over one sentence

use super::candidates::PhraseCandidateCollector;
use super::cardinality::CardinalityHypothesisContainer;
use super::coverage::Coverage;
use super::hypothesis::Hypothesis;
use super::rest_cost::RestCostMatrix;
use crate::config::DecoderConfig;
use crate::error::{DecodeResult, DecoderError};
use crate::feature::FeatureSet;
use crate::rule_table::{RuleTable, TargetRule};
use crate::sentence::Sentence;
use crate::types::Cost;
use std::rc::Rc;
use tracing::{debug, warn};

/// Read-only collaborators of a decode, shared across sentences
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub config: &'a DecoderConfig,
    pub features: &'a FeatureSet,
    pub rule_table: &'a RuleTable,
}

/// One phrase of the best translation
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPhrase {
    pub begin: usize,
    pub end: usize,
    pub rule: TargetRule,
}

/// Best complete translation found for a sentence
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSentence {
    /// Phrases in target order
    pub phrases: Vec<DecodedPhrase>,
    pub cost: Cost,
    /// Complete hypotheses merged into the winner
    pub alternatives: usize,
}

/// Counters collected while decoding, for logging and inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStatistics {
    pub hypotheses_created: usize,
    pub pruned_by_jump_limit: usize,
    pub pruned_by_run_constraint: usize,
    pub pruned_pre_insertion: usize,
}

pub struct Decoder<'a> {
    context: DecodeContext<'a>,
    sentence: &'a Sentence,
    collector: PhraseCandidateCollector,
    rest_costs: RestCostMatrix,
    containers: Vec<CardinalityHypothesisContainer>,
    statistics: DecodeStatistics,
}

impl<'a> Decoder<'a> {
    /// Collect phrase candidates and build the rest-cost matrix for `sentence`
    pub fn new(context: DecodeContext<'a>, sentence: &'a Sentence) -> Self {
        let collector = PhraseCandidateCollector::collect(
            sentence,
            context.rule_table,
            context.features,
            context.config.max_target_phrase_count,
        );
        let rest_costs = RestCostMatrix::build(&collector);
        Decoder {
            context,
            sentence,
            collector,
            rest_costs,
            containers: Vec::new(),
            statistics: DecodeStatistics::default(),
        }
    }

    pub fn decode(&mut self) -> DecodeResult<DecodedSentence> {
        let sentence_len = self.sentence.len();
        if sentence_len == 0 {
            return Ok(DecodedSentence {
                phrases: Vec::new(),
                cost: 0.0,
                alternatives: 0,
            });
        }

        let DecodeContext {
            config, features, ..
        } = self.context;
        self.containers = (0..=sentence_len)
            .map(|_| CardinalityHypothesisContainer::new(config))
            .collect();
        self.statistics = DecodeStatistics::default();

        let root = Rc::new(Hypothesis::root(sentence_len, features));
        self.containers[0].insert_new_hypothesis(root, features);

        let max_phrase_len = self.collector.max_phrase_len();
        for new_cardinality in 1..=sentence_len {
            let before = self.statistics;
            let min_previous = new_cardinality.saturating_sub(max_phrase_len);
            let (done, pending) = self.containers.split_at_mut(new_cardinality);
            let current = &mut pending[0];

            for (previous_cardinality, previous) in
                done.iter().enumerate().skip(min_previous)
            {
                if previous.is_empty() {
                    warn!(
                        "Previous cardinality {} is empty while building {}",
                        previous_cardinality, new_cardinality
                    );
                    continue;
                }
                let phrase_len = new_cardinality - previous_cardinality;

                for (previous_coverage, bucket) in previous.buckets() {
                    if bucket.is_empty() {
                        warn!(
                            "Empty bucket {} in cardinality {}",
                            previous_coverage, previous_cardinality
                        );
                        continue;
                    }

                    for begin in 0..=sentence_len - phrase_len {
                        let end = begin + phrase_len;
                        if !previous_coverage.is_range_free(begin, end) {
                            continue;
                        }
                        let coverage = previous_coverage.with_range(begin, end);

                        if !conforms_jump_limit(&coverage, end, config.hard_reordering_jump_limit) {
                            self.statistics.pruned_by_jump_limit += 1;
                            continue;
                        }
                        if let Some(limit) = config.reordering_constraint_maximum_runs {
                            if !conforms_run_constraint(&coverage, limit) {
                                self.statistics.pruned_by_run_constraint += 1;
                                continue;
                            }
                        }
                        let Some(candidates) = self.collector.get(begin, phrase_len) else {
                            continue;
                        };

                        let mut rest_cost = self.rest_costs.rest_cost(&coverage);
                        if config.do_compute_position_specific_rest_costs {
                            rest_cost += features.position_rest_cost(&coverage, begin, end);
                        }

                        for previous_node in bucket.nodes() {
                            for rule in candidates.usable_rules() {
                                let node = Hypothesis::extend(
                                    previous_node,
                                    begin,
                                    end,
                                    &coverage,
                                    Rc::clone(rule),
                                    rest_cost,
                                    features,
                                );
                                self.statistics.hypotheses_created += 1;
                                if config.do_prune_pre_insertion
                                    && current.must_be_pruned(node.total_cost())
                                {
                                    self.statistics.pruned_pre_insertion += 1;
                                    continue;
                                }
                                current.insert_new_hypothesis(Rc::new(node), features);
                            }
                        }
                    }
                }
            }

            current.finalize_pruning_and_cleanup();
            debug!(
                "Cardinality {}: {} nodes in {} coverages, best {:.4}, created {}, pruned by jump limit {}, pre-insertion {}",
                new_cardinality,
                current.total_nodes(),
                current.buckets().count(),
                current.best_cost(),
                self.statistics.hypotheses_created - before.hypotheses_created,
                self.statistics.pruned_by_jump_limit - before.pruned_by_jump_limit,
                self.statistics.pruned_pre_insertion - before.pruned_pre_insertion,
            );
        }

        let full = Coverage::full(sentence_len);
        let goal = self.containers[sentence_len]
            .bucket_mut(&full)
            .and_then(|bucket| {
                bucket.finalize_recombination(config.keep_recombined);
                bucket.nodes().first().cloned()
            })
            .ok_or_else(|| DecoderError::NoTranslationFound(self.sentence.to_string()))?;

        Ok(DecodedSentence {
            phrases: goal
                .phrases()
                .into_iter()
                .map(|(begin, end, rule)| DecodedPhrase {
                    begin,
                    end,
                    rule: rule.as_ref().clone(),
                })
                .collect(),
            cost: goal.cost(),
            alternatives: goal.recombined_count(),
        })
    }

    pub fn statistics(&self) -> DecodeStatistics {
        self.statistics
    }

    pub fn collector(&self) -> &PhraseCandidateCollector {
        &self.collector
    }

    pub fn rest_costs(&self) -> &RestCostMatrix {
        &self.rest_costs
    }

    /// Container for `cardinality` as left by the last `decode()`
    pub fn cardinality(&self, cardinality: usize) -> Option<&CardinalityHypothesisContainer> {
        self.containers.get(cardinality)
    }
}

/// The new phrase may not end further than `limit` positions from the first
/// still-uncovered one
fn conforms_jump_limit(coverage: &Coverage, end: usize, limit: usize) -> bool {
    match coverage.first_uncovered() {
        Some(first) => first.abs_diff(end) <= limit,
        None => true,
    }
}

/// At most `limit` uncovered positions may lie before the last covered one
fn conforms_run_constraint(coverage: &Coverage, limit: usize) -> bool {
    let Some(last) = coverage.last_covered() else {
        return true;
    };
    let gaps = (0..last).filter(|&pos| !coverage.test(pos)).count();
    gaps <= limit
}
