//! Future-cost estimates for partially translated sentences
//!
//! `M[start][len - 1]` is the cheapest approximate cost of translating
//! `[start, start + len)` on its own, with any segmentation. It is built once
//! per sentence by interval dynamic programming over the candidate
//! collections and never over-estimates the cost of the span.

use super::candidates::PhraseCandidateCollector;
use super::coverage::Coverage;
use crate::types::Cost;

#[derive(Debug, Clone)]
pub struct RestCostMatrix {
    rows: Vec<Vec<Cost>>,
}

impl RestCostMatrix {
    pub fn build(collector: &PhraseCandidateCollector) -> Self {
        let max_len = collector.max_phrase_len();
        Self::from_span_costs(collector.sentence_len(), |start, len| {
            if len > max_len {
                return None;
            }
            collector
                .get(start, len)
                .map(|collection| collection.best_approximate_cost())
        })
    }

    /// Build from direct span costs; `None` marks spans without a phrase
    pub fn from_span_costs<F>(sentence_len: usize, direct: F) -> Self
    where
        F: Fn(usize, usize) -> Option<Cost>,
    {
        let mut rows: Vec<Vec<Cost>> = (0..sentence_len)
            .map(|start| vec![Cost::INFINITY; sentence_len - start])
            .collect();

        for len in 1..=sentence_len {
            for start in 0..=sentence_len - len {
                let mut best = direct(start, len).unwrap_or(Cost::INFINITY);
                for split in 1..len {
                    let combined = rows[start][split - 1] + rows[start + split][len - split - 1];
                    if combined < best {
                        best = combined;
                    }
                }
                rows[start][len - 1] = best;
            }
        }
        RestCostMatrix { rows }
    }

    /// Estimated cost of `[start, start + len)`
    pub fn get(&self, start: usize, len: usize) -> Cost {
        self.rows[start][len - 1]
    }

    /// Sum of the estimates of every maximal uncovered run of `coverage`
    pub fn rest_cost(&self, coverage: &Coverage) -> Cost {
        coverage
            .uncovered_runs()
            .into_iter()
            .map(|(start, len)| self.get(start, len))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{FeatureSet, PhraseTable};
    use crate::search::candidates::PhraseCandidateCollector;
    use crate::testing::{rule_table, sentence};
    use proptest::prelude::*;

    #[test]
    fn test_combines_shorter_spans() {
        let (table, vocab) = rule_table(&[
            ("a", "X", 1.0),
            ("b", "Y", 1.0),
            ("c", "Z", 1.0),
            ("a b", "W", 1.5),
        ]);
        let features = FeatureSet::new().with(Box::new(PhraseTable::new(vec![1.0])));
        let sentence = sentence(&vocab, "a b c");
        let collector = PhraseCandidateCollector::collect(&sentence, &table, &features, 100);
        let matrix = RestCostMatrix::build(&collector);

        assert_eq!(matrix.get(0, 2), 1.5);
        assert_eq!(matrix.get(1, 2), 2.0);
        assert_eq!(matrix.get(0, 3), 2.5);

        let coverage = Coverage::new(3).with_range(1, 2);
        assert_eq!(matrix.rest_cost(&coverage), 2.0);
        assert_eq!(matrix.rest_cost(&Coverage::full(3)), 0.0);
    }

    #[test]
    fn test_unreachable_span_is_infinite() {
        let matrix = RestCostMatrix::from_span_costs(3, |start, len| {
            (start != 1 && len == 1).then_some(1.0)
        });
        assert_eq!(matrix.get(0, 1), 1.0);
        assert_eq!(matrix.get(1, 1), Cost::INFINITY);
        assert_eq!(matrix.get(0, 3), Cost::INFINITY);
    }

    /// Cheapest segmentation of `[start, start + len)` by brute force
    fn brute_force(direct: &[Vec<Option<Cost>>], start: usize, len: usize) -> Cost {
        let mut best = direct[start][len - 1].unwrap_or(Cost::INFINITY);
        for split in 1..len {
            let combined = brute_force(direct, start, split)
                + brute_force(direct, start + split, len - split);
            best = best.min(combined);
        }
        best
    }

    fn direct_costs() -> impl Strategy<Value = Vec<Vec<Option<Cost>>>> {
        (1usize..8).prop_flat_map(|n| {
            (0..n)
                .map(|start| {
                    prop::collection::vec(prop::option::of(0.0f64..10.0), n - start)
                })
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn prop_matrix_is_cheapest_segmentation(direct in direct_costs()) {
            let n = direct.len();
            let matrix = RestCostMatrix::from_span_costs(n, |start, len| direct[start][len - 1]);
            for start in 0..n {
                for len in 1..=n - start {
                    let expected = brute_force(&direct, start, len);
                    let actual = matrix.get(start, len);
                    if expected.is_infinite() {
                        prop_assert!(actual.is_infinite());
                    } else {
                        prop_assert!((actual - expected).abs() < 1e-9);
                    }
                    // never above a direct phrase
                    if let Some(cost) = direct[start][len - 1] {
                        prop_assert!(actual <= cost);
                    }
                }
            }
        }
    }
}
