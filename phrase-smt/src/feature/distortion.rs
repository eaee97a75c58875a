//! Distance-based reordering cost
//!
//! Jumping from the end of the previous phrase to the start of the next one
//! costs `weight * |begin - previous_end|`. While a gap is left behind the
//! latest phrase, the jump back to it is charged in advance as a
//! position-specific rest cost.

use super::{Extension, FeatureFunction, FeatureState, Scored};
use crate::search::coverage::Coverage;
use crate::types::Cost;

#[derive(Debug, Clone)]
pub struct DistortionModel {
    weight: Cost,
}

impl DistortionModel {
    pub fn new(weight: Cost) -> Self {
        DistortionModel { weight }
    }
}

impl FeatureFunction for DistortionModel {
    fn name(&self) -> &str {
        "DistortionModel"
    }

    fn initial_state(&self) -> FeatureState {
        FeatureState::Position(0)
    }

    fn score(&self, extension: &Extension<'_>) -> Scored {
        let previous_end = match extension.previous_state {
            FeatureState::Position(pos) => *pos,
            _ => 0,
        };
        let jump = extension.begin.abs_diff(previous_end);
        Scored {
            cost: self.weight * jump as Cost,
            state: FeatureState::Position(extension.end),
        }
    }

    fn supports_position_rest_cost(&self) -> bool {
        true
    }

    fn position_rest_cost(&self, coverage: &Coverage, _begin: usize, end: usize) -> Cost {
        match coverage.first_uncovered() {
            Some(first) if first < end => self.weight * (end - first) as Cost,
            _ => 0.0,
        }
    }
}
