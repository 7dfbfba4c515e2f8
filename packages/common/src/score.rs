use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;
/// Sub-scores move in half points.
pub const SCORE_STEP: f64 = 0.5;

/// The four rubric sub-scores of an evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Scores {
    pub creativity: f64,
    pub complexity: f64,
    pub execution: f64,
    pub interpretation: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("{criterion} must be between 0 and 10, got {value}")]
    OutOfRange { criterion: &'static str, value: f64 },
    #[error("{criterion} must be a multiple of 0.5, got {value}")]
    NotOnStep { criterion: &'static str, value: f64 },
}

impl Scores {
    pub fn criteria(&self) -> [(&'static str, f64); 4] {
        [
            ("creativity", self.creativity),
            ("complexity", self.complexity),
            ("execution", self.execution),
            ("interpretation", self.interpretation),
        ]
    }

    /// Check every sub-score against the rubric range and step.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (criterion, value) in self.criteria() {
            // NaN fails the range check.
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(ScoreError::OutOfRange { criterion, value });
            }
            if (value / SCORE_STEP).fract() != 0.0 {
                return Err(ScoreError::NotOnStep { criterion, value });
            }
        }
        Ok(())
    }

    /// Derived total shown next to the sub-scores.
    pub fn total(&self) -> f64 {
        self.creativity + self.complexity + self.execution + self.interpretation
    }
}
