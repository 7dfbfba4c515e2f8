use chrono::{DateTime, Utc};
use common::{Scores, SkillLevel};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entry::LevelUpdateResponse;
use crate::entity::evaluation;
use crate::judging::evaluation::EvaluationInput;

#[derive(Deserialize, ToSchema)]
pub struct SubmitEvaluationRequest {
    pub entry_id: i32,
    #[serde(flatten)]
    pub scores: Scores,
    /// Suggested bracket for the entry.
    pub skill_level: Option<SkillLevel>,
}

impl SubmitEvaluationRequest {
    pub fn input(&self) -> EvaluationInput {
        EvaluationInput {
            scores: self.scores,
            skill_level: self.skill_level,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EditEvaluationRequest {
    #[serde(flatten)]
    pub scores: Scores,
    pub skill_level: Option<SkillLevel>,
}

impl EditEvaluationRequest {
    pub fn input(&self) -> EvaluationInput {
        EvaluationInput {
            scores: self.scores,
            skill_level: self.skill_level,
        }
    }
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Result of a claim. `entry_id` is `null` when there is nothing to judge.
#[derive(Serialize, ToSchema)]
pub struct ClaimResponse {
    pub entry_id: Option<i32>,
}

/// The entry an admin should review next; `null` when none is pending.
#[derive(Serialize, ToSchema)]
pub struct ReviewLevelResponse {
    pub entry_id: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct ReleaseResponse {
    /// The entry that was released, `null` if there was no outstanding claim.
    pub entry_id: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct EvaluationResponse {
    pub id: i32,
    pub entry_id: i32,
    pub evaluator_id: i32,
    pub creativity: f64,
    pub complexity: f64,
    pub execution: f64,
    pub interpretation: f64,
    pub total: f64,
    pub is_complete: bool,
    pub skill_level: Option<SkillLevel>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<evaluation::Model> for EvaluationResponse {
    fn from(m: evaluation::Model) -> Self {
        Self {
            total: m.scores().total(),
            id: m.id,
            entry_id: m.entry_id,
            evaluator_id: m.evaluator_id,
            creativity: m.creativity,
            complexity: m.complexity,
            execution: m.execution,
            interpretation: m.interpretation,
            is_complete: m.is_complete,
            skill_level: m.skill_level,
            created_at: m.created_at,
            completed_at: m.completed_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EvaluationResultResponse {
    pub evaluation: EvaluationResponse,
    /// Classifier run triggered by this evaluation; `null` if it failed after
    /// the evaluation was saved.
    pub level: Option<LevelUpdateResponse>,
}
