use common::{Scores, SkillLevel};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One evaluator's scoring of one entry.
///
/// Rows start as placeholders (`is_complete = false`, zero scores) when an
/// entry is claimed and are completed on submission. `(entry_id, evaluator_id)`
/// is unique; see `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub entry_id: i32,
    #[sea_orm(belongs_to, from = "entry_id", to = "id", on_delete = "Cascade")]
    pub entry: HasOne<super::entry::Entity>,

    pub evaluator_id: i32,
    #[sea_orm(belongs_to, from = "evaluator_id", to = "id")]
    pub evaluator: HasOne<super::evaluator::Entity>,

    pub creativity: f64,
    pub complexity: f64,
    pub execution: f64,
    pub interpretation: f64,

    pub is_complete: bool,
    /// Bracket suggested by the evaluator.
    pub skill_level: Option<SkillLevel>,

    pub created_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

impl Model {
    pub fn scores(&self) -> Scores {
        Scores {
            creativity: self.creativity,
            complexity: self.complexity,
            execution: self.execution,
            interpretation: self.interpretation,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
