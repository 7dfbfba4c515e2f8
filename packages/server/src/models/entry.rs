use chrono::{DateTime, Utc};
use common::SkillLevel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::entry;
use crate::judging::classifier::LevelOutcome;

#[derive(Deserialize, ToSchema)]
pub struct FlagEntryRequest {
    /// Why the entry is held back from judging.
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SetEntryLevelRequest {
    pub skill_level: SkillLevel,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, ToSchema)]
pub struct EntryResponse {
    pub id: i32,
    pub contest_id: i32,
    pub title: String,
    pub author_kaid: Option<String>,
    pub author_name: Option<String>,
    /// `null` while the bracket is still to be decided.
    pub skill_level: Option<SkillLevel>,
    pub skill_level_locked: bool,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub disqualified: bool,
    pub is_winner: bool,
    pub assigned_group_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<entry::Model> for EntryResponse {
    fn from(m: entry::Model) -> Self {
        Self {
            id: m.id,
            contest_id: m.contest_id,
            title: m.title,
            author_kaid: m.author_kaid,
            author_name: m.author_name,
            skill_level: m.skill_level,
            skill_level_locked: m.skill_level_locked,
            flagged: m.flagged,
            flag_reason: m.flag_reason,
            disqualified: m.disqualified,
            is_winner: m.is_winner,
            assigned_group_id: m.assigned_group_id,
            created_at: m.created_at,
        }
    }
}

/// What an automatic classification did.
#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LevelChange {
    Locked,
    Promoted,
    Reclassified,
    Unchanged,
}

#[derive(Serialize, ToSchema)]
pub struct LevelUpdateResponse {
    pub entry_id: i32,
    pub change: LevelChange,
    /// The level after the run; `null` for locked entries and undecided ones.
    pub skill_level: Option<SkillLevel>,
}

impl LevelUpdateResponse {
    pub fn new(entry_id: i32, outcome: LevelOutcome) -> Self {
        let change = match outcome {
            LevelOutcome::Locked => LevelChange::Locked,
            LevelOutcome::Promoted(_) => LevelChange::Promoted,
            LevelOutcome::Reclassified(_) => LevelChange::Reclassified,
            LevelOutcome::Unchanged(_) => LevelChange::Unchanged,
        };
        Self {
            entry_id,
            change,
            skill_level: outcome.level(),
        }
    }
}
