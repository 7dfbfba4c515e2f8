use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::contest;

#[derive(Deserialize, ToSchema)]
pub struct SetCurrentContestRequest {
    /// Contest to judge, or `null` to fall back to the most recent contest.
    pub contest_id: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct ContestResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub voting_enabled: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<contest::Model> for ContestResponse {
    fn from(m: contest::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            is_active: m.is_active,
            voting_enabled: m.voting_enabled,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CurrentContestResponse {
    /// `null` when no contest exists yet.
    pub contest: Option<ContestResponse>,
}
