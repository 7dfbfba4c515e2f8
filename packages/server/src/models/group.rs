use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{evaluator, judging_group};

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Deserialize, Default, PartialEq, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignEvaluatorGroupRequest {
    /// Target group, or `null` to remove the evaluator from their group.
    pub group_id: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct TransferGroupRequest {
    pub from_group_id: i32,
    pub to_group_id: i32,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

impl From<judging_group::Model> for GroupResponse {
    fn from(m: judging_group::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            is_active: m.is_active,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EvaluatorResponse {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub account_locked: bool,
    pub group_id: Option<i32>,
}

impl From<evaluator::Model> for EvaluatorResponse {
    fn from(m: evaluator::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            display_name: m.display_name,
            is_admin: m.is_admin,
            account_locked: m.account_locked,
            group_id: m.group_id,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GroupBlock {
    pub group_id: i32,
    pub entry_count: usize,
    /// First and last entry id of the block, `null` for an empty block.
    pub first_entry_id: Option<i32>,
    pub last_entry_id: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct PartitionResponse {
    pub contest_id: i32,
    pub assigned: usize,
    pub groups: Vec<GroupBlock>,
}

impl PartitionResponse {
    pub fn new(contest_id: i32, plan: Vec<common::partition::GroupAssignment>) -> Self {
        let groups: Vec<GroupBlock> = plan
            .into_iter()
            .map(|g| GroupBlock {
                group_id: g.group_id,
                entry_count: g.entry_ids.len(),
                first_entry_id: g.entry_ids.first().copied(),
                last_entry_id: g.entry_ids.last().copied(),
            })
            .collect();
        Self {
            contest_id,
            assigned: groups.iter().map(|g| g.entry_count).sum(),
            groups,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TransferResponse {
    pub contest_id: i32,
    pub from_group_id: i32,
    pub to_group_id: i32,
    pub moved: u64,
}
