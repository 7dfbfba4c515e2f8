use common::{Permission, PermissionSet};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One boolean flag per [`Permission`], keyed by evaluator.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluator_permission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub evaluator_id: i32,
    #[sea_orm(belongs_to, from = "evaluator_id", to = "id")]
    pub evaluator: HasOne<super::evaluator::Entity>,

    pub judge_entries: bool,
    pub assign_entry_groups: bool,
    pub assign_evaluator_groups: bool,
    pub manage_judging_groups: bool,
    pub edit_entries: bool,
    pub view_all_evaluations: bool,
    pub edit_all_evaluations: bool,
    pub view_admin_stats: bool,
    pub manage_winners: bool,
}

impl Model {
    pub fn flag(&self, permission: Permission) -> bool {
        match permission {
            Permission::JudgeEntries => self.judge_entries,
            Permission::AssignEntryGroups => self.assign_entry_groups,
            Permission::AssignEvaluatorGroups => self.assign_evaluator_groups,
            Permission::ManageJudgingGroups => self.manage_judging_groups,
            Permission::EditEntries => self.edit_entries,
            Permission::ViewAllEvaluations => self.view_all_evaluations,
            Permission::EditAllEvaluations => self.edit_all_evaluations,
            Permission::ViewAdminStats => self.view_admin_stats,
            Permission::ManageWinners => self.manage_winners,
        }
    }

    pub fn to_set(&self) -> PermissionSet {
        Permission::ALL
            .iter()
            .copied()
            .filter(|p| self.flag(*p))
            .collect()
    }
}

impl ActiveModel {
    /// Flags for `evaluator_id` mirroring `set`.
    pub fn from_set(evaluator_id: i32, set: &PermissionSet) -> Self {
        Self {
            evaluator_id: Set(evaluator_id),
            judge_entries: Set(set.contains(Permission::JudgeEntries)),
            assign_entry_groups: Set(set.contains(Permission::AssignEntryGroups)),
            assign_evaluator_groups: Set(set.contains(Permission::AssignEvaluatorGroups)),
            manage_judging_groups: Set(set.contains(Permission::ManageJudgingGroups)),
            edit_entries: Set(set.contains(Permission::EditEntries)),
            view_all_evaluations: Set(set.contains(Permission::ViewAllEvaluations)),
            edit_all_evaluations: Set(set.contains(Permission::EditAllEvaluations)),
            view_admin_stats: Set(set.contains(Permission::ViewAdminStats)),
            manage_winners: Set(set.contains(Permission::ManageWinners)),
            ..Default::default()
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
