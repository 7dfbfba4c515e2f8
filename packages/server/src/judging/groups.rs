use common::{Actor, Permission};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use tracing::info;

use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::{evaluator, judging_group};

const MAX_GROUP_NAME_LEN: usize = 64;

fn validate_group_name(name: &str) -> JudgingResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(JudgingError::Validation(format!(
            "Group name must be 1-{MAX_GROUP_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Judging group management and evaluator membership.
pub struct GroupService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> GroupService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> JudgingResult<Vec<judging_group::Model>> {
        judging_group::Entity::find()
            .order_by_asc(judging_group::Column::Id)
            .all(self.conn)
            .await
            .context("listing judging groups")
    }

    pub async fn create(&self, actor: &Actor, name: &str) -> JudgingResult<judging_group::Model> {
        ensure(actor, Permission::ManageJudgingGroups)?;
        let name = validate_group_name(name)?;

        let group = judging_group::ActiveModel {
            name: Set(name),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("creating a judging group")?;

        info!(actor_id = actor.id, group_id = group.id, "Judging group created");
        Ok(group)
    }

    /// Rename and/or (de)activate a group. Deactivation keeps existing assignments.
    pub async fn update(
        &self,
        actor: &Actor,
        group_id: i32,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> JudgingResult<judging_group::Model> {
        ensure(actor, Permission::ManageJudgingGroups)?;
        const CTX: &str = "updating a judging group";

        let group = judging_group::Entity::find_by_id(group_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Judging group {group_id}")))?;

        let mut active: judging_group::ActiveModel = group.into();
        if let Some(name) = name {
            active.name = Set(validate_group_name(name)?);
        }
        if let Some(is_active) = is_active {
            active.is_active = Set(is_active);
        }
        let group = active.update(self.conn).await.context(CTX)?;

        info!(
            actor_id = actor.id,
            group_id,
            is_active = group.is_active,
            "Judging group updated"
        );
        Ok(group)
    }

    /// Put an evaluator in `group_id`, or in no group with `None`.
    pub async fn assign_evaluator(
        &self,
        actor: &Actor,
        evaluator_id: i32,
        group_id: Option<i32>,
    ) -> JudgingResult<evaluator::Model> {
        ensure(actor, Permission::AssignEvaluatorGroups)?;
        const CTX: &str = "assigning an evaluator to a group";

        let account = evaluator::Entity::find_by_id(evaluator_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Evaluator {evaluator_id}")))?;

        if let Some(group_id) = group_id {
            judging_group::Entity::find_by_id(group_id)
                .one(self.conn)
                .await
                .context(CTX)?
                .ok_or_else(|| JudgingError::NotFound(format!("Judging group {group_id}")))?;
        }

        let mut active: evaluator::ActiveModel = account.into();
        active.group_id = Set(group_id);
        let account = active.update(self.conn).await.context(CTX)?;

        info!(actor_id = actor.id, evaluator_id, group_id = ?group_id, "Evaluator group assigned");
        Ok(account)
    }
}
