use common::partition::{GroupAssignment, PartitionError, plan_partition};
use common::{Actor, Permission};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionSession, TransactionTrait,
};
use tracing::info;

use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::{contest, entry, judging_group};

/// Which entries a partition run redistributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionScope {
    /// Every non-disqualified entry, overwriting existing assignments.
    All,
    /// Only non-disqualified entries without a group.
    Unassigned,
}

/// Distributes a contest's entries across the active judging groups.
pub struct GroupPartitioner<'a, C> {
    conn: &'a C,
}

impl<'a, C> GroupPartitioner<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn assign_all(
        &self,
        actor: &Actor,
        contest_id: i32,
    ) -> JudgingResult<Vec<GroupAssignment>> {
        self.partition(actor, contest_id, PartitionScope::All).await
    }

    pub async fn assign_new(
        &self,
        actor: &Actor,
        contest_id: i32,
    ) -> JudgingResult<Vec<GroupAssignment>> {
        self.partition(actor, contest_id, PartitionScope::Unassigned)
            .await
    }

    /// Split the scoped entries into contiguous, balanced blocks in ascending
    /// id order, one block per active group, inside a single transaction.
    pub async fn partition(
        &self,
        actor: &Actor,
        contest_id: i32,
        scope: PartitionScope,
    ) -> JudgingResult<Vec<GroupAssignment>> {
        ensure(actor, Permission::AssignEntryGroups)?;
        const CTX: &str = "assigning entries to groups";

        let txn = self.conn.begin().await.context(CTX)?;

        contest::Entity::find_by_id(contest_id)
            .one(&txn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Contest {contest_id}")))?;

        let group_ids: Vec<i32> = judging_group::Entity::find()
            .select_only()
            .column(judging_group::Column::Id)
            .filter(judging_group::Column::IsActive.eq(true))
            .order_by_asc(judging_group::Column::Id)
            .into_tuple()
            .all(&txn)
            .await
            .context(CTX)?;

        let mut eligible = entry::Entity::find()
            .select_only()
            .column(entry::Column::Id)
            .filter(entry::Column::ContestId.eq(contest_id))
            .filter(entry::Column::Disqualified.eq(false));
        if scope == PartitionScope::Unassigned {
            eligible = eligible.filter(entry::Column::AssignedGroupId.is_null());
        }
        let entry_ids: Vec<i32> = eligible
            .order_by_asc(entry::Column::Id)
            .into_tuple()
            .all(&txn)
            .await
            .context(CTX)?;

        let plan = plan_partition(&entry_ids, &group_ids).map_err(|e| match e {
            PartitionError::NoGroups => JudgingError::NoActiveGroups,
        })?;

        for block in plan.iter().filter(|b| !b.entry_ids.is_empty()) {
            entry::Entity::update_many()
                .set(entry::ActiveModel {
                    assigned_group_id: Set(Some(block.group_id)),
                    ..Default::default()
                })
                .filter(entry::Column::Id.is_in(block.entry_ids.clone()))
                .exec(&txn)
                .await
                .context(CTX)?;
        }

        txn.commit().await.context(CTX)?;

        info!(
            actor_id = actor.id,
            contest_id,
            ?scope,
            entries = entry_ids.len(),
            groups = plan.len(),
            "Partitioned entries across judging groups"
        );
        Ok(plan)
    }

    /// Move every entry of `contest_id` in `from_group` to `to_group`.
    ///
    /// Returns the number of entries moved.
    pub async fn transfer(
        &self,
        actor: &Actor,
        contest_id: i32,
        from_group: i32,
        to_group: i32,
    ) -> JudgingResult<u64> {
        ensure(actor, Permission::AssignEntryGroups)?;
        const CTX: &str = "transferring entry groups";

        contest::Entity::find_by_id(contest_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Contest {contest_id}")))?;
        judging_group::Entity::find_by_id(to_group)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Judging group {to_group}")))?;

        if from_group == to_group {
            return Ok(0);
        }

        let moved = entry::Entity::update_many()
            .set(entry::ActiveModel {
                assigned_group_id: Set(Some(to_group)),
                ..Default::default()
            })
            .filter(entry::Column::ContestId.eq(contest_id))
            .filter(entry::Column::AssignedGroupId.eq(from_group))
            .exec(self.conn)
            .await
            .context(CTX)?
            .rows_affected;

        info!(
            actor_id = actor.id,
            contest_id, from_group, to_group, moved, "Transferred entries between groups"
        );
        Ok(moved)
    }
}
