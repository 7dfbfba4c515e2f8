use std::collections::HashMap;

use chrono::Utc;
use common::{Actor, Permission};
use sea_orm::sea_query::{LockBehavior, LockType, Query as SeaQuery};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionSession, TransactionTrait,
};
use tracing::{debug, info};

use super::settings::current_contest_id;
use super::{DbContext, JudgingError, JudgingResult, ensure, ensure_admin};
use crate::entity::{entry, evaluation, evaluator, evaluator_permission};

const CLAIM_CTX: &str = "claiming the next entry";

/// Order candidate entries by fewest completed evaluations, then ascending id.
///
/// Entries missing from `completed` have no completed evaluations.
pub fn rank_candidates(candidates: &[i32], completed: &HashMap<i32, i64>) -> Vec<i32> {
    let mut ranked: Vec<(i64, i32)> = candidates
        .iter()
        .map(|id| (completed.get(id).copied().unwrap_or(0), *id))
        .collect();
    ranked.sort_unstable();
    ranked.dedup();
    ranked.into_iter().map(|(_, id)| id).collect()
}

/// Hands out entries to evaluators, one outstanding claim per evaluator.
pub struct ClaimBroker<'a, C> {
    conn: &'a C,
}

impl<'a, C> ClaimBroker<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Claim the next entry for `actor` to judge.
    ///
    /// An outstanding placeholder is returned as-is. Otherwise the best
    /// candidate in the evaluator's group of the current contest is bound to
    /// them with a new placeholder evaluation. `Ok(None)` means there is
    /// nothing left to judge.
    pub async fn claim_next(&self, actor: &Actor) -> JudgingResult<Option<i32>> {
        ensure(actor, Permission::JudgeEntries)?;

        let txn = self.conn.begin().await.context(CLAIM_CTX)?;

        // Serializes claims of the same evaluator.
        let Some(account) = evaluator::Entity::find_by_id(actor.id)
            .lock(LockType::Update)
            .one(&txn)
            .await
            .context(CLAIM_CTX)?
        else {
            txn.rollback().await.context(CLAIM_CTX)?;
            return Err(JudgingError::NotFound(format!("Evaluator {}", actor.id)));
        };

        if !may_judge(&txn, &account).await? {
            txn.rollback().await.context(CLAIM_CTX)?;
            debug!(evaluator_id = actor.id, "Claim denied by stored account state");
            return Err(JudgingError::Forbidden);
        }

        if let Some(entry_id) = outstanding_claim(&txn, account.id).await? {
            txn.commit().await.context(CLAIM_CTX)?;
            debug!(evaluator_id = account.id, entry_id, "Resuming outstanding claim");
            return Ok(Some(entry_id));
        }

        let Some(contest_id) = current_contest_id(&txn).await? else {
            txn.commit().await.context(CLAIM_CTX)?;
            return Ok(None);
        };

        let candidates = candidate_entries(&txn, &account, contest_id).await?;
        let completed = completed_counts(&txn, &candidates).await?;

        for entry_id in rank_candidates(&candidates, &completed) {
            // Concurrent claimers skip rows another transaction is binding.
            let locked = entry::Entity::find_by_id(entry_id)
                .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
                .one(&txn)
                .await
                .context(CLAIM_CTX)?;
            if locked.is_none() {
                continue;
            }

            let placeholder = evaluation::ActiveModel {
                entry_id: Set(entry_id),
                evaluator_id: Set(account.id),
                creativity: Set(0.0),
                complexity: Set(0.0),
                execution: Set(0.0),
                interpretation: Set(0.0),
                is_complete: Set(false),
                skill_level: Set(None),
                created_at: Set(Utc::now()),
                completed_at: Set(None),
                ..Default::default()
            };

            return match placeholder.insert(&txn).await {
                Ok(_) => {
                    txn.commit().await.context(CLAIM_CTX)?;
                    info!(evaluator_id = account.id, entry_id, contest_id, "Entry claimed");
                    Ok(Some(entry_id))
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    txn.rollback().await.context(CLAIM_CTX)?;
                    self.existing_claim(account.id, entry_id).await
                }
                Err(e) => Err(JudgingError::Database {
                    context: CLAIM_CTX,
                    source: e,
                }),
            };
        }

        txn.commit().await.context(CLAIM_CTX)?;
        debug!(evaluator_id = account.id, contest_id, "Nothing left to judge");
        Ok(None)
    }

    /// A concurrent request bound the pair first; hand back its placeholder.
    async fn existing_claim(&self, evaluator_id: i32, entry_id: i32) -> JudgingResult<Option<i32>> {
        let row = evaluation::Entity::find()
            .filter(evaluation::Column::EntryId.eq(entry_id))
            .filter(evaluation::Column::EvaluatorId.eq(evaluator_id))
            .one(self.conn)
            .await
            .context(CLAIM_CTX)?;
        match row {
            Some(row) if !row.is_complete => Ok(Some(row.entry_id)),
            _ => Err(JudgingError::Database {
                context: CLAIM_CTX,
                source: sea_orm::DbErr::Custom(
                    "UniqueConstraintViolation but no outstanding placeholder found".into(),
                ),
            }),
        }
    }

    /// Most recently created entry whose level is unlocked and which is not
    /// disqualified. Non-exclusive: concurrent admins may see the same entry.
    pub async fn next_entry_to_review_level(&self, actor: &Actor) -> JudgingResult<Option<i32>> {
        ensure_admin(actor)?;

        entry::Entity::find()
            .select_only()
            .column(entry::Column::Id)
            .filter(entry::Column::SkillLevelLocked.eq(false))
            .filter(entry::Column::Disqualified.eq(false))
            .order_by_desc(entry::Column::Id)
            .into_tuple::<i32>()
            .one(self.conn)
            .await
            .context("finding the next entry to review")
    }

    /// Drop `actor`'s outstanding placeholder. Returns the released entry.
    pub async fn release(&self, actor: &Actor) -> JudgingResult<Option<i32>> {
        ensure(actor, Permission::JudgeEntries)?;
        const CTX: &str = "releasing a claim";

        let txn = self.conn.begin().await.context(CTX)?;
        let Some(placeholder) = evaluation::Entity::find()
            .filter(evaluation::Column::EvaluatorId.eq(actor.id))
            .filter(evaluation::Column::IsComplete.eq(false))
            .order_by_asc(evaluation::Column::Id)
            .lock(LockType::Update)
            .one(&txn)
            .await
            .context(CTX)?
        else {
            txn.rollback().await.context(CTX)?;
            return Ok(None);
        };

        let entry_id = placeholder.entry_id;
        evaluation::Entity::delete_by_id(placeholder.id)
            .exec(&txn)
            .await
            .context(CTX)?;
        txn.commit().await.context(CTX)?;

        info!(evaluator_id = actor.id, entry_id, "Claim released");
        Ok(Some(entry_id))
    }
}

/// Stored account state agrees with the token: unlocked, and either admin or
/// holding the judge flag.
async fn may_judge(txn: &impl ConnectionTrait, account: &evaluator::Model) -> JudgingResult<bool> {
    if account.account_locked {
        return Ok(false);
    }
    if account.is_admin {
        return Ok(true);
    }
    let flags = evaluator_permission::Entity::find_by_id(account.id)
        .one(txn)
        .await
        .context(CLAIM_CTX)?;
    Ok(flags.is_some_and(|f| f.judge_entries))
}

async fn outstanding_claim(txn: &impl ConnectionTrait, evaluator_id: i32) -> JudgingResult<Option<i32>> {
    evaluation::Entity::find()
        .select_only()
        .column(evaluation::Column::EntryId)
        .filter(evaluation::Column::EvaluatorId.eq(evaluator_id))
        .filter(evaluation::Column::IsComplete.eq(false))
        .order_by_asc(evaluation::Column::Id)
        .into_tuple::<i32>()
        .one(txn)
        .await
        .context(CLAIM_CTX)
}

/// Eligible entries of the contest the evaluator has not touched yet,
/// restricted to their group when they have one.
async fn candidate_entries(
    txn: &impl ConnectionTrait,
    account: &evaluator::Model,
    contest_id: i32,
) -> JudgingResult<Vec<i32>> {
    let mut select = entry::Entity::find()
        .select_only()
        .column(entry::Column::Id)
        .filter(entry::Column::ContestId.eq(contest_id))
        .filter(entry::Column::Flagged.eq(false))
        .filter(entry::Column::Disqualified.eq(false))
        .filter(
            entry::Column::Id.not_in_subquery(
                SeaQuery::select()
                    .column(evaluation::Column::EntryId)
                    .from(evaluation::Entity)
                    .and_where(evaluation::Column::EvaluatorId.eq(account.id))
                    .to_owned(),
            ),
        );
    if let Some(group_id) = account.group_id {
        select = select.filter(entry::Column::AssignedGroupId.eq(group_id));
    }

    select
        .order_by_asc(entry::Column::Id)
        .into_tuple()
        .all(txn)
        .await
        .context(CLAIM_CTX)
}

async fn completed_counts(
    txn: &impl ConnectionTrait,
    entry_ids: &[i32],
) -> JudgingResult<HashMap<i32, i64>> {
    if entry_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = evaluation::Entity::find()
        .select_only()
        .column(evaluation::Column::EntryId)
        .column_as(evaluation::Column::Id.count(), "completed")
        .filter(evaluation::Column::IsComplete.eq(true))
        .filter(evaluation::Column::EntryId.is_in(entry_ids.iter().copied()))
        .group_by(evaluation::Column::EntryId)
        .into_tuple()
        .all(txn)
        .await
        .context(CLAIM_CTX)?;
    Ok(rows.into_iter().collect())
}
