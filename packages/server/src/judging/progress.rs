use common::{Actor, Permission, Progress, has_permission};
use sea_orm::sea_query::{Query as SeaQuery, SelectStatement};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, Select, Statement,
};

use super::settings::current_contest_id;
use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::{contest, entry, evaluation, evaluator, evaluator_permission, judging_group};

const CTX: &str = "computing judging progress";

/// Completed evaluations of one evaluator against the size of their group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorProgress {
    pub evaluator_id: i32,
    pub username: String,
    pub display_name: String,
    pub progress: Progress,
}

/// Everything the judging dashboard shows for the current contest.
///
/// Contest-wide figures are only filled in for callers with `view_admin_stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub contest_id: i32,
    pub user: Progress,
    pub group: Progress,
    pub entries: Option<Progress>,
    pub evaluations: Option<Progress>,
    pub evaluators: Option<Vec<EvaluatorProgress>>,
}

#[derive(Debug, FromQueryResult)]
struct Scalar {
    value: i64,
}

#[derive(Debug, FromQueryResult)]
struct EvaluatorRow {
    evaluator_id: i32,
    username: String,
    display_name: String,
    completed: i64,
    total: i64,
}

/// Sum over groups of (eligible entries x active judges). Groups present on
/// only one side of the join contribute nothing.
const EVALUATION_TOTAL_SQL: &str = r#"
SELECT CAST(COALESCE(SUM(en.entry_count * ju.judge_count), 0) AS BIGINT) AS value
FROM (
    SELECT assigned_group_id AS group_id, COUNT(*) AS entry_count
    FROM entry
    WHERE contest_id = $1 AND flagged = FALSE AND disqualified = FALSE
      AND assigned_group_id IS NOT NULL
    GROUP BY assigned_group_id
) en
INNER JOIN (
    SELECT u.group_id AS group_id, COUNT(*) AS judge_count
    FROM evaluator u
    LEFT JOIN evaluator_permission p ON p.evaluator_id = u.id
    WHERE u.account_locked = FALSE AND u.group_id IS NOT NULL
      AND (u.is_admin = TRUE OR p.judge_entries = TRUE)
    GROUP BY u.group_id
) ju ON ju.group_id = en.group_id
"#;

/// Completed evaluations the total above accounts for: by an active judge,
/// on an eligible entry of the judge's own group.
const EVALUATION_COUNT_SQL: &str = r#"
SELECT CAST(COUNT(*) AS BIGINT) AS value
FROM evaluation ev
INNER JOIN entry en ON en.id = ev.entry_id
INNER JOIN evaluator u ON u.id = ev.evaluator_id
LEFT JOIN evaluator_permission p ON p.evaluator_id = u.id
WHERE ev.is_complete = TRUE
  AND en.contest_id = $1 AND en.flagged = FALSE AND en.disqualified = FALSE
  AND en.assigned_group_id = u.group_id
  AND u.account_locked = FALSE
  AND (u.is_admin = TRUE OR p.judge_entries = TRUE)
"#;

const EVALUATOR_PROGRESS_SQL: &str = r#"
SELECT u.id AS evaluator_id, u.username AS username, u.display_name AS display_name,
       CAST(SUM(CASE WHEN en.assigned_group_id = u.group_id THEN 1 ELSE 0 END) AS BIGINT) AS completed,
       CAST(COALESCE(MAX(g.entry_count), 0) AS BIGINT) AS total
FROM evaluator u
INNER JOIN evaluation ev ON ev.evaluator_id = u.id AND ev.is_complete = TRUE
INNER JOIN entry en ON en.id = ev.entry_id
LEFT JOIN (
    SELECT assigned_group_id AS group_id, COUNT(*) AS entry_count
    FROM entry
    WHERE contest_id = $1 AND flagged = FALSE AND disqualified = FALSE
      AND assigned_group_id IS NOT NULL
    GROUP BY assigned_group_id
) g ON g.group_id = u.group_id
WHERE en.contest_id = $1 AND en.flagged = FALSE AND en.disqualified = FALSE
GROUP BY u.id, u.username, u.display_name
ORDER BY u.id
"#;

/// Subquery form of [`eligible_entries`].
fn eligible_entry_ids(contest_id: i32, group_id: Option<i32>) -> SelectStatement {
    let mut query = SeaQuery::select();
    query
        .column(entry::Column::Id)
        .from(entry::Entity)
        .and_where(entry::Column::ContestId.eq(contest_id))
        .and_where(entry::Column::Flagged.eq(false))
        .and_where(entry::Column::Disqualified.eq(false));
    if let Some(group_id) = group_id {
        query.and_where(entry::Column::AssignedGroupId.eq(group_id));
    }
    query.to_owned()
}

/// The contest's entries that are neither flagged nor disqualified,
/// optionally within one group.
fn eligible_entries(contest_id: i32, group_id: Option<i32>) -> Select<entry::Entity> {
    let select = entry::Entity::find()
        .filter(entry::Column::ContestId.eq(contest_id))
        .filter(entry::Column::Flagged.eq(false))
        .filter(entry::Column::Disqualified.eq(false));
    match group_id {
        Some(group_id) => select.filter(entry::Column::AssignedGroupId.eq(group_id)),
        None => select,
    }
}

/// Ids of unlocked evaluators in `group_id` allowed to judge.
fn active_judge_ids(group_id: i32) -> SelectStatement {
    SeaQuery::select()
        .column(evaluator::Column::Id)
        .from(evaluator::Entity)
        .and_where(evaluator::Column::GroupId.eq(group_id))
        .and_where(evaluator::Column::AccountLocked.eq(false))
        .cond_where(
            Condition::any()
                .add(evaluator::Column::IsAdmin.eq(true))
                .add(
                    evaluator::Column::Id.in_subquery(
                        SeaQuery::select()
                            .column(evaluator_permission::Column::EvaluatorId)
                            .from(evaluator_permission::Entity)
                            .and_where(evaluator_permission::Column::JudgeEntries.eq(true))
                            .to_owned(),
                    ),
                ),
        )
        .to_owned()
}

/// Read-only `{count, total}` projections for judging dashboards.
pub struct ProgressService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProgressService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Completed evaluations by `user_id` against the eligible entries of
    /// their group. Anyone may read their own progress.
    pub async fn user_progress(
        &self,
        actor: &Actor,
        contest_id: i32,
        user_id: i32,
    ) -> JudgingResult<Progress> {
        if user_id != actor.id {
            ensure(actor, Permission::ViewAdminStats)?;
        }
        self.require_contest(contest_id).await?;
        self.user_progress_unchecked(contest_id, user_id).await
    }

    /// Completed evaluations in a group against (entries x active judges).
    /// Members may read their own group.
    pub async fn group_progress(
        &self,
        actor: &Actor,
        contest_id: i32,
        group_id: i32,
    ) -> JudgingResult<Progress> {
        if self.group_of(actor.id).await? != Some(group_id) {
            ensure(actor, Permission::ViewAdminStats)?;
        }
        self.require_contest(contest_id).await?;
        judging_group::Entity::find_by_id(group_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Judging group {group_id}")))?;
        self.group_progress_unchecked(contest_id, group_id).await
    }

    /// Eligible entries with at least one completed evaluation.
    pub async fn entry_progress(&self, actor: &Actor, contest_id: i32) -> JudgingResult<Progress> {
        ensure(actor, Permission::ViewAdminStats)?;
        self.require_contest(contest_id).await?;
        self.entry_progress_unchecked(contest_id).await
    }

    pub async fn evaluation_progress(
        &self,
        actor: &Actor,
        contest_id: i32,
    ) -> JudgingResult<Progress> {
        ensure(actor, Permission::ViewAdminStats)?;
        self.require_contest(contest_id).await?;
        self.evaluation_progress_unchecked(contest_id).await
    }

    /// One row per evaluator with a completed evaluation in the contest.
    pub async fn evaluator_progress(
        &self,
        actor: &Actor,
        contest_id: i32,
    ) -> JudgingResult<Vec<EvaluatorProgress>> {
        ensure(actor, Permission::ViewAdminStats)?;
        self.require_contest(contest_id).await?;
        self.evaluator_progress_unchecked(contest_id).await
    }

    /// The dashboard for the current contest, or `None` when there is none.
    pub async fn overview(&self, actor: &Actor) -> JudgingResult<Option<ProgressOverview>> {
        let Some(contest_id) = current_contest_id(self.conn).await? else {
            return Ok(None);
        };

        let user = self.user_progress_unchecked(contest_id, actor.id).await?;
        let group = match self.group_of(actor.id).await? {
            Some(group_id) => self.group_progress_unchecked(contest_id, group_id).await?,
            None => Progress::default(),
        };

        let admin = has_permission(Some(actor), Permission::ViewAdminStats);
        let (entries, evaluations, evaluators) = if admin {
            (
                Some(self.entry_progress_unchecked(contest_id).await?),
                Some(self.evaluation_progress_unchecked(contest_id).await?),
                Some(self.evaluator_progress_unchecked(contest_id).await?),
            )
        } else {
            (None, None, None)
        };

        Ok(Some(ProgressOverview {
            contest_id,
            user,
            group,
            entries,
            evaluations,
            evaluators,
        }))
    }

    async fn require_contest(&self, contest_id: i32) -> JudgingResult<()> {
        contest::Entity::find_by_id(contest_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .map(|_| ())
            .ok_or_else(|| JudgingError::NotFound(format!("Contest {contest_id}")))
    }

    async fn group_of(&self, evaluator_id: i32) -> JudgingResult<Option<i32>> {
        Ok(evaluator::Entity::find_by_id(evaluator_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .and_then(|e| e.group_id))
    }

    async fn user_progress_unchecked(&self, contest_id: i32, user_id: i32) -> JudgingResult<Progress> {
        let account = evaluator::Entity::find_by_id(user_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Evaluator {user_id}")))?;
        let Some(group_id) = account.group_id else {
            return Ok(Progress::default());
        };

        let total = eligible_entries(contest_id, Some(group_id))
            .count(self.conn)
            .await
            .context(CTX)?;
        let count = evaluation::Entity::find()
            .filter(evaluation::Column::EvaluatorId.eq(user_id))
            .filter(evaluation::Column::IsComplete.eq(true))
            .filter(
                evaluation::Column::EntryId
                    .in_subquery(eligible_entry_ids(contest_id, Some(group_id))),
            )
            .count(self.conn)
            .await
            .context(CTX)?;

        Ok(Progress::new(count, total))
    }

    async fn group_progress_unchecked(&self, contest_id: i32, group_id: i32) -> JudgingResult<Progress> {
        let entries = eligible_entries(contest_id, Some(group_id))
            .count(self.conn)
            .await
            .context(CTX)?;
        let judges = evaluator::Entity::find()
            .filter(evaluator::Column::Id.in_subquery(active_judge_ids(group_id)))
            .count(self.conn)
            .await
            .context(CTX)?;
        let count = evaluation::Entity::find()
            .filter(evaluation::Column::IsComplete.eq(true))
            .filter(
                evaluation::Column::EntryId
                    .in_subquery(eligible_entry_ids(contest_id, Some(group_id))),
            )
            .filter(evaluation::Column::EvaluatorId.in_subquery(active_judge_ids(group_id)))
            .count(self.conn)
            .await
            .context(CTX)?;

        Ok(Progress::new(count, entries * judges))
    }

    async fn entry_progress_unchecked(&self, contest_id: i32) -> JudgingResult<Progress> {
        let total = eligible_entries(contest_id, None)
            .count(self.conn)
            .await
            .context(CTX)?;
        let count = eligible_entries(contest_id, None)
            .filter(
                entry::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(evaluation::Column::EntryId)
                        .from(evaluation::Entity)
                        .and_where(evaluation::Column::IsComplete.eq(true))
                        .to_owned(),
                ),
            )
            .count(self.conn)
            .await
            .context(CTX)?;

        Ok(Progress::new(count, total))
    }

    async fn evaluation_progress_unchecked(&self, contest_id: i32) -> JudgingResult<Progress> {
        let count = self.scalar(EVALUATION_COUNT_SQL, contest_id).await?;
        let total = self.scalar(EVALUATION_TOTAL_SQL, contest_id).await?;
        Ok(Progress::from_counts(count, total))
    }

    async fn evaluator_progress_unchecked(
        &self,
        contest_id: i32,
    ) -> JudgingResult<Vec<EvaluatorProgress>> {
        let rows = EvaluatorRow::find_by_statement(Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            EVALUATOR_PROGRESS_SQL,
            [contest_id.into()],
        ))
        .all(self.conn)
        .await
        .context(CTX)?;

        Ok(rows
            .into_iter()
            .map(|row| EvaluatorProgress {
                evaluator_id: row.evaluator_id,
                username: row.username,
                display_name: row.display_name,
                progress: Progress::from_counts(row.completed, row.total),
            })
            .collect())
    }

    async fn scalar(&self, sql: &str, contest_id: i32) -> JudgingResult<i64> {
        Ok(Scalar::find_by_statement(Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            sql,
            [contest_id.into()],
        ))
        .one(self.conn)
        .await
        .context(CTX)?
        .map_or(0, |s| s.value))
    }
}
