use chrono::Utc;
use common::{Actor, Permission, Scores, SkillLevel, has_permission};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionSession, TransactionTrait,
};
use tracing::{info, warn};

use super::classifier::{LevelOutcome, SkillLevelClassifier};
use super::settings::current_contest_id;
use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::{entry, evaluation};

/// Scores and bracket suggestion an evaluator records for an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationInput {
    pub scores: Scores,
    pub skill_level: Option<SkillLevel>,
}

impl EvaluationInput {
    fn validate(&self) -> JudgingResult<()> {
        self.scores
            .validate()
            .map_err(|e| JudgingError::Validation(e.to_string()))
    }

    fn apply_to(&self, active: &mut evaluation::ActiveModel) {
        active.creativity = Set(self.scores.creativity);
        active.complexity = Set(self.scores.complexity);
        active.execution = Set(self.scores.execution);
        active.interpretation = Set(self.scores.interpretation);
        active.skill_level = Set(self.skill_level);
    }
}

/// Completes and edits evaluations, re-running the classifier afterwards.
pub struct EvaluationService<'a, C> {
    conn: &'a C,
    promotion_streak: usize,
}

impl<'a, C> EvaluationService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, promotion_streak: usize) -> Self {
        Self {
            conn,
            promotion_streak,
        }
    }

    /// Complete `actor`'s placeholder for `entry_id`.
    ///
    /// The evaluation is committed before the entry is reclassified, so a
    /// classifier failure leaves it saved and yields no outcome.
    pub async fn submit(
        &self,
        actor: &Actor,
        entry_id: i32,
        input: EvaluationInput,
    ) -> JudgingResult<(evaluation::Model, Option<LevelOutcome>)> {
        ensure(actor, Permission::JudgeEntries)?;
        input.validate()?;
        const CTX: &str = "submitting an evaluation";

        let txn = self.conn.begin().await.context(CTX)?;
        let Some(placeholder) = evaluation::Entity::find()
            .filter(evaluation::Column::EntryId.eq(entry_id))
            .filter(evaluation::Column::EvaluatorId.eq(actor.id))
            .lock(LockType::Update)
            .one(&txn)
            .await
            .context(CTX)?
        else {
            txn.rollback().await.context(CTX)?;
            return Err(JudgingError::NotFound(format!("Claim on entry {entry_id}")));
        };

        if placeholder.is_complete {
            txn.rollback().await.context(CTX)?;
            return Err(JudgingError::Validation(
                "This entry has already been evaluated; edit the evaluation instead".into(),
            ));
        }

        let mut active: evaluation::ActiveModel = placeholder.into();
        input.apply_to(&mut active);
        active.is_complete = Set(true);
        active.completed_at = Set(Some(Utc::now()));
        let saved = active.update(&txn).await.context(CTX)?;
        txn.commit().await.context(CTX)?;

        info!(
            evaluator_id = actor.id,
            entry_id,
            evaluation_id = saved.id,
            total = input.scores.total(),
            "Evaluation submitted"
        );

        let outcome = self.reclassify(entry_id).await;
        Ok((saved, outcome))
    }

    /// Change the scores of a completed evaluation.
    ///
    /// Owners may edit their own evaluations of the current contest; holders
    /// of `edit_all_evaluations` may edit any evaluation.
    pub async fn edit(
        &self,
        actor: &Actor,
        evaluation_id: i32,
        input: EvaluationInput,
    ) -> JudgingResult<(evaluation::Model, Option<LevelOutcome>)> {
        const CTX: &str = "editing an evaluation";

        let existing = evaluation::Entity::find_by_id(evaluation_id)
            .one(self.conn)
            .await
            .context(CTX)?
            .ok_or_else(|| JudgingError::NotFound(format!("Evaluation {evaluation_id}")))?;

        if !has_permission(Some(actor), Permission::EditAllEvaluations) {
            if existing.evaluator_id != actor.id {
                return Err(JudgingError::Forbidden);
            }
            ensure(actor, Permission::JudgeEntries)?;

            let contest_id = entry::Entity::find_by_id(existing.entry_id)
                .select_only()
                .column(entry::Column::ContestId)
                .into_tuple::<i32>()
                .one(self.conn)
                .await
                .context(CTX)?;
            if contest_id.is_none() || contest_id != current_contest_id(self.conn).await? {
                return Err(JudgingError::Forbidden);
            }
        }

        input.validate()?;
        if !existing.is_complete {
            return Err(JudgingError::Validation(
                "This evaluation has not been submitted yet".into(),
            ));
        }

        let entry_id = existing.entry_id;
        let mut active: evaluation::ActiveModel = existing.into();
        input.apply_to(&mut active);
        let saved = active.update(self.conn).await.context(CTX)?;

        info!(
            actor_id = actor.id,
            evaluation_id,
            entry_id,
            "Evaluation edited"
        );

        let outcome = self.reclassify(entry_id).await;
        Ok((saved, outcome))
    }

    async fn reclassify(&self, entry_id: i32) -> Option<LevelOutcome> {
        let result = SkillLevelClassifier::new(self.conn, self.promotion_streak)
            .classify(entry_id)
            .await;
        settle_level(entry_id, result)
    }
}

fn settle_level(entry_id: i32, result: JudgingResult<LevelOutcome>) -> Option<LevelOutcome> {
    match result {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!(entry_id, error = %e, "Reclassification after evaluation failed");
            None
        }
    }
}
