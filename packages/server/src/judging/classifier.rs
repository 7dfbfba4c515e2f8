use common::skill_level::{majority_level, promotion_applies};
use common::{Actor, Permission, SkillLevel};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionSession, TransactionTrait,
};
use tracing::info;

use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::{entry, evaluation};

const CTX: &str = "updating an entry's skill level";

/// What an automatic classification run did to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The level is locked; nothing was touched.
    Locked,
    /// The author's streak forced the top bracket and locked the entry.
    Promoted(SkillLevel),
    /// Evaluator suggestions moved the entry to a new bracket.
    Reclassified(SkillLevel),
    /// The level stayed as it was.
    Unchanged(Option<SkillLevel>),
}

impl LevelOutcome {
    pub fn level(&self) -> Option<SkillLevel> {
        match self {
            Self::Locked => None,
            Self::Promoted(level) | Self::Reclassified(level) => Some(*level),
            Self::Unchanged(level) => *level,
        }
    }
}

pub struct SkillLevelClassifier<'a, C> {
    conn: &'a C,
    promotion_streak: usize,
}

impl<'a, C> SkillLevelClassifier<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, promotion_streak: usize) -> Self {
        Self {
            conn,
            promotion_streak,
        }
    }

    pub async fn auto_update(&self, actor: &Actor, entry_id: i32) -> JudgingResult<LevelOutcome> {
        ensure(actor, Permission::EditEntries)?;
        self.classify(entry_id).await
    }

    /// Recompute the level of `entry_id` without a permission check.
    ///
    /// Called after an evaluation of the entry is completed or edited.
    pub async fn classify(&self, entry_id: i32) -> JudgingResult<LevelOutcome> {
        let txn = self.conn.begin().await.context(CTX)?;

        let Some(target) = entry::Entity::find_by_id(entry_id)
            .lock(LockType::Update)
            .one(&txn)
            .await
            .context(CTX)?
        else {
            txn.rollback().await.context(CTX)?;
            return Err(JudgingError::NotFound(format!("Entry {entry_id}")));
        };

        if target.skill_level_locked {
            txn.rollback().await.context(CTX)?;
            return Ok(LevelOutcome::Locked);
        }

        if let Some(author) = target.author_kaid.clone() {
            let previous: Vec<Option<SkillLevel>> = entry::Entity::find()
                .filter(entry::Column::AuthorKaid.eq(author.as_str()))
                .filter(entry::Column::Id.ne(target.id))
                .order_by_desc(entry::Column::Id)
                .limit(self.promotion_streak as u64)
                .all(&txn)
                .await
                .context(CTX)?
                .into_iter()
                .map(|e| e.skill_level)
                .collect();

            if promotion_applies(&previous, self.promotion_streak) {
                let mut active: entry::ActiveModel = target.into();
                active.skill_level = Set(Some(SkillLevel::TOP));
                active.skill_level_locked = Set(true);
                active.update(&txn).await.context(CTX)?;
                txn.commit().await.context(CTX)?;

                info!(entry_id, author = %author, "Entry promoted and locked by author streak");
                return Ok(LevelOutcome::Promoted(SkillLevel::TOP));
            }
        }

        let suggestions: Vec<SkillLevel> = evaluation::Entity::find()
            .filter(evaluation::Column::EntryId.eq(entry_id))
            .filter(evaluation::Column::IsComplete.eq(true))
            .all(&txn)
            .await
            .context(CTX)?
            .into_iter()
            .filter_map(|e| e.skill_level)
            .collect();

        let current = target.skill_level;
        let outcome = match majority_level(suggestions) {
            Some(level) if Some(level) != current => {
                let mut active: entry::ActiveModel = target.into();
                active.skill_level = Set(Some(level));
                active.update(&txn).await.context(CTX)?;
                info!(entry_id, level = %level, "Entry reclassified from evaluator suggestions");
                LevelOutcome::Reclassified(level)
            }
            _ => LevelOutcome::Unchanged(current),
        };

        txn.commit().await.context(CTX)?;
        Ok(outcome)
    }
}
