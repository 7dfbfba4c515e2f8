use common::{Actor, Permission, SkillLevel};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::info;

use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::entry;

const MAX_FLAG_REASON_LEN: usize = 500;

/// Entry moderation. Flagging, approval, disqualification and manual levels
/// require `edit_entries`; winner marks require `manage_winners`.
pub struct ModerationService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ModerationService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn flag(&self, actor: &Actor, entry_id: i32, reason: &str) -> JudgingResult<entry::Model> {
        let reason = reason.trim();
        if reason.is_empty() || reason.chars().count() > MAX_FLAG_REASON_LEN {
            return Err(JudgingError::Validation(format!(
                "Flag reason must be 1-{MAX_FLAG_REASON_LEN} characters"
            )));
        }
        let reason = reason.to_string();
        let updated = self
            .modify(actor, Permission::EditEntries, entry_id, "flagging an entry", |e| {
                e.flagged = Set(true);
                e.flag_reason = Set(Some(reason));
            })
            .await?;
        info!(actor_id = actor.id, entry_id, "Entry flagged");
        Ok(updated)
    }

    /// Clear both the flag and a disqualification.
    pub async fn approve(&self, actor: &Actor, entry_id: i32) -> JudgingResult<entry::Model> {
        let updated = self
            .modify(actor, Permission::EditEntries, entry_id, "approving an entry", |e| {
                e.flagged = Set(false);
                e.flag_reason = Set(None);
                e.disqualified = Set(false);
            })
            .await?;
        info!(actor_id = actor.id, entry_id, "Entry approved");
        Ok(updated)
    }

    pub async fn disqualify(&self, actor: &Actor, entry_id: i32) -> JudgingResult<entry::Model> {
        let updated = self
            .modify(actor, Permission::EditEntries, entry_id, "disqualifying an entry", |e| {
                e.disqualified = Set(true);
            })
            .await?;
        info!(actor_id = actor.id, entry_id, "Entry disqualified");
        Ok(updated)
    }

    /// Manually set the bracket. Always locks it against automatic updates.
    pub async fn set_level(
        &self,
        actor: &Actor,
        entry_id: i32,
        level: SkillLevel,
    ) -> JudgingResult<entry::Model> {
        let updated = self
            .modify(
                actor,
                Permission::EditEntries,
                entry_id,
                "setting an entry's skill level",
                |e| {
                    e.skill_level = Set(Some(level));
                    e.skill_level_locked = Set(true);
                },
            )
            .await?;
        info!(actor_id = actor.id, entry_id, level = %level, "Entry level set and locked");
        Ok(updated)
    }

    pub async fn add_winner(&self, actor: &Actor, entry_id: i32) -> JudgingResult<entry::Model> {
        self.mark_winner(actor, entry_id, true).await
    }

    pub async fn remove_winner(&self, actor: &Actor, entry_id: i32) -> JudgingResult<entry::Model> {
        self.mark_winner(actor, entry_id, false).await
    }

    async fn mark_winner(
        &self,
        actor: &Actor,
        entry_id: i32,
        is_winner: bool,
    ) -> JudgingResult<entry::Model> {
        let updated = self
            .modify(actor, Permission::ManageWinners, entry_id, "marking a winner", |e| {
                e.is_winner = Set(is_winner);
            })
            .await?;
        info!(actor_id = actor.id, entry_id, is_winner, "Entry winner mark changed");
        Ok(updated)
    }

    async fn modify<F>(
        &self,
        actor: &Actor,
        permission: Permission,
        entry_id: i32,
        context: &'static str,
        change: F,
    ) -> JudgingResult<entry::Model>
    where
        F: FnOnce(&mut entry::ActiveModel),
    {
        ensure(actor, permission)?;

        let found = entry::Entity::find_by_id(entry_id)
            .one(self.conn)
            .await
            .context(context)?
            .ok_or_else(|| JudgingError::NotFound(format!("Entry {entry_id}")))?;

        let mut active: entry::ActiveModel = found.into();
        change(&mut active);
        active.update(self.conn).await.context(context)
    }
}
