use chrono::Utc;
use common::{Actor, Permission};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use tracing::info;

use super::{DbContext, JudgingError, JudgingResult, ensure};
use crate::entity::{contest, judging_setting};

/// Id of the contest judging currently targets.
///
/// Reads the explicit setting and falls back to the most recent contest by
/// id when the setting is empty.
pub async fn current_contest_id<C: ConnectionTrait>(conn: &C) -> JudgingResult<Option<i32>> {
    let setting = judging_setting::Entity::find_by_id(judging_setting::SINGLETON_ID)
        .one(conn)
        .await
        .context("reading the current contest setting")?;

    if let Some(id) = setting.and_then(|s| s.current_contest_id) {
        return Ok(Some(id));
    }

    contest::Entity::find()
        .select_only()
        .column(contest::Column::Id)
        .order_by_desc(contest::Column::Id)
        .into_tuple::<i32>()
        .one(conn)
        .await
        .context("finding the most recent contest")
}

pub struct SettingsService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SettingsService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn current_contest(&self) -> JudgingResult<Option<contest::Model>> {
        let Some(id) = current_contest_id(self.conn).await? else {
            return Ok(None);
        };
        contest::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("loading the current contest")
    }

    /// Point judging at `contest_id`, or back at the most recent contest with `None`.
    pub async fn set_current_contest(
        &self,
        actor: &Actor,
        contest_id: Option<i32>,
    ) -> JudgingResult<Option<contest::Model>> {
        ensure(actor, Permission::ManageJudgingGroups)?;

        if let Some(id) = contest_id {
            contest::Entity::find_by_id(id)
                .one(self.conn)
                .await
                .context("loading a contest")?
                .ok_or_else(|| JudgingError::NotFound(format!("Contest {id}")))?;
        }

        let row = judging_setting::ActiveModel {
            id: Set(judging_setting::SINGLETON_ID),
            current_contest_id: Set(contest_id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        judging_setting::Entity::insert(row)
            .on_conflict(
                OnConflict::column(judging_setting::Column::Id)
                    .update_columns([
                        judging_setting::Column::CurrentContestId,
                        judging_setting::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("updating the current contest setting")?;

        info!(actor_id = actor.id, contest_id = ?contest_id, "Current contest updated");
        self.current_contest().await
    }
}
