use common::SkillLevel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contest_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: HasOne<super::contest::Entity>,

    pub title: String,
    /// External contestant id. NULL for manually added entries.
    pub author_kaid: Option<String>,
    pub author_name: Option<String>,

    /// NULL until classified ("TBD").
    pub skill_level: Option<SkillLevel>,
    /// Once set, automatic classification leaves `skill_level` alone.
    pub skill_level_locked: bool,

    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub disqualified: bool,
    pub is_winner: bool,

    pub assigned_group_id: Option<i32>,
    #[sea_orm(belongs_to, from = "assigned_group_id", to = "id")]
    pub assigned_group: HasOne<super::judging_group::Entity>,

    #[sea_orm(has_many)]
    pub evaluations: HasMany<super::evaluation::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Flagged and disqualified entries are neither judged nor counted.
    pub fn is_eligible(&self) -> bool {
        !self.flagged && !self.disqualified
    }
}

impl ActiveModelBehavior for ActiveModel {}
