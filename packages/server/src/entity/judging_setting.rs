use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Singleton row (`id = 1`) holding service-wide judging settings.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judging_setting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub current_contest_id: Option<i32>,
    #[sea_orm(belongs_to, from = "current_contest_id", to = "id")]
    pub current_contest: HasOne<super::contest::Entity>,

    pub updated_at: DateTimeUtc,
}

pub const SINGLETON_ID: i32 = 1;

impl ActiveModelBehavior for ActiveModel {}
