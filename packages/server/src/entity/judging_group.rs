use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judging_group")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Only active groups take part in new partitions.
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::entry::Entity>,

    #[sea_orm(has_many)]
    pub evaluators: HasMany<super::evaluator::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
