//! `SeaORM` Entity for the user dimension (SCD2).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dim_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_key: i64,
    /// Natural key from the operational source.
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_current: bool,
    pub valid_from: DateTimeWithTimeZone,
    pub valid_to: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
