//! `SeaORM` Entity for the date dimension.
//!
//! The primary key is the date encoded as `YYYYMMDD`, never auto-generated,
//! which makes population idempotent by construction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dim_date")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_key: i32,
    pub date: Date,
    pub year: i32,
    pub quarter: i32,
    pub month: i32,
    pub month_name: String,
    pub day: i32,
    pub day_of_week: i32,
    pub day_name: String,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
