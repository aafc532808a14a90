//! `SeaORM` Entity for the project dimension (SCD2).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dim_projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub project_key: i64,
    /// Natural key from the operational source.
    pub project_id: i32,
    pub name: String,
    pub status: String,
    pub project_type: String,
    pub is_current: bool,
    pub valid_from: DateTimeWithTimeZone,
    pub valid_to: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
