//! `SeaORM` Entity for the project metrics fact table.
//!
//! Rows are immutable snapshots appended once per project per run; the
//! dimension keys are the surrogate keys that were current at load time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fact_project_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date_key: i32,
    pub project_key: i64,
    pub user_key: i64,
    pub total_products: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub completion_percentage: Decimal,
    pub loaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dim_date::Entity",
        from = "Column::DateKey",
        to = "super::dim_date::Column::DateKey"
    )]
    DimDate,
    #[sea_orm(
        belongs_to = "super::dim_projects::Entity",
        from = "Column::ProjectKey",
        to = "super::dim_projects::Column::ProjectKey"
    )]
    DimProjects,
    #[sea_orm(
        belongs_to = "super::dim_users::Entity",
        from = "Column::UserKey",
        to = "super::dim_users::Column::UserKey"
    )]
    DimUsers,
}

impl ActiveModelBehavior for ActiveModel {}
