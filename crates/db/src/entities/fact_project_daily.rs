//! `SeaORM` Entity for the daily project snapshot fact table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fact_project_daily")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date_key: i32,
    pub project_key: i64,
    pub user_key: i64,
    pub products_count: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_value: Decimal,
    pub tasks_completed: i32,
    pub tasks_pending: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub budget_utilized: Decimal,
    pub snapshot_time: DateTimeWithTimeZone,
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
