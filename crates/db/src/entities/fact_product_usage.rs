//! `SeaORM` Entity for the product usage fact table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fact_product_usage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date_key: i32,
    pub product_key: i64,
    pub project_key: i64,
    pub quantity_used: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub efficiency_score: Decimal,
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
        belongs_to = "super::dim_products::Entity",
        from = "Column::ProductKey",
        to = "super::dim_products::Column::ProductKey"
    )]
    DimProducts,
    #[sea_orm(
        belongs_to = "super::dim_projects::Entity",
        from = "Column::ProjectKey",
        to = "super::dim_projects::Column::ProjectKey"
    )]
    DimProjects,
}

impl ActiveModelBehavior for ActiveModel {}
