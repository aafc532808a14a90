//! `SeaORM` entity definitions.
//!
//! Operational source tables (`users`, `projects`, `products`) are read-only
//! to the ETL engine. Warehouse tables carry the star schema: one date
//! dimension, three SCD2 dimensions, three append-only fact tables.

pub mod dim_date;
pub mod dim_products;
pub mod dim_projects;
pub mod dim_users;
pub mod fact_product_usage;
pub mod fact_project_daily;
pub mod fact_project_metrics;
pub mod products;
pub mod projects;
pub mod users;
