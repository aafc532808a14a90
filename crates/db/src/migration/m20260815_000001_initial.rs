//! Initial database migration.
//!
//! Creates the operational source tables and the star-schema warehouse:
//! dimension tables with SCD2 columns, append-only fact tables, and the
//! indexes the analytics queries rely on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: OPERATIONAL SOURCE TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 2: DATE DIMENSION
        // ============================================================
        db.execute_unprepared(DIM_DATE_SQL).await?;

        // ============================================================
        // PART 3: SCD2 DIMENSIONS
        // ============================================================
        db.execute_unprepared(DIM_USERS_SQL).await?;
        db.execute_unprepared(DIM_PROJECTS_SQL).await?;
        db.execute_unprepared(DIM_PRODUCTS_SQL).await?;

        // ============================================================
        // PART 4: FACT TABLES
        // ============================================================
        db.execute_unprepared(FACT_PROJECT_METRICS_SQL).await?;
        db.execute_unprepared(FACT_PRODUCT_USAGE_SQL).await?;
        db.execute_unprepared(FACT_PROJECT_DAILY_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              SERIAL PRIMARY KEY,
    username        VARCHAR(150) NOT NULL UNIQUE,
    email           VARCHAR(255) NOT NULL UNIQUE,
    role            VARCHAR(50) NOT NULL DEFAULT 'user',
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id              SERIAL PRIMARY KEY,
    user_id         INTEGER NOT NULL REFERENCES users(id),
    name            VARCHAR(255) NOT NULL,
    status          VARCHAR(50) NOT NULL DEFAULT 'Planning',
    project_type    VARCHAR(50) NOT NULL DEFAULT 'Residential',
    budget          NUMERIC(12, 2) NOT NULL DEFAULT 0,
    tasks_completed INTEGER NOT NULL DEFAULT 0,
    tasks_pending   INTEGER NOT NULL DEFAULT 0,
    start_date      DATE,
    end_date        DATE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_projects_user ON projects(user_id);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id              SERIAL PRIMARY KEY,
    project_id      INTEGER NOT NULL REFERENCES projects(id),
    name            VARCHAR(255) NOT NULL,
    category        VARCHAR(100) NOT NULL,
    vendor          VARCHAR(255) NOT NULL,
    price           NUMERIC(12, 2) NOT NULL DEFAULT 0,
    quantity        INTEGER NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_products_project ON products(project_id);
";

const DIM_DATE_SQL: &str = r"
-- Date dimension: the key IS the date (YYYYMMDD), never auto-generated
CREATE TABLE dim_date (
    date_key        INTEGER PRIMARY KEY,
    date            DATE NOT NULL UNIQUE,
    year            INTEGER NOT NULL,
    quarter         INTEGER NOT NULL,
    month           INTEGER NOT NULL,
    month_name      VARCHAR(10) NOT NULL,
    day             INTEGER NOT NULL,
    day_of_week     INTEGER NOT NULL,
    day_name        VARCHAR(10) NOT NULL,
    is_weekend      BOOLEAN NOT NULL,
    is_holiday      BOOLEAN NOT NULL DEFAULT FALSE
);
";

const DIM_USERS_SQL: &str = r"
CREATE TABLE dim_users (
    user_key        BIGSERIAL PRIMARY KEY,
    user_id         INTEGER NOT NULL,
    username        VARCHAR(150) NOT NULL,
    email           VARCHAR(255) NOT NULL,
    role            VARCHAR(50) NOT NULL,
    is_current      BOOLEAN NOT NULL,
    valid_from      TIMESTAMPTZ NOT NULL,
    valid_to        TIMESTAMPTZ
);

CREATE INDEX idx_dim_users_natural ON dim_users(user_id);

-- At most one current version per natural key, enforced at the schema
-- level so a crash between expire and insert cannot leave two
CREATE UNIQUE INDEX uq_dim_users_current
    ON dim_users(user_id) WHERE is_current;
";

const DIM_PROJECTS_SQL: &str = r"
CREATE TABLE dim_projects (
    project_key     BIGSERIAL PRIMARY KEY,
    project_id      INTEGER NOT NULL,
    name            VARCHAR(255) NOT NULL,
    status          VARCHAR(50) NOT NULL,
    project_type    VARCHAR(50) NOT NULL,
    is_current      BOOLEAN NOT NULL,
    valid_from      TIMESTAMPTZ NOT NULL,
    valid_to        TIMESTAMPTZ
);

CREATE INDEX idx_dim_projects_natural ON dim_projects(project_id);

CREATE UNIQUE INDEX uq_dim_projects_current
    ON dim_projects(project_id) WHERE is_current;
";

const DIM_PRODUCTS_SQL: &str = r"
CREATE TABLE dim_products (
    product_key     BIGSERIAL PRIMARY KEY,
    product_id      INTEGER NOT NULL,
    name            VARCHAR(255) NOT NULL,
    category        VARCHAR(100) NOT NULL,
    vendor          VARCHAR(255) NOT NULL,
    is_current      BOOLEAN NOT NULL,
    valid_from      TIMESTAMPTZ NOT NULL,
    valid_to        TIMESTAMPTZ
);

CREATE INDEX idx_dim_products_natural ON dim_products(product_id);

CREATE UNIQUE INDEX uq_dim_products_current
    ON dim_products(product_id) WHERE is_current;
";

const FACT_PROJECT_METRICS_SQL: &str = r"
CREATE TABLE fact_project_metrics (
    id                      BIGSERIAL PRIMARY KEY,
    date_key                INTEGER NOT NULL REFERENCES dim_date(date_key),
    project_key             BIGINT NOT NULL REFERENCES dim_projects(project_key),
    user_key                BIGINT NOT NULL REFERENCES dim_users(user_key),
    total_products          INTEGER NOT NULL DEFAULT 0,
    total_value             NUMERIC(12, 2) NOT NULL DEFAULT 0,
    completion_percentage   NUMERIC(5, 2) NOT NULL DEFAULT 0,
    loaded_at               TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_project_metrics_date ON fact_project_metrics(date_key);
CREATE INDEX idx_project_metrics_project ON fact_project_metrics(project_key);
CREATE INDEX idx_project_metrics_user ON fact_project_metrics(user_key);
";

const FACT_PRODUCT_USAGE_SQL: &str = r"
CREATE TABLE fact_product_usage (
    id                  BIGSERIAL PRIMARY KEY,
    date_key            INTEGER NOT NULL REFERENCES dim_date(date_key),
    product_key         BIGINT NOT NULL REFERENCES dim_products(product_key),
    project_key         BIGINT NOT NULL REFERENCES dim_projects(project_key),
    quantity_used       INTEGER NOT NULL DEFAULT 0,
    total_cost          NUMERIC(12, 2) NOT NULL DEFAULT 0,
    efficiency_score    NUMERIC(5, 2) NOT NULL DEFAULT 0,
    loaded_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_product_usage_date ON fact_product_usage(date_key);
CREATE INDEX idx_product_usage_product ON fact_product_usage(product_key);
CREATE INDEX idx_product_usage_project ON fact_product_usage(project_key);
";

const FACT_PROJECT_DAILY_SQL: &str = r"
CREATE TABLE fact_project_daily (
    id                  BIGSERIAL PRIMARY KEY,
    date_key            INTEGER NOT NULL REFERENCES dim_date(date_key),
    project_key         BIGINT NOT NULL REFERENCES dim_projects(project_key),
    user_key            BIGINT NOT NULL REFERENCES dim_users(user_key),
    products_count      INTEGER NOT NULL DEFAULT 0,
    total_value         NUMERIC(12, 2) NOT NULL DEFAULT 0,
    tasks_completed     INTEGER NOT NULL DEFAULT 0,
    tasks_pending       INTEGER NOT NULL DEFAULT 0,
    budget_utilized     NUMERIC(12, 2) NOT NULL DEFAULT 0,
    snapshot_time       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_project_daily_date ON fact_project_daily(date_key);
CREATE INDEX idx_project_daily_project ON fact_project_daily(project_key);
CREATE INDEX idx_project_daily_user ON fact_project_daily(user_key);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS fact_project_daily;
DROP TABLE IF EXISTS fact_product_usage;
DROP TABLE IF EXISTS fact_project_metrics;
DROP TABLE IF EXISTS dim_products;
DROP TABLE IF EXISTS dim_projects;
DROP TABLE IF EXISTS dim_users;
DROP TABLE IF EXISTS dim_date;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS projects;
DROP TABLE IF EXISTS users;
";
