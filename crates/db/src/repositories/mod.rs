//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The ETL steps and the analytics read layer each get their
//! own repository; the operational source tables are exposed read-only.

pub mod analytics;
pub mod date_dim;
pub mod dimension;
pub mod facts;
pub mod source;

pub use analytics::{
    AnalyticsError, AnalyticsRepository, ProjectPerformanceRow, ProjectTrends, TopProductRow,
    UserActivityRow,
};
pub use date_dim::{DateDimensionError, DateDimensionRepository};
pub use dimension::{DimensionError, DimensionRepository, SyncOutcome};
pub use facts::{FactError, FactRepository};
pub use source::{SourceError, SourceRepository};
