//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// ETL scheduling configuration.
    #[serde(default)]
    pub etl: EtlConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// ETL scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    /// Hour of day (UTC, 0-23) at which the daily full run fires.
    #[serde(default = "default_daily_hour")]
    pub daily_hour: u32,
    /// How many days ahead the date dimension is kept populated.
    #[serde(default = "default_date_horizon_days")]
    pub date_horizon_days: i64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            daily_hour: default_daily_hour(),
            date_horizon_days: default_date_horizon_days(),
        }
    }
}

fn default_daily_hour() -> u32 {
    1 // 01:00 UTC, after the operational day closes
}

fn default_date_horizon_days() -> i64 {
    365
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ATELIER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etl_config_defaults() {
        let etl = EtlConfig::default();
        assert_eq!(etl.daily_hour, 1);
        assert_eq!(etl.date_horizon_days, 365);
    }

    #[test]
    fn test_database_config_defaults_apply() {
        let cfg: DatabaseConfig =
            serde_json::from_str(r#"{"url": "postgres://localhost/atelier"}"#).unwrap();
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.min_connections, 1);
    }
}
