//! Application configuration.
//!
//! Every section has defaults, so an empty environment yields a working
//! configuration.

use crate::recommendation::RecommendationConfig;
use serde::Deserialize;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bookstore.yaml";
/// Prefix for configuration environment variables (`BOOKSTORE__ORDERS__PAGE_LIMIT`).
pub const CONFIG_ENV_PREFIX: &str = "BOOKSTORE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Inbox capacity of every resource actor.
    pub actor_buffer_size: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { actor_buffer_size: 100 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Page size of admin listings when the caller gives none.
    pub page_limit: usize,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self { page_limit: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    /// Recorded on refunds that carry no reason.
    pub default_refund_reason: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self { default_refund_reason: "Customer request".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Window of the dashboard's recent-orders count.
    pub recent_days: i64,
    pub top_books: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { recent_days: 7, top_books: 5 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub system: SystemConfig,
    pub orders: OrdersConfig,
    pub payments: PaymentsConfig,
    pub recommendations: RecommendationConfig,
    pub stats: StatsConfig,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// Sources, later overriding earlier:
    /// 1. `bookstore.yaml` in the current directory (if it exists)
    /// 2. The file at `path` (required when given)
    /// 3. `BOOKSTORE__*` environment variables, `__` separating sections
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder =
            Config::builder().add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.system.actor_buffer_size, 100);
        assert_eq!(config.orders.page_limit, 20);
        assert_eq!(config.recommendations.cart_limit, 5);
        assert_eq!(config.stats.recent_days, 7);
        assert_eq!(config.stats.top_books, 5);
        assert_eq!(
            config.recommendations.associated("Science-Fiction"),
            &["Fantasy".to_string(), "Thriller".to_string(), "Aventure".to_string()]
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some("/nonexistent/bookstore.yaml")).is_err());
    }
}
