//! Configuration for the ledger

use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Feed configuration
    pub feed: FeedConfig,

    /// Activity query configuration
    pub activity: ActivityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "peerpay-core".to_string(),
            feed: FeedConfig::default(),
            activity: ActivityConfig::default(),
        }
    }
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Number of records rendered by default
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

/// Activity query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Default number of records returned per account query
    pub default_limit: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(limit) = std::env::var("PEERPAY_FEED_LIMIT") {
            config.feed.limit = limit
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid feed limit: {}", limit)))?;
        }

        if let Ok(limit) = std::env::var("PEERPAY_ACTIVITY_LIMIT") {
            config.activity.default_limit = limit
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid activity limit: {}", limit)))?;
        }

        Ok(config)
    }
}
