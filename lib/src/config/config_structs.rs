// lib/src/config/config_structs.rs

use serde::{Deserialize, Serialize};

use models::errors::{AllocationError, AllocationResult};

use crate::config::config_defaults::*;
use crate::storage_engine::StorageConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Tuning of the search and the travel-time estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationSettings {
    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,
    #[serde(default = "default_average_speed_kmh")]
    pub average_speed_kmh: f64,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        AllocationSettings {
            default_search_limit: default_search_limit(),
            average_speed_kmh: default_average_speed_kmh(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeedConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: default_log_level() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub allocation: AllocationSettings,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    pub fn validate(&self) -> AllocationResult<()> {
        if self.allocation.default_search_limit == 0 {
            return Err(AllocationError::ConfigurationError(
                "allocation.default_search_limit must be positive".to_string(),
            ));
        }
        let speed = self.allocation.average_speed_kmh;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(AllocationError::ConfigurationError(format!(
                "allocation.average_speed_kmh must be positive, got {}",
                speed
            )));
        }
        Ok(())
    }
}
