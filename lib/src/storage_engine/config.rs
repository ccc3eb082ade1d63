// lib/src/storage_engine/config.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use models::errors::AllocationError;

pub const DEFAULT_DATA_DIRECTORY: &str = "./data/bedalloc";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageEngineType {
    #[default]
    #[serde(alias = "inmemory", alias = "memory")]
    InMemory,
    Sled,
}

impl FromStr for StorageEngineType {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inmemory" | "in_memory" | "memory" => Ok(StorageEngineType::InMemory),
            "sled" => Ok(StorageEngineType::Sled),
            _ => Err(AllocationError::ConfigurationError(format!(
                "Unknown storage engine type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::InMemory => write!(f, "in_memory"),
            StorageEngineType::Sled => write!(f, "sled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub engine: StorageEngineType,
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
}

fn default_data_directory() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIRECTORY)
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            engine: StorageEngineType::InMemory,
            data_directory: default_data_directory(),
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        StorageConfig::default()
    }

    pub fn sled(data_directory: impl Into<PathBuf>) -> Self {
        StorageConfig {
            engine: StorageEngineType::Sled,
            data_directory: data_directory.into(),
        }
    }
}
