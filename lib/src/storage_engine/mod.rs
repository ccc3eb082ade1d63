// lib/src/storage_engine/mod.rs

pub mod config;
pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;

pub use self::config::{StorageConfig, StorageEngineType, DEFAULT_DATA_DIRECTORY};
pub use inmemory_storage::InMemoryStorage;
pub use sled_storage::{open_sled_db, SledStorage};
pub use storage_engine::{AllocationStore, BedStore, HospitalStore, SpecialtyStore};

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

/// Creates a storage engine instance based on the provided configuration.
///
/// InMemory is the default; Sled persists under `data_directory/sled`.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn AllocationStore>> {
    match config.engine {
        StorageEngineType::InMemory => {
            info!("Using in-memory storage engine");
            Ok(Arc::new(InMemoryStorage::new()) as Arc<dyn AllocationStore>)
        }
        StorageEngineType::Sled => {
            let path = config.data_directory.join("sled");
            let db = open_sled_db(&path)
                .with_context(|| format!("failed to open sled database at {:?}", path))?;
            let storage = SledStorage::new(db).context("failed to open sled trees")?;
            info!("Using sled storage engine at {:?}", path);
            Ok(Arc::new(storage) as Arc<dyn AllocationStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_the_configured_engine() {
        let memory = create_storage(&StorageConfig::in_memory()).unwrap();
        assert_eq!(memory.get_type(), "InMemory");

        let dir = tempfile::tempdir().unwrap();
        let sled = create_storage(&StorageConfig::sled(dir.path())).unwrap();
        assert_eq!(sled.get_type(), "Sled");
    }
}
