// lib/src/lib.rs

//! Emergency bed-allocation engine: bed lifecycle, per-hospital availability,
//! nearest-hospital search and the storage engines behind them.

pub mod aggregate;
pub mod allocator;
pub mod config;
pub mod engine;
pub mod geo;
pub mod lifecycle;
pub mod locks;
pub mod search;
pub mod seed;
pub mod services;
pub mod storage_engine;

pub use allocator::EmergencyAllocator;
pub use self::config::{load_app_config, AllocationSettings, AppConfig};
pub use engine::{AllocationEngine, BedScope};
pub use search::{AvailabilitySearch, GeoAvailabilitySearch, RankedHospital, SearchBound};
pub use seed::{DataInitializer, SeedReport};
pub use storage_engine::{create_storage, AllocationStore, StorageConfig, StorageEngineType};
