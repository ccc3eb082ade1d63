// lib/src/engine.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use models::errors::AllocationResult;
use models::{
    Bed, BedAvailability, BedId, BedStatus, EmergencyAllocation, HospitalId, HospitalSummary,
    SpecialtyId,
};

use crate::allocator::EmergencyAllocator;
use crate::config::{AllocationSettings, AppConfig};
use crate::geo::TravelTimeEstimator;
use crate::locks::{CatalogLock, HospitalLocks};
use crate::search::{AvailabilitySearch, GeoAvailabilitySearch, SearchBound};
use crate::services::{BedService, HospitalService, SpecialtyService};
use crate::storage_engine::{create_storage, AllocationStore};

/// Selects which beds `find_available_beds` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedScope {
    Hospital(HospitalId),
    Specialty(SpecialtyId),
}

/// Entry point used by the REST layer and the CLI. Owns one store, one lock
/// registry and the services built on top of them.
pub struct AllocationEngine {
    store: Arc<dyn AllocationStore>,
    beds: BedService,
    hospitals: HospitalService,
    specialties: SpecialtyService,
    allocator: EmergencyAllocator,
    default_search_limit: usize,
}

impl AllocationEngine {
    pub fn new(store: Arc<dyn AllocationStore>, settings: &AllocationSettings) -> Self {
        let locks = Arc::new(HospitalLocks::new());
        let catalog = Arc::new(CatalogLock::new());
        let search: Arc<dyn AvailabilitySearch> = Arc::new(GeoAvailabilitySearch::new(store.clone()));
        let travel = TravelTimeEstimator::new(settings.average_speed_kmh);

        AllocationEngine {
            beds: BedService::new(store.clone(), locks.clone(), catalog.clone()),
            hospitals: HospitalService::new(store.clone(), locks, search.clone()),
            specialties: SpecialtyService::new(store.clone(), catalog),
            allocator: EmergencyAllocator::new(store.clone(), search, travel),
            default_search_limit: settings.default_search_limit,
            store,
        }
    }

    /// Opens the configured storage engine and wires the services on top of it.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let store = create_storage(&config.storage)
            .with_context(|| format!("failed to create {} storage", config.storage.engine))?;
        info!("[AllocationEngine] started on {} storage", store.get_type());
        Ok(Self::new(store, &config.allocation))
    }

    pub fn store(&self) -> &Arc<dyn AllocationStore> {
        &self.store
    }

    pub fn beds(&self) -> &BedService {
        &self.beds
    }

    pub fn hospitals(&self) -> &HospitalService {
        &self.hospitals
    }

    pub fn specialties(&self) -> &SpecialtyService {
        &self.specialties
    }

    pub fn default_search_limit(&self) -> usize {
        self.default_search_limit
    }

    pub async fn transition_bed_status(&self, bed_id: BedId, target: BedStatus) -> AllocationResult<Bed> {
        self.beds.transition_status(bed_id, target).await
    }

    pub async fn reserve_bed(&self, bed_id: BedId) -> AllocationResult<Bed> {
        self.beds.reserve(bed_id).await
    }

    pub async fn release_bed(&self, bed_id: BedId) -> AllocationResult<Bed> {
        self.beds.release(bed_id).await
    }

    pub async fn find_available_beds(&self, scope: BedScope) -> AllocationResult<Vec<BedAvailability>> {
        match scope {
            BedScope::Hospital(id) => self.beds.find_available_by_hospital(id).await,
            BedScope::Specialty(id) => self.beds.find_available_by_specialty(id).await,
        }
    }

    /// `limit` falls back to the configured default when absent.
    pub async fn search_nearest_with_availability(
        &self,
        latitude: f64,
        longitude: f64,
        specialty_code: &str,
        limit: Option<usize>,
    ) -> AllocationResult<Vec<HospitalSummary>> {
        let limit = limit.unwrap_or(self.default_search_limit);
        self.hospitals
            .search_nearest_with_availability(latitude, longitude, specialty_code, limit)
            .await
    }

    /// Radius-bounded variant. Results are still capped, by the configured
    /// default when `limit` is absent.
    pub async fn search_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        specialty_code: &str,
        max_km: f64,
        limit: Option<usize>,
    ) -> AllocationResult<Vec<HospitalSummary>> {
        let limit = Some(limit.unwrap_or(self.default_search_limit));
        self.hospitals
            .search_within(latitude, longitude, specialty_code, SearchBound::Radius { max_km, limit })
            .await
    }

    pub async fn allocate_for_emergency(
        &self,
        latitude: f64,
        longitude: f64,
        specialty_code: &str,
    ) -> AllocationResult<EmergencyAllocation> {
        self.allocator.allocate(latitude, longitude, specialty_code).await
    }

    pub async fn flush(&self) -> AllocationResult<()> {
        self.store.flush().await
    }

    /// True when the store holds no hospital yet.
    pub async fn is_empty(&self) -> AllocationResult<bool> {
        Ok(self.store.list_hospitals().await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::AllocationError;
    use crate::storage_engine::StorageConfig;

    #[tokio::test]
    async fn from_config_builds_an_empty_in_memory_engine() {
        let config = AppConfig::default();
        let engine = AllocationEngine::from_config(&config).unwrap();
        assert_eq!(engine.store().get_type(), "InMemory");
        assert!(engine.is_empty().await.unwrap());
        assert_eq!(engine.default_search_limit(), 10);
    }

    #[tokio::test]
    async fn from_config_opens_sled() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage: StorageConfig::sled(dir.path()),
            ..AppConfig::default()
        };
        let engine = AllocationEngine::from_config(&config).unwrap();
        assert_eq!(engine.store().get_type(), "Sled");
        engine.flush().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_specialty_allocation_fails() {
        let engine = AllocationEngine::from_config(&AppConfig::default()).unwrap();
        let err = engine.allocate_for_emergency(48.85, 2.35, "XYZ").await.unwrap_err();
        assert!(matches!(err, AllocationError::UnknownSpecialty(code) if code == "XYZ"));
    }

    #[tokio::test]
    async fn explicit_zero_limit_is_rejected() {
        let engine = AllocationEngine::from_config(&AppConfig::default()).unwrap();
        let err = engine
            .search_nearest_with_availability(48.85, 2.35, "CARD", Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput(_)));
    }
}
