// lib/src/services/bed_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use models::errors::{require_text, AllocationError, AllocationResult};
use models::{
    normalize_specialty_code, Bed, BedAvailability, BedId, BedStatus, BedUpdate, HospitalId,
    NewBed, SpecialtyId,
};

use crate::aggregate::recompute_in_store;
use crate::geo::{distance_km, validate_coordinates};
use crate::lifecycle::{self, TransitionOutcome};
use crate::locks::{CatalogLock, HospitalLocks};
use crate::storage_engine::AllocationStore;

/// Attempts made when a bed write loses an optimistic version race.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Bed lifecycle and CRUD. Every mutation runs under the owning hospital's
/// lock and ends with a recount of that hospital's available beds.
pub struct BedService {
    store: Arc<dyn AllocationStore>,
    locks: Arc<HospitalLocks>,
    catalog: Arc<CatalogLock>,
}

impl BedService {
    pub fn new(
        store: Arc<dyn AllocationStore>,
        locks: Arc<HospitalLocks>,
        catalog: Arc<CatalogLock>,
    ) -> Self {
        BedService { store, locks, catalog }
    }

    async fn load(&self, id: BedId) -> AllocationResult<Bed> {
        self.store
            .get_bed(id)
            .await?
            .ok_or_else(|| AllocationError::bed_not_found(id))
    }

    async fn require_hospital(&self, id: HospitalId) -> AllocationResult<()> {
        match self.store.get_hospital(id).await? {
            Some(_) => Ok(()),
            None => Err(AllocationError::hospital_not_found(id)),
        }
    }

    async fn require_specialty(&self, id: SpecialtyId) -> AllocationResult<()> {
        match self.store.get_specialty(id).await? {
            Some(_) => Ok(()),
            None => Err(AllocationError::specialty_not_found(id)),
        }
    }

    pub async fn find_all(&self) -> AllocationResult<Vec<Bed>> {
        debug!("[BedService] find_all called");
        let hospitals = self.store.list_hospitals().await?;
        let mut beds = Vec::new();
        for hospital in hospitals {
            beds.extend(self.store.list_beds_by_hospital(hospital.id).await?);
        }
        beds.sort_by_key(|b| b.id);
        Ok(beds)
    }

    pub async fn find_by_id(&self, id: BedId) -> AllocationResult<Bed> {
        debug!("[BedService] find_by_id {}", id);
        self.load(id).await
    }

    pub async fn create(&self, new_bed: NewBed) -> AllocationResult<Bed> {
        let bed_number = require_text("bedNumber", &new_bed.bed_number)?.to_string();
        let _catalog = self.catalog.shared().await;
        let _guard = self.locks.acquire(new_bed.hospital_id).await;
        self.require_hospital(new_bed.hospital_id).await?;
        self.require_specialty(new_bed.specialty_id).await?;

        let now = Utc::now();
        let id = self.store.next_bed_id().await?;
        let mut bed = Bed::new(id, new_bed.hospital_id, new_bed.specialty_id, bed_number, now)
            .with_location(new_bed.room_number, new_bed.floor);
        if let Some(status) = new_bed.status {
            bed.record_status(status, now);
        }
        let saved = self.store.insert_bed(bed).await?;
        recompute_in_store(self.store.as_ref(), saved.hospital_id).await?;
        info!(
            "[BedService] created bed {} (hospital {}, specialty {}, status {})",
            saved.id,
            saved.hospital_id,
            saved.specialty_id,
            saved.status()
        );
        Ok(saved)
    }

    pub async fn update(&self, id: BedId, update: BedUpdate) -> AllocationResult<Bed> {
        if let Some(number) = &update.bed_number {
            require_text("bedNumber", number)?;
        }
        let _catalog = self.catalog.shared().await;
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let snapshot = self.load(id).await?;
            let target_hospital = update.hospital_id.unwrap_or(snapshot.hospital_id);
            let _guard = self
                .locks
                .acquire_many(&[snapshot.hospital_id, target_hospital])
                .await;

            let mut bed = self.load(id).await?;
            if bed.hospital_id != snapshot.hospital_id {
                continue;
            }
            let expected_version = bed.version;
            let now = Utc::now();

            if let Some(status) = update.status {
                lifecycle::transition(&mut bed, status, now)?;
            }
            if let Some(hospital_id) = update.hospital_id {
                self.require_hospital(hospital_id).await?;
                bed.hospital_id = hospital_id;
            }
            if let Some(specialty_id) = update.specialty_id {
                self.require_specialty(specialty_id).await?;
                bed.specialty_id = specialty_id;
            }
            if let Some(number) = &update.bed_number {
                bed.bed_number = number.trim().to_string();
            }
            if update.room_number.is_some() {
                bed.room_number = update.room_number.clone();
            }
            if update.floor.is_some() {
                bed.floor = update.floor;
            }
            bed.updated_at = now;

            match self.store.replace_bed(bed, expected_version).await {
                Ok(saved) => {
                    recompute_in_store(self.store.as_ref(), snapshot.hospital_id).await?;
                    if saved.hospital_id != snapshot.hospital_id {
                        recompute_in_store(self.store.as_ref(), saved.hospital_id).await?;
                    }
                    info!("[BedService] updated bed {}", saved.id);
                    return Ok(saved);
                }
                Err(AllocationError::Conflict(reason)) => {
                    warn!("[BedService] retrying update of bed {}: {}", id, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Err(gave_up(id))
    }

    /// Deletes under the lock of the hospital that owns the bed at deletion
    /// time. A bed moved away meanwhile is re-read and retried.
    pub async fn delete(&self, id: BedId) -> AllocationResult<()> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let snapshot = self.load(id).await?;
            let _guard = self.locks.acquire(snapshot.hospital_id).await;

            let bed = self.load(id).await?;
            if bed.hospital_id != snapshot.hospital_id {
                debug!("[BedService] bed {} moved before delete, retrying", id);
                continue;
            }
            self.store
                .delete_bed(id)
                .await?
                .ok_or_else(|| AllocationError::bed_not_found(id))?;
            recompute_in_store(self.store.as_ref(), bed.hospital_id).await?;
            warn!("[BedService] deleted bed {}", id);
            return Ok(());
        }
        Err(gave_up(id))
    }

    pub async fn find_available_by_hospital(
        &self,
        hospital_id: HospitalId,
    ) -> AllocationResult<Vec<BedAvailability>> {
        let beds = self
            .store
            .list_beds_by_hospital_and_status(hospital_id, BedStatus::Available)
            .await?;
        Ok(beds.iter().map(BedAvailability::from).collect())
    }

    pub async fn find_available_by_specialty(
        &self,
        specialty_id: SpecialtyId,
    ) -> AllocationResult<Vec<BedAvailability>> {
        let beds = self
            .store
            .list_beds_by_specialty_and_status(specialty_id, BedStatus::Available)
            .await?;
        Ok(beds.iter().map(BedAvailability::from).collect())
    }

    /// Available beds for a specialty code. An unknown code yields an empty list.
    pub async fn find_available_by_specialty_code(
        &self,
        code: &str,
    ) -> AllocationResult<Vec<BedAvailability>> {
        let code = normalize_specialty_code(require_text("specialtyCode", code)?);
        match self.store.find_specialty_by_code(&code).await? {
            Some(specialty) => self.find_available_by_specialty(specialty.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Available beds of a specialty ordered by the distance of their hospital,
    /// beds of the same hospital in id order.
    pub async fn find_available_beds_for_emergency(
        &self,
        code: &str,
        latitude: f64,
        longitude: f64,
    ) -> AllocationResult<Vec<BedAvailability>> {
        let code = normalize_specialty_code(require_text("specialtyCode", code)?);
        validate_coordinates(latitude, longitude)?;
        let Some(specialty) = self.store.find_specialty_by_code(&code).await? else {
            return Ok(Vec::new());
        };
        let beds = self
            .store
            .list_beds_by_specialty_and_status(specialty.id, BedStatus::Available)
            .await?;

        let mut ranked: Vec<(f64, Bed)> = Vec::with_capacity(beds.len());
        for bed in beds {
            let distance = match self.store.get_hospital(bed.hospital_id).await? {
                Some(h) => distance_km(latitude, longitude, h.latitude, h.longitude),
                None => f64::MAX,
            };
            ranked.push((distance, bed));
        }
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
        Ok(ranked.iter().map(|(_, bed)| BedAvailability::from(bed)).collect())
    }

    pub async fn transition_status(&self, id: BedId, target: BedStatus) -> AllocationResult<Bed> {
        self.mutate_status(id, move |bed, now| lifecycle::transition(bed, target, now))
            .await
    }

    pub async fn reserve(&self, id: BedId) -> AllocationResult<Bed> {
        self.mutate_status(id, lifecycle::reserve).await
    }

    pub async fn release(&self, id: BedId) -> AllocationResult<Bed> {
        self.mutate_status(id, lifecycle::release).await
    }

    /// Read-validate-write of one bed followed by the hospital recount, all under
    /// the hospital lock. A version conflict re-reads and retries.
    async fn mutate_status<F>(&self, id: BedId, apply: F) -> AllocationResult<Bed>
    where
        F: Fn(&mut Bed, DateTime<Utc>) -> AllocationResult<TransitionOutcome> + Send + Sync,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let snapshot = self.load(id).await?;
            let _guard = self.locks.acquire(snapshot.hospital_id).await;

            let mut bed = self.load(id).await?;
            if bed.hospital_id != snapshot.hospital_id {
                continue;
            }
            let expected_version = bed.version;
            let outcome = apply(&mut bed, Utc::now())?;
            let TransitionOutcome::Changed { from, to } = outcome else {
                debug!("[BedService] bed {} already {}", id, bed.status());
                return Ok(bed);
            };

            match self.store.replace_bed(bed, expected_version).await {
                Ok(saved) => {
                    recompute_in_store(self.store.as_ref(), saved.hospital_id).await?;
                    info!("[BedService] bed {} status {} -> {}", id, from, to);
                    return Ok(saved);
                }
                Err(AllocationError::Conflict(reason)) => {
                    warn!("[BedService] retrying status change of bed {}: {}", id, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Err(gave_up(id))
    }
}

fn gave_up(id: BedId) -> AllocationError {
    AllocationError::Conflict(format!(
        "bed {} kept changing concurrently; gave up after {} attempts",
        id, MAX_WRITE_ATTEMPTS
    ))
}
