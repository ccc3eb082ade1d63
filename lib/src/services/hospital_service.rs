// lib/src/services/hospital_service.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use models::errors::{require_text, AllocationError, AllocationResult};
use models::{
    normalize_specialty_code, Hospital, HospitalId, HospitalSummary, HospitalUpdate, NewHospital,
    SpecialtyId,
};

use crate::aggregate::recompute_in_store;
use crate::geo::validate_coordinates;
use crate::locks::HospitalLocks;
use crate::search::{AvailabilitySearch, SearchBound};
use crate::storage_engine::AllocationStore;

pub struct HospitalService {
    store: Arc<dyn AllocationStore>,
    locks: Arc<HospitalLocks>,
    search: Arc<dyn AvailabilitySearch>,
}

impl HospitalService {
    pub fn new(
        store: Arc<dyn AllocationStore>,
        locks: Arc<HospitalLocks>,
        search: Arc<dyn AvailabilitySearch>,
    ) -> Self {
        HospitalService { store, locks, search }
    }

    async fn load(&self, id: HospitalId) -> AllocationResult<Hospital> {
        self.store
            .get_hospital(id)
            .await?
            .ok_or_else(|| AllocationError::hospital_not_found(id))
    }

    async fn resolve_specialties(
        &self,
        ids: &[SpecialtyId],
    ) -> AllocationResult<BTreeSet<SpecialtyId>> {
        let mut resolved = BTreeSet::new();
        for id in ids {
            if self.store.get_specialty(*id).await?.is_none() {
                return Err(AllocationError::specialty_not_found(id));
            }
            resolved.insert(*id);
        }
        Ok(resolved)
    }

    pub async fn find_all(&self) -> AllocationResult<Vec<Hospital>> {
        debug!("[HospitalService] find_all called");
        self.store.list_hospitals().await
    }

    pub async fn find_by_id(&self, id: HospitalId) -> AllocationResult<Hospital> {
        self.load(id).await
    }

    pub async fn find_by_city(&self, city: &str) -> AllocationResult<Vec<Hospital>> {
        let city = require_text("city", city)?;
        self.store.list_hospitals_by_city(city).await
    }

    /// Active hospitals offering the specialty. Unknown codes yield an empty list.
    pub async fn find_by_specialty_code(&self, code: &str) -> AllocationResult<Vec<Hospital>> {
        let code = normalize_specialty_code(require_text("specialtyCode", code)?);
        match self.store.find_specialty_by_code(&code).await? {
            Some(specialty) => self.store.list_hospitals_supporting(specialty.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Active hospitals whose cached available-bed count is positive.
    pub async fn find_all_with_availability(&self) -> AllocationResult<Vec<Hospital>> {
        let hospitals = self.store.list_active_hospitals().await?;
        Ok(hospitals.into_iter().filter(|h| h.available_beds > 0).collect())
    }

    pub async fn create(&self, new_hospital: NewHospital) -> AllocationResult<Hospital> {
        let id = self.store.next_hospital_id().await?;
        let now = Utc::now();
        let mut hospital = Hospital::new(
            id,
            &new_hospital.name,
            &new_hospital.city,
            new_hospital.latitude,
            new_hospital.longitude,
            now,
        )?;
        hospital.address = new_hospital.address;
        hospital.postal_code = new_hospital.postal_code;
        hospital.phone_number = new_hospital.phone_number;
        hospital.total_beds = new_hospital.total_beds.unwrap_or(0);
        hospital.active = new_hospital.active.unwrap_or(true);
        hospital.specialties = self.resolve_specialties(&new_hospital.specialty_ids).await?;

        let _guard = self.locks.acquire(id).await;
        self.store.insert_hospital(hospital).await?;
        recompute_in_store(self.store.as_ref(), id).await?;
        info!("[HospitalService] created hospital {} ({})", id, new_hospital.name.trim());
        self.load(id).await
    }

    pub async fn update(&self, id: HospitalId, update: HospitalUpdate) -> AllocationResult<Hospital> {
        let _guard = self.locks.acquire(id).await;
        let mut hospital = self.load(id).await?;

        let latitude = update.latitude.unwrap_or(hospital.latitude);
        let longitude = update.longitude.unwrap_or(hospital.longitude);
        let point = validate_coordinates(latitude, longitude)?;
        hospital.latitude = point.latitude;
        hospital.longitude = point.longitude;

        if let Some(name) = &update.name {
            hospital.name = require_text("name", name)?.to_string();
        }
        if let Some(city) = &update.city {
            hospital.city = require_text("city", city)?.to_string();
        }
        if update.address.is_some() {
            hospital.address = update.address;
        }
        if update.postal_code.is_some() {
            hospital.postal_code = update.postal_code;
        }
        if update.phone_number.is_some() {
            hospital.phone_number = update.phone_number;
        }
        if let Some(total_beds) = update.total_beds {
            hospital.total_beds = total_beds;
        }
        if let Some(active) = update.active {
            hospital.active = active;
        }
        if let Some(ids) = &update.specialty_ids {
            hospital.specialties = self.resolve_specialties(ids).await?;
        }
        hospital.updated_at = Utc::now();

        self.store.update_hospital(hospital).await?;
        recompute_in_store(self.store.as_ref(), id).await?;
        info!("[HospitalService] updated hospital {}", id);
        self.load(id).await
    }

    /// Deletes the hospital together with all of its beds.
    pub async fn delete(&self, id: HospitalId) -> AllocationResult<()> {
        let _guard = self.locks.acquire(id).await;
        self.load(id).await?;
        let beds = self.store.list_beds_by_hospital(id).await?;
        for bed in &beds {
            self.store.delete_bed(bed.id).await?;
        }
        self.store.delete_hospital(id).await?;
        warn!("[HospitalService] deleted hospital {} and {} beds", id, beds.len());
        Ok(())
    }

    /// Idempotent.
    pub async fn add_specialty(
        &self,
        hospital_id: HospitalId,
        specialty_id: SpecialtyId,
    ) -> AllocationResult<Hospital> {
        let _guard = self.locks.acquire(hospital_id).await;
        let mut hospital = self.load(hospital_id).await?;
        if self.store.get_specialty(specialty_id).await?.is_none() {
            return Err(AllocationError::specialty_not_found(specialty_id));
        }
        if hospital.specialties.insert(specialty_id) {
            hospital.updated_at = Utc::now();
            self.store.update_hospital(hospital.clone()).await?;
            info!("[HospitalService] specialty {} added to hospital {}", specialty_id, hospital_id);
        } else {
            debug!("[HospitalService] hospital {} already offers specialty {}", hospital_id, specialty_id);
        }
        Ok(hospital)
    }

    /// Idempotent.
    pub async fn remove_specialty(
        &self,
        hospital_id: HospitalId,
        specialty_id: SpecialtyId,
    ) -> AllocationResult<Hospital> {
        let _guard = self.locks.acquire(hospital_id).await;
        let mut hospital = self.load(hospital_id).await?;
        if self.store.get_specialty(specialty_id).await?.is_none() {
            return Err(AllocationError::specialty_not_found(specialty_id));
        }
        if hospital.specialties.remove(&specialty_id) {
            hospital.updated_at = Utc::now();
            self.store.update_hospital(hospital.clone()).await?;
            info!("[HospitalService] specialty {} removed from hospital {}", specialty_id, hospital_id);
        }
        Ok(hospital)
    }

    /// Forces a recount of the hospital's available beds.
    pub async fn update_available_beds(&self, hospital_id: HospitalId) -> AllocationResult<u32> {
        let _guard = self.locks.acquire(hospital_id).await;
        recompute_in_store(self.store.as_ref(), hospital_id).await
    }

    /// Nearest active hospitals with at least one available bed of the specialty.
    /// The summaries carry the specialty-specific available count.
    pub async fn search_nearest_with_availability(
        &self,
        latitude: f64,
        longitude: f64,
        specialty_code: &str,
        limit: usize,
    ) -> AllocationResult<Vec<HospitalSummary>> {
        self.search_within(latitude, longitude, specialty_code, SearchBound::Limit(limit))
            .await
    }

    pub async fn search_within(
        &self,
        latitude: f64,
        longitude: f64,
        specialty_code: &str,
        bound: SearchBound,
    ) -> AllocationResult<Vec<HospitalSummary>> {
        let origin = validate_coordinates(latitude, longitude)?;
        let code = normalize_specialty_code(require_text("specialtyCode", specialty_code)?);
        bound.validate()?;

        let Some(specialty) = self.store.find_specialty_by_code(&code).await? else {
            debug!("[HospitalService] unknown specialty {}, empty search result", code);
            return Ok(Vec::new());
        };
        let ranked = self.search.rank(specialty.id, origin, bound).await?;
        Ok(ranked
            .iter()
            .map(|r| HospitalSummary::with_available_beds(&r.hospital, r.available_beds))
            .collect())
    }
}
