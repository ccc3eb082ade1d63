// lib/src/storage_engine/storage_engine.rs

use async_trait::async_trait;

use models::errors::AllocationResult;
use models::{
    Bed, BedId, BedStatus, Hospital, HospitalId, Specialty, SpecialtyGroup, SpecialtyGroupId,
    SpecialtyId,
};

#[async_trait]
pub trait BedStore: Send + Sync + 'static {
    /// Reserves a fresh, never-reused bed id.
    async fn next_bed_id(&self) -> AllocationResult<BedId>;
    /// Stores a new bed with version 1. Fails with `AlreadyExists` if the id is taken.
    async fn insert_bed(&self, bed: Bed) -> AllocationResult<Bed>;
    async fn get_bed(&self, id: BedId) -> AllocationResult<Option<Bed>>;
    /// Overwrites a bed only if its stored version equals `expected_version`.
    /// Returns the stored copy with the version incremented, `Conflict` on a
    /// version mismatch and `NotFound` if the bed is gone.
    async fn replace_bed(&self, bed: Bed, expected_version: u64) -> AllocationResult<Bed>;
    async fn delete_bed(&self, id: BedId) -> AllocationResult<Option<Bed>>;
    async fn list_beds_by_hospital(&self, hospital_id: HospitalId) -> AllocationResult<Vec<Bed>>;
    async fn list_beds_by_hospital_and_status(
        &self,
        hospital_id: HospitalId,
        status: BedStatus,
    ) -> AllocationResult<Vec<Bed>>;
    async fn list_beds_by_specialty_and_status(
        &self,
        specialty_id: SpecialtyId,
        status: BedStatus,
    ) -> AllocationResult<Vec<Bed>>;
    async fn count_available_beds(&self, hospital_id: HospitalId) -> AllocationResult<u32>;
    async fn count_beds_by_specialty(&self, specialty_id: SpecialtyId) -> AllocationResult<u32>;
}

#[async_trait]
pub trait HospitalStore: Send + Sync + 'static {
    async fn next_hospital_id(&self) -> AllocationResult<HospitalId>;
    /// Fails with `AlreadyExists` when the id or the name is already used.
    async fn insert_hospital(&self, hospital: Hospital) -> AllocationResult<()>;
    async fn get_hospital(&self, id: HospitalId) -> AllocationResult<Option<Hospital>>;
    /// Fails with `NotFound` if absent and `AlreadyExists` if the new name
    /// belongs to another hospital.
    async fn update_hospital(&self, hospital: Hospital) -> AllocationResult<()>;
    async fn delete_hospital(&self, id: HospitalId) -> AllocationResult<Option<Hospital>>;
    /// All hospitals ordered by id.
    async fn list_hospitals(&self) -> AllocationResult<Vec<Hospital>>;
    async fn find_hospital_by_name(&self, name: &str) -> AllocationResult<Option<Hospital>>;

    async fn list_active_hospitals(&self) -> AllocationResult<Vec<Hospital>> {
        let hospitals = self.list_hospitals().await?;
        Ok(hospitals.into_iter().filter(|h| h.active).collect())
    }

    /// Active hospitals in `city`, compared case-insensitively.
    async fn list_hospitals_by_city(&self, city: &str) -> AllocationResult<Vec<Hospital>> {
        let wanted = city.trim().to_lowercase();
        let hospitals = self.list_active_hospitals().await?;
        Ok(hospitals
            .into_iter()
            .filter(|h| h.city.to_lowercase() == wanted)
            .collect())
    }

    async fn list_hospitals_supporting(
        &self,
        specialty_id: SpecialtyId,
    ) -> AllocationResult<Vec<Hospital>> {
        let hospitals = self.list_active_hospitals().await?;
        Ok(hospitals.into_iter().filter(|h| h.supports(specialty_id)).collect())
    }
}

#[async_trait]
pub trait SpecialtyStore: Send + Sync + 'static {
    async fn next_specialty_id(&self) -> AllocationResult<SpecialtyId>;
    /// Fails with `AlreadyExists` when the code is taken.
    async fn insert_specialty(&self, specialty: Specialty) -> AllocationResult<()>;
    async fn get_specialty(&self, id: SpecialtyId) -> AllocationResult<Option<Specialty>>;
    async fn find_specialty_by_code(&self, code: &str) -> AllocationResult<Option<Specialty>>;
    async fn list_specialties(&self) -> AllocationResult<Vec<Specialty>>;
    /// Fails with `NotFound` if absent and `AlreadyExists` if the code belongs
    /// to another specialty.
    async fn update_specialty(&self, specialty: Specialty) -> AllocationResult<()>;
    async fn delete_specialty(&self, id: SpecialtyId) -> AllocationResult<Option<Specialty>>;

    async fn next_specialty_group_id(&self) -> AllocationResult<SpecialtyGroupId>;
    /// Fails with `AlreadyExists` when the code or the name is taken.
    async fn insert_specialty_group(&self, group: SpecialtyGroup) -> AllocationResult<()>;
    async fn get_specialty_group(
        &self,
        id: SpecialtyGroupId,
    ) -> AllocationResult<Option<SpecialtyGroup>>;
    /// Fails with `NotFound` if absent and `AlreadyExists` if the code or the
    /// name belongs to another group.
    async fn update_specialty_group(&self, group: SpecialtyGroup) -> AllocationResult<()>;
    async fn delete_specialty_group(
        &self,
        id: SpecialtyGroupId,
    ) -> AllocationResult<Option<SpecialtyGroup>>;
    async fn find_specialty_group_by_code(
        &self,
        code: &str,
    ) -> AllocationResult<Option<SpecialtyGroup>>;
    async fn list_specialty_groups(&self) -> AllocationResult<Vec<SpecialtyGroup>>;
}

/// Everything the allocation engine needs from a backing store.
#[async_trait]
pub trait AllocationStore: BedStore + HospitalStore + SpecialtyStore {
    fn get_type(&self) -> &'static str;
    async fn flush(&self) -> AllocationResult<()>;
}
