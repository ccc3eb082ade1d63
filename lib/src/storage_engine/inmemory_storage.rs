// lib/src/storage_engine/inmemory_storage.rs

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use models::errors::{AllocationError, AllocationResult};
use models::{
    Bed, BedId, BedStatus, Hospital, HospitalId, Specialty, SpecialtyGroup, SpecialtyGroupId,
    SpecialtyId,
};

use super::storage_engine::{AllocationStore, BedStore, HospitalStore, SpecialtyStore};

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    beds: Arc<RwLock<HashMap<BedId, Bed>>>,
    hospitals: Arc<RwLock<HashMap<HospitalId, Hospital>>>,
    specialties: Arc<RwLock<HashMap<SpecialtyId, Specialty>>>,
    specialty_groups: Arc<RwLock<HashMap<SpecialtyGroupId, SpecialtyGroup>>>,
    sequence: AtomicU64,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn sorted_by_key<K: Ord + Hash + Copy, V: Clone>(map: &HashMap<K, V>, keep: impl Fn(&V) -> bool) -> Vec<V> {
    let mut keys: Vec<K> = map.iter().filter(|(_, v)| keep(v)).map(|(k, _)| *k).collect();
    keys.sort();
    keys.into_iter().filter_map(|k| map.get(&k).cloned()).collect()
}

#[async_trait]
impl BedStore for InMemoryStorage {
    async fn next_bed_id(&self) -> AllocationResult<BedId> {
        Ok(BedId(self.next_id()))
    }

    async fn insert_bed(&self, mut bed: Bed) -> AllocationResult<Bed> {
        let mut beds = self.beds.write().await;
        if beds.contains_key(&bed.id) {
            return Err(AllocationError::AlreadyExists(format!("bed {}", bed.id)));
        }
        bed.version = 1;
        beds.insert(bed.id, bed.clone());
        Ok(bed)
    }

    async fn get_bed(&self, id: BedId) -> AllocationResult<Option<Bed>> {
        let beds = self.beds.read().await;
        Ok(beds.get(&id).cloned())
    }

    async fn replace_bed(&self, mut bed: Bed, expected_version: u64) -> AllocationResult<Bed> {
        let mut beds = self.beds.write().await;
        let current = beds
            .get(&bed.id)
            .ok_or_else(|| AllocationError::bed_not_found(bed.id))?;
        if current.version != expected_version {
            return Err(AllocationError::Conflict(format!(
                "bed {} is at version {}, expected {}",
                bed.id, current.version, expected_version
            )));
        }
        bed.version = expected_version + 1;
        beds.insert(bed.id, bed.clone());
        Ok(bed)
    }

    async fn delete_bed(&self, id: BedId) -> AllocationResult<Option<Bed>> {
        let mut beds = self.beds.write().await;
        Ok(beds.remove(&id))
    }

    async fn list_beds_by_hospital(&self, hospital_id: HospitalId) -> AllocationResult<Vec<Bed>> {
        let beds = self.beds.read().await;
        Ok(sorted_by_key(&beds, |b| b.hospital_id == hospital_id))
    }

    async fn list_beds_by_hospital_and_status(
        &self,
        hospital_id: HospitalId,
        status: BedStatus,
    ) -> AllocationResult<Vec<Bed>> {
        let beds = self.beds.read().await;
        Ok(sorted_by_key(&beds, |b| b.hospital_id == hospital_id && b.status() == status))
    }

    async fn list_beds_by_specialty_and_status(
        &self,
        specialty_id: SpecialtyId,
        status: BedStatus,
    ) -> AllocationResult<Vec<Bed>> {
        let beds = self.beds.read().await;
        Ok(sorted_by_key(&beds, |b| b.specialty_id == specialty_id && b.status() == status))
    }

    async fn count_available_beds(&self, hospital_id: HospitalId) -> AllocationResult<u32> {
        let beds = self.beds.read().await;
        let count = beds
            .values()
            .filter(|b| b.hospital_id == hospital_id && b.is_available())
            .count();
        Ok(count as u32)
    }

    async fn count_beds_by_specialty(&self, specialty_id: SpecialtyId) -> AllocationResult<u32> {
        let beds = self.beds.read().await;
        Ok(beds.values().filter(|b| b.specialty_id == specialty_id).count() as u32)
    }
}

#[async_trait]
impl HospitalStore for InMemoryStorage {
    async fn next_hospital_id(&self) -> AllocationResult<HospitalId> {
        Ok(HospitalId(self.next_id()))
    }

    async fn insert_hospital(&self, hospital: Hospital) -> AllocationResult<()> {
        let mut hospitals = self.hospitals.write().await;
        if hospitals.contains_key(&hospital.id) {
            return Err(AllocationError::AlreadyExists(format!("hospital {}", hospital.id)));
        }
        if hospitals.values().any(|h| h.name == hospital.name) {
            return Err(AllocationError::AlreadyExists(format!(
                "hospital named '{}'",
                hospital.name
            )));
        }
        hospitals.insert(hospital.id, hospital);
        Ok(())
    }

    async fn get_hospital(&self, id: HospitalId) -> AllocationResult<Option<Hospital>> {
        let hospitals = self.hospitals.read().await;
        Ok(hospitals.get(&id).cloned())
    }

    async fn update_hospital(&self, hospital: Hospital) -> AllocationResult<()> {
        let mut hospitals = self.hospitals.write().await;
        if !hospitals.contains_key(&hospital.id) {
            return Err(AllocationError::hospital_not_found(hospital.id));
        }
        if hospitals
            .values()
            .any(|h| h.id != hospital.id && h.name == hospital.name)
        {
            return Err(AllocationError::AlreadyExists(format!(
                "hospital named '{}'",
                hospital.name
            )));
        }
        hospitals.insert(hospital.id, hospital);
        Ok(())
    }

    async fn delete_hospital(&self, id: HospitalId) -> AllocationResult<Option<Hospital>> {
        let mut hospitals = self.hospitals.write().await;
        Ok(hospitals.remove(&id))
    }

    async fn list_hospitals(&self) -> AllocationResult<Vec<Hospital>> {
        let hospitals = self.hospitals.read().await;
        Ok(sorted_by_key(&hospitals, |_| true))
    }

    async fn find_hospital_by_name(&self, name: &str) -> AllocationResult<Option<Hospital>> {
        let hospitals = self.hospitals.read().await;
        Ok(hospitals.values().find(|h| h.name == name).cloned())
    }
}

#[async_trait]
impl SpecialtyStore for InMemoryStorage {
    async fn next_specialty_id(&self) -> AllocationResult<SpecialtyId> {
        Ok(SpecialtyId(self.next_id()))
    }

    async fn insert_specialty(&self, specialty: Specialty) -> AllocationResult<()> {
        let mut specialties = self.specialties.write().await;
        if specialties
            .values()
            .any(|s| s.id == specialty.id || s.code == specialty.code)
        {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty with code '{}'",
                specialty.code
            )));
        }
        specialties.insert(specialty.id, specialty);
        Ok(())
    }

    async fn get_specialty(&self, id: SpecialtyId) -> AllocationResult<Option<Specialty>> {
        let specialties = self.specialties.read().await;
        Ok(specialties.get(&id).cloned())
    }

    async fn find_specialty_by_code(&self, code: &str) -> AllocationResult<Option<Specialty>> {
        let specialties = self.specialties.read().await;
        Ok(specialties.values().find(|s| s.code == code).cloned())
    }

    async fn list_specialties(&self) -> AllocationResult<Vec<Specialty>> {
        let specialties = self.specialties.read().await;
        Ok(sorted_by_key(&specialties, |_| true))
    }

    async fn update_specialty(&self, specialty: Specialty) -> AllocationResult<()> {
        let mut specialties = self.specialties.write().await;
        if !specialties.contains_key(&specialty.id) {
            return Err(AllocationError::specialty_not_found(specialty.id));
        }
        if specialties
            .values()
            .any(|s| s.id != specialty.id && s.code == specialty.code)
        {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty with code '{}'",
                specialty.code
            )));
        }
        specialties.insert(specialty.id, specialty);
        Ok(())
    }

    async fn delete_specialty(&self, id: SpecialtyId) -> AllocationResult<Option<Specialty>> {
        let mut specialties = self.specialties.write().await;
        Ok(specialties.remove(&id))
    }

    async fn next_specialty_group_id(&self) -> AllocationResult<SpecialtyGroupId> {
        Ok(SpecialtyGroupId(self.next_id()))
    }

    async fn insert_specialty_group(&self, group: SpecialtyGroup) -> AllocationResult<()> {
        let mut groups = self.specialty_groups.write().await;
        if groups
            .values()
            .any(|g| g.id == group.id || g.code == group.code || g.name == group.name)
        {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty group '{}'",
                group.code
            )));
        }
        groups.insert(group.id, group);
        Ok(())
    }

    async fn get_specialty_group(
        &self,
        id: SpecialtyGroupId,
    ) -> AllocationResult<Option<SpecialtyGroup>> {
        let groups = self.specialty_groups.read().await;
        Ok(groups.get(&id).cloned())
    }

    async fn update_specialty_group(&self, group: SpecialtyGroup) -> AllocationResult<()> {
        let mut groups = self.specialty_groups.write().await;
        if !groups.contains_key(&group.id) {
            return Err(AllocationError::specialty_group_not_found(group.id));
        }
        if groups
            .values()
            .any(|g| g.id != group.id && (g.code == group.code || g.name == group.name))
        {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty group '{}'",
                group.code
            )));
        }
        groups.insert(group.id, group);
        Ok(())
    }

    async fn delete_specialty_group(
        &self,
        id: SpecialtyGroupId,
    ) -> AllocationResult<Option<SpecialtyGroup>> {
        let mut groups = self.specialty_groups.write().await;
        Ok(groups.remove(&id))
    }

    async fn find_specialty_group_by_code(
        &self,
        code: &str,
    ) -> AllocationResult<Option<SpecialtyGroup>> {
        let groups = self.specialty_groups.read().await;
        Ok(groups.values().find(|g| g.code == code).cloned())
    }

    async fn list_specialty_groups(&self) -> AllocationResult<Vec<SpecialtyGroup>> {
        let groups = self.specialty_groups.read().await;
        Ok(sorted_by_key(&groups, |_| true))
    }
}

#[async_trait]
impl AllocationStore for InMemoryStorage {
    fn get_type(&self) -> &'static str {
        "InMemory"
    }

    async fn flush(&self) -> AllocationResult<()> {
        Ok(())
    }
}
