// lib/src/storage_engine/sled_storage.rs

use std::path::Path;

use async_trait::async_trait;
use bincode::{
    config::{self, BigEndian, Configuration, Fixint},
    serde::{decode_from_slice, encode_to_vec},
};
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Tree};

use models::errors::{AllocationError, AllocationResult};
use models::{
    Bed, BedId, BedStatus, Hospital, HospitalId, Specialty, SpecialtyGroup, SpecialtyGroupId,
    SpecialtyId,
};

use super::storage_engine::{AllocationStore, BedStore, HospitalStore, SpecialtyStore};

const BEDS_TREE: &str = "beds";
const HOSPITALS_TREE: &str = "hospitals";
const SPECIALTIES_TREE: &str = "specialties";
const SPECIALTY_GROUPS_TREE: &str = "specialty_groups";

/// Opens (or creates) the sled database under `path`.
pub fn open_sled_db(path: &Path) -> AllocationResult<Db> {
    if !path.exists() {
        info!("Creating sled data directory at {:?}", path);
        std::fs::create_dir_all(path)?;
    }
    let db = sled::Config::new().path(path).open()?;
    info!("Opened sled database at {:?}", path);
    Ok(db)
}

/// Sled-backed store. One tree per entity, keyed by the big-endian id so that
/// iteration order is id order.
pub struct SledStorage {
    db: Db,
    beds: Tree,
    hospitals: Tree,
    specialties: Tree,
    specialty_groups: Tree,
    config: Configuration<BigEndian, Fixint>,
}

fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard().with_big_endian().with_fixed_int_encoding()
}

fn key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

impl SledStorage {
    pub fn new(db: Db) -> AllocationResult<Self> {
        Ok(SledStorage {
            beds: db.open_tree(BEDS_TREE)?,
            hospitals: db.open_tree(HOSPITALS_TREE)?,
            specialties: db.open_tree(SPECIALTIES_TREE)?,
            specialty_groups: db.open_tree(SPECIALTY_GROUPS_TREE)?,
            db,
            config: bincode_config(),
        })
    }

    fn encode<T: Serialize>(&self, value: &T) -> AllocationResult<Vec<u8>> {
        Ok(encode_to_vec(value, self.config)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> AllocationResult<T> {
        let (value, _): (T, usize) = decode_from_slice(bytes, self.config)?;
        Ok(value)
    }

    /// Sled ids start at 0; identifiers must be non-zero.
    fn generate_id(&self) -> AllocationResult<u64> {
        Ok(self.db.generate_id()? + 1)
    }

    fn get<T: DeserializeOwned>(&self, tree: &Tree, id: u64) -> AllocationResult<Option<T>> {
        match tree.get(key(id))? {
            Some(bytes) => Ok(Some(self.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(
        &self,
        tree: &Tree,
        keep: impl Fn(&T) -> bool,
    ) -> AllocationResult<Vec<T>> {
        let mut out = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item?;
            let value: T = self.decode(&bytes)?;
            if keep(&value) {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// Inserts only if the key is vacant.
    fn insert_new<T: Serialize>(&self, tree: &Tree, id: u64, value: &T, what: String) -> AllocationResult<()> {
        let bytes = self.encode(value)?;
        tree.compare_and_swap(key(id), None::<&[u8]>, Some(bytes))?
            .map_err(|_| AllocationError::AlreadyExists(what))
    }

    fn remove<T: DeserializeOwned>(&self, tree: &Tree, id: u64) -> AllocationResult<Option<T>> {
        match tree.remove(key(id))? {
            Some(bytes) => Ok(Some(self.decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BedStore for SledStorage {
    async fn next_bed_id(&self) -> AllocationResult<BedId> {
        Ok(BedId(self.generate_id()?))
    }

    async fn insert_bed(&self, mut bed: Bed) -> AllocationResult<Bed> {
        bed.version = 1;
        self.insert_new(&self.beds, bed.id.value(), &bed, format!("bed {}", bed.id))?;
        Ok(bed)
    }

    async fn get_bed(&self, id: BedId) -> AllocationResult<Option<Bed>> {
        self.get(&self.beds, id.value())
    }

    async fn replace_bed(&self, mut bed: Bed, expected_version: u64) -> AllocationResult<Bed> {
        let bed_key = key(bed.id.value());
        let current_bytes = self
            .beds
            .get(bed_key)?
            .ok_or_else(|| AllocationError::bed_not_found(bed.id))?;
        let current: Bed = self.decode(&current_bytes)?;
        if current.version != expected_version {
            return Err(AllocationError::Conflict(format!(
                "bed {} is at version {}, expected {}",
                bed.id, current.version, expected_version
            )));
        }
        bed.version = expected_version + 1;
        let new_bytes = self.encode(&bed)?;
        self.beds
            .compare_and_swap(bed_key, Some(current_bytes), Some(new_bytes))?
            .map_err(|_| {
                AllocationError::Conflict(format!("bed {} changed during write", bed.id))
            })?;
        debug!("Stored bed {} at version {}", bed.id, bed.version);
        Ok(bed)
    }

    async fn delete_bed(&self, id: BedId) -> AllocationResult<Option<Bed>> {
        self.remove(&self.beds, id.value())
    }

    async fn list_beds_by_hospital(&self, hospital_id: HospitalId) -> AllocationResult<Vec<Bed>> {
        self.scan(&self.beds, |b: &Bed| b.hospital_id == hospital_id)
    }

    async fn list_beds_by_hospital_and_status(
        &self,
        hospital_id: HospitalId,
        status: BedStatus,
    ) -> AllocationResult<Vec<Bed>> {
        self.scan(&self.beds, |b: &Bed| b.hospital_id == hospital_id && b.status() == status)
    }

    async fn list_beds_by_specialty_and_status(
        &self,
        specialty_id: SpecialtyId,
        status: BedStatus,
    ) -> AllocationResult<Vec<Bed>> {
        self.scan(&self.beds, |b: &Bed| b.specialty_id == specialty_id && b.status() == status)
    }

    async fn count_available_beds(&self, hospital_id: HospitalId) -> AllocationResult<u32> {
        let beds = self.scan(&self.beds, |b: &Bed| b.hospital_id == hospital_id && b.is_available())?;
        Ok(beds.len() as u32)
    }

    async fn count_beds_by_specialty(&self, specialty_id: SpecialtyId) -> AllocationResult<u32> {
        let beds = self.scan(&self.beds, |b: &Bed| b.specialty_id == specialty_id)?;
        Ok(beds.len() as u32)
    }
}

#[async_trait]
impl HospitalStore for SledStorage {
    async fn next_hospital_id(&self) -> AllocationResult<HospitalId> {
        Ok(HospitalId(self.generate_id()?))
    }

    async fn insert_hospital(&self, hospital: Hospital) -> AllocationResult<()> {
        if self.find_hospital_by_name(&hospital.name).await?.is_some() {
            return Err(AllocationError::AlreadyExists(format!(
                "hospital named '{}'",
                hospital.name
            )));
        }
        self.insert_new(
            &self.hospitals,
            hospital.id.value(),
            &hospital,
            format!("hospital {}", hospital.id),
        )
    }

    async fn get_hospital(&self, id: HospitalId) -> AllocationResult<Option<Hospital>> {
        self.get(&self.hospitals, id.value())
    }

    async fn update_hospital(&self, hospital: Hospital) -> AllocationResult<()> {
        if !self.hospitals.contains_key(key(hospital.id.value()))? {
            return Err(AllocationError::hospital_not_found(hospital.id));
        }
        if let Some(other) = self.find_hospital_by_name(&hospital.name).await? {
            if other.id != hospital.id {
                return Err(AllocationError::AlreadyExists(format!(
                    "hospital named '{}'",
                    hospital.name
                )));
            }
        }
        let bytes = self.encode(&hospital)?;
        self.hospitals.insert(key(hospital.id.value()), bytes)?;
        Ok(())
    }

    async fn delete_hospital(&self, id: HospitalId) -> AllocationResult<Option<Hospital>> {
        self.remove(&self.hospitals, id.value())
    }

    async fn list_hospitals(&self) -> AllocationResult<Vec<Hospital>> {
        self.scan(&self.hospitals, |_: &Hospital| true)
    }

    async fn find_hospital_by_name(&self, name: &str) -> AllocationResult<Option<Hospital>> {
        let mut found = self.scan(&self.hospitals, |h: &Hospital| h.name == name)?;
        Ok(found.pop())
    }
}

#[async_trait]
impl SpecialtyStore for SledStorage {
    async fn next_specialty_id(&self) -> AllocationResult<SpecialtyId> {
        Ok(SpecialtyId(self.generate_id()?))
    }

    async fn insert_specialty(&self, specialty: Specialty) -> AllocationResult<()> {
        if self.find_specialty_by_code(&specialty.code).await?.is_some() {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty with code '{}'",
                specialty.code
            )));
        }
        self.insert_new(
            &self.specialties,
            specialty.id.value(),
            &specialty,
            format!("specialty {}", specialty.id),
        )
    }

    async fn get_specialty(&self, id: SpecialtyId) -> AllocationResult<Option<Specialty>> {
        self.get(&self.specialties, id.value())
    }

    async fn find_specialty_by_code(&self, code: &str) -> AllocationResult<Option<Specialty>> {
        let mut found = self.scan(&self.specialties, |s: &Specialty| s.code == code)?;
        Ok(found.pop())
    }

    async fn list_specialties(&self) -> AllocationResult<Vec<Specialty>> {
        self.scan(&self.specialties, |_: &Specialty| true)
    }

    async fn update_specialty(&self, specialty: Specialty) -> AllocationResult<()> {
        if !self.specialties.contains_key(key(specialty.id.value()))? {
            return Err(AllocationError::specialty_not_found(specialty.id));
        }
        if let Some(other) = self.find_specialty_by_code(&specialty.code).await? {
            if other.id != specialty.id {
                return Err(AllocationError::AlreadyExists(format!(
                    "specialty with code '{}'",
                    specialty.code
                )));
            }
        }
        let bytes = self.encode(&specialty)?;
        self.specialties.insert(key(specialty.id.value()), bytes)?;
        Ok(())
    }

    async fn delete_specialty(&self, id: SpecialtyId) -> AllocationResult<Option<Specialty>> {
        self.remove(&self.specialties, id.value())
    }

    async fn next_specialty_group_id(&self) -> AllocationResult<SpecialtyGroupId> {
        Ok(SpecialtyGroupId(self.generate_id()?))
    }

    async fn insert_specialty_group(&self, group: SpecialtyGroup) -> AllocationResult<()> {
        let clash = self.scan(&self.specialty_groups, |g: &SpecialtyGroup| {
            g.code == group.code || g.name == group.name
        })?;
        if !clash.is_empty() {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty group '{}'",
                group.code
            )));
        }
        self.insert_new(
            &self.specialty_groups,
            group.id.value(),
            &group,
            format!("specialty group {}", group.id),
        )
    }

    async fn get_specialty_group(
        &self,
        id: SpecialtyGroupId,
    ) -> AllocationResult<Option<SpecialtyGroup>> {
        self.get(&self.specialty_groups, id.value())
    }

    async fn update_specialty_group(&self, group: SpecialtyGroup) -> AllocationResult<()> {
        if !self.specialty_groups.contains_key(key(group.id.value()))? {
            return Err(AllocationError::specialty_group_not_found(group.id));
        }
        let clash = self.scan(&self.specialty_groups, |g: &SpecialtyGroup| {
            g.id != group.id && (g.code == group.code || g.name == group.name)
        })?;
        if !clash.is_empty() {
            return Err(AllocationError::AlreadyExists(format!(
                "specialty group '{}'",
                group.code
            )));
        }
        let bytes = self.encode(&group)?;
        self.specialty_groups.insert(key(group.id.value()), bytes)?;
        Ok(())
    }

    async fn delete_specialty_group(
        &self,
        id: SpecialtyGroupId,
    ) -> AllocationResult<Option<SpecialtyGroup>> {
        self.remove(&self.specialty_groups, id.value())
    }

    async fn find_specialty_group_by_code(
        &self,
        code: &str,
    ) -> AllocationResult<Option<SpecialtyGroup>> {
        let mut found = self.scan(&self.specialty_groups, |g: &SpecialtyGroup| g.code == code)?;
        Ok(found.pop())
    }

    async fn list_specialty_groups(&self) -> AllocationResult<Vec<SpecialtyGroup>> {
        self.scan(&self.specialty_groups, |_: &SpecialtyGroup| true)
    }
}

#[async_trait]
impl AllocationStore for SledStorage {
    fn get_type(&self) -> &'static str {
        "Sled"
    }

    async fn flush(&self) -> AllocationResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}
