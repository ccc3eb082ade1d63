// lib/src/aggregate.rs

//! Per-hospital count of available beds. Always a full recount.

use chrono::Utc;
use log::debug;

use models::errors::{AllocationError, AllocationResult};
use models::{Bed, Hospital, HospitalId};

use crate::storage_engine::AllocationStore;

pub fn count_available(beds: &[Bed]) -> u32 {
    beds.iter().filter(|b| b.is_available()).count() as u32
}

/// Recounts `beds` (only those owned by `hospital`) into `hospital.available_beds`.
pub fn recompute_for_hospital(hospital: &mut Hospital, beds: &[Bed]) -> u32 {
    let count = beds
        .iter()
        .filter(|b| b.hospital_id == hospital.id && b.is_available())
        .count() as u32;
    hospital.available_beds = count;
    count
}

/// Store-backed recount. Callers serialize this with bed mutations of the same
/// hospital, otherwise a stale count could overwrite a fresh one.
pub async fn recompute_in_store(
    store: &dyn AllocationStore,
    hospital_id: HospitalId,
) -> AllocationResult<u32> {
    let mut hospital = store
        .get_hospital(hospital_id)
        .await?
        .ok_or_else(|| AllocationError::hospital_not_found(hospital_id))?;
    let count = store.count_available_beds(hospital_id).await?;
    if hospital.available_beds != count {
        hospital.available_beds = count;
        hospital.updated_at = Utc::now();
        store.update_hospital(hospital).await?;
    }
    debug!("[AvailabilityAggregate] hospital {} has {} available beds", hospital_id, count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::{BedStore, HospitalStore, InMemoryStorage};
    use models::{BedId, BedStatus, SpecialtyId};

    fn bed(id: u64, hospital: u64, status: BedStatus) -> Bed {
        let mut b = Bed::new(BedId(id), HospitalId(hospital), SpecialtyId(1), format!("{:03}", id), Utc::now());
        b.record_status(status, Utc::now());
        b
    }

    #[test]
    fn counts_only_owned_available_beds() {
        let mut hospital =
            Hospital::new(HospitalId(1), "A", "Paris", 48.8566, 2.3522, Utc::now()).unwrap();
        let beds = vec![
            bed(1, 1, BedStatus::Available),
            bed(2, 1, BedStatus::Occupied),
            bed(3, 1, BedStatus::Available),
            bed(4, 2, BedStatus::Available),
        ];
        assert_eq!(recompute_for_hospital(&mut hospital, &beds), 2);
        assert_eq!(hospital.available_beds, 2);
        assert_eq!(count_available(&beds), 3);
    }

    #[tokio::test]
    async fn store_recount_overwrites_a_stale_cache() {
        let store = InMemoryStorage::new();
        let mut hospital =
            Hospital::new(HospitalId(1), "A", "Paris", 48.8566, 2.3522, Utc::now()).unwrap();
        hospital.available_beds = 17;
        store.insert_hospital(hospital).await.unwrap();
        store.insert_bed(bed(1, 1, BedStatus::Available)).await.unwrap();
        store.insert_bed(bed(2, 1, BedStatus::Maintenance)).await.unwrap();

        assert_eq!(recompute_in_store(&store, HospitalId(1)).await.unwrap(), 1);
        let stored = store.get_hospital(HospitalId(1)).await.unwrap().unwrap();
        assert_eq!(stored.available_beds, 1);
    }

    #[tokio::test]
    async fn recount_of_unknown_hospital_is_not_found() {
        let store = InMemoryStorage::new();
        let err = recompute_in_store(&store, HospitalId(5)).await.unwrap_err();
        assert!(matches!(err, AllocationError::NotFound { entity: "hospital", .. }));
    }
}
