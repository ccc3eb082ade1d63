// lib/src/allocator.rs

use std::sync::Arc;

use log::{info, warn};

use models::errors::{require_text, AllocationError, AllocationResult};
use models::{normalize_specialty_code, EmergencyAllocation, HospitalSummary, SpecialtySummary};

use crate::geo::{distance_km, round_km, validate_coordinates, TravelTimeEstimator};
use crate::search::{AvailabilitySearch, SearchBound};
use crate::storage_engine::AllocationStore;

/// Turns a (position, specialty) emergency into one recommended hospital.
pub struct EmergencyAllocator {
    store: Arc<dyn AllocationStore>,
    search: Arc<dyn AvailabilitySearch>,
    travel: TravelTimeEstimator,
}

impl EmergencyAllocator {
    pub fn new(
        store: Arc<dyn AllocationStore>,
        search: Arc<dyn AvailabilitySearch>,
        travel: TravelTimeEstimator,
    ) -> Self {
        EmergencyAllocator { store, search, travel }
    }

    pub async fn allocate(
        &self,
        latitude: f64,
        longitude: f64,
        specialty_code: &str,
    ) -> AllocationResult<EmergencyAllocation> {
        let origin = validate_coordinates(latitude, longitude)?;
        let code = normalize_specialty_code(require_text("specialtyCode", specialty_code)?);
        info!(
            "[EmergencyAllocator] allocation requested for {} at [{}, {}]",
            code, latitude, longitude
        );

        let specialty = self
            .store
            .find_specialty_by_code(&code)
            .await?
            .ok_or_else(|| AllocationError::UnknownSpecialty(code.clone()))?;

        let ranked = self.search.rank(specialty.id, origin, SearchBound::Limit(1)).await?;
        let Some(best) = ranked.into_iter().next() else {
            warn!("[EmergencyAllocator] no available bed for {}", code);
            return Err(AllocationError::NoCapacityAvailable(code));
        };

        let distance = distance_km(
            latitude,
            longitude,
            best.hospital.latitude,
            best.hospital.longitude,
        );
        let estimated_time_minutes = self.travel.estimate_minutes(distance);
        info!(
            "[EmergencyAllocator] recommended {} ({:.2} km, {} min)",
            best.hospital.name, distance, estimated_time_minutes
        );

        Ok(EmergencyAllocation {
            hospital: HospitalSummary::with_available_beds(&best.hospital, best.available_beds),
            specialty: SpecialtySummary::from(&specialty),
            available_beds: best.available_beds,
            distance_km: round_km(distance),
            estimated_time_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{MockAvailabilitySearch, RankedHospital};
    use crate::storage_engine::{InMemoryStorage, SpecialtyStore};
    use chrono::Utc;
    use models::{Hospital, HospitalId, Specialty, SpecialtyId};

    async fn store_with_cardiology() -> Arc<InMemoryStorage> {
        let store = Arc::new(InMemoryStorage::new());
        store
            .insert_specialty(Specialty {
                id: SpecialtyId(10),
                code: "CARD".into(),
                name: "Cardiology".into(),
                group_code: "MEDICINE".into(),
                description: None,
                active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        store
    }

    fn allocator(store: Arc<InMemoryStorage>, search: MockAvailabilitySearch) -> EmergencyAllocator {
        EmergencyAllocator::new(store, Arc::new(search), TravelTimeEstimator::default())
    }

    #[tokio::test]
    async fn picks_the_single_ranked_hospital() {
        let store = store_with_cardiology().await;
        let mut search = MockAvailabilitySearch::new();
        search
            .expect_rank()
            .times(1)
            .returning(|specialty_id, _origin, bound| {
                assert_eq!(specialty_id, SpecialtyId(10));
                assert_eq!(bound, SearchBound::Limit(1));
                let hospital =
                    Hospital::new(HospitalId(1), "A", "Paris", 48.8566, 2.3522, Utc::now()).unwrap();
                Ok(vec![RankedHospital { hospital, available_beds: 2, distance_km: 0.75 }])
            });

        let allocation = allocator(store, search).allocate(48.85, 2.35, "card").await.unwrap();
        assert_eq!(allocation.hospital.id, HospitalId(1));
        assert_eq!(allocation.specialty.code, "CARD");
        assert_eq!(allocation.available_beds, 2);
        assert_eq!(allocation.distance_km, 0.75);
        assert_eq!(allocation.estimated_time_minutes, 1);
    }

    #[tokio::test]
    async fn empty_ranking_means_no_capacity() {
        let store = store_with_cardiology().await;
        let mut search = MockAvailabilitySearch::new();
        search.expect_rank().returning(|_, _, _| Ok(Vec::new()));

        let err = allocator(store, search).allocate(48.85, 2.35, "CARD").await.unwrap_err();
        assert!(matches!(err, AllocationError::NoCapacityAvailable(ref code) if code == "CARD"));
    }

    #[tokio::test]
    async fn unknown_specialty_never_reaches_the_search() {
        let store = store_with_cardiology().await;
        let mut search = MockAvailabilitySearch::new();
        search.expect_rank().times(0);

        let err = allocator(store, search).allocate(48.85, 2.35, "XYZ").await.unwrap_err();
        assert!(matches!(err, AllocationError::UnknownSpecialty(ref code) if code == "XYZ"));
    }

    #[tokio::test]
    async fn bad_coordinates_are_rejected_first() {
        let store = store_with_cardiology().await;
        let mut search = MockAvailabilitySearch::new();
        search.expect_rank().times(0);

        let err = allocator(store, search).allocate(91.0, 0.0, "CARD").await.unwrap_err();
        assert!(matches!(err, AllocationError::InvalidCoordinates { .. }));
    }
}
