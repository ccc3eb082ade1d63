// lib/src/search.rs

//! Ranks active hospitals that have at least one available bed of a
//! specialty by great-circle distance from a query point.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use mockall::automock;

use models::errors::{AllocationResult, ValidationError};
use models::{BedStatus, GeoPoint, Hospital, HospitalId, SpecialtyId};

use crate::geo::distance_between;
use crate::storage_engine::AllocationStore;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// How far a search may reach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchBound {
    /// At most this many hospitals.
    Limit(usize),
    /// Hospitals within `max_km`, optionally capped.
    Radius { max_km: f64, limit: Option<usize> },
}

impl Default for SearchBound {
    fn default() -> Self {
        SearchBound::Limit(DEFAULT_SEARCH_LIMIT)
    }
}

impl SearchBound {
    pub fn validate(&self) -> AllocationResult<()> {
        match *self {
            SearchBound::Limit(0) | SearchBound::Radius { limit: Some(0), .. } => {
                Err(ValidationError::NonPositiveLimit.into())
            }
            SearchBound::Radius { max_km, .. } if !(max_km.is_finite() && max_km > 0.0) => {
                Err(ValidationError::InvalidRadius(max_km).into())
            }
            _ => Ok(()),
        }
    }

    fn limit(&self) -> Option<usize> {
        match *self {
            SearchBound::Limit(limit) => Some(limit),
            SearchBound::Radius { limit, .. } => limit,
        }
    }

    fn max_km(&self) -> Option<f64> {
        match *self {
            SearchBound::Limit(_) => None,
            SearchBound::Radius { max_km, .. } => Some(max_km),
        }
    }
}

/// A candidate hospital with its specialty-specific availability.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedHospital {
    pub hospital: Hospital,
    /// Available beds of the searched specialty, counted from bed state.
    pub available_beds: u32,
    pub distance_km: f64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AvailabilitySearch: Send + Sync {
    async fn rank(
        &self,
        specialty_id: SpecialtyId,
        origin: GeoPoint,
        bound: SearchBound,
    ) -> AllocationResult<Vec<RankedHospital>>;
}

/// Drops candidates beyond the radius, sorts nearest first (ties by hospital
/// id) and truncates to the limit.
pub fn rank_candidates(mut candidates: Vec<RankedHospital>, bound: SearchBound) -> Vec<RankedHospital> {
    if let Some(max_km) = bound.max_km() {
        candidates.retain(|c| c.distance_km <= max_km);
    }
    candidates.sort_by(|a, b| match a.distance_km.total_cmp(&b.distance_km) {
        Ordering::Equal => a.hospital.id.cmp(&b.hospital.id),
        other => other,
    });
    if let Some(limit) = bound.limit() {
        candidates.truncate(limit);
    }
    candidates
}

/// Store-backed search computed in application code.
pub struct GeoAvailabilitySearch {
    store: Arc<dyn AllocationStore>,
}

impl GeoAvailabilitySearch {
    pub fn new(store: Arc<dyn AllocationStore>) -> Self {
        GeoAvailabilitySearch { store }
    }
}

#[async_trait]
impl AvailabilitySearch for GeoAvailabilitySearch {
    async fn rank(
        &self,
        specialty_id: SpecialtyId,
        origin: GeoPoint,
        bound: SearchBound,
    ) -> AllocationResult<Vec<RankedHospital>> {
        bound.validate()?;
        let beds = self
            .store
            .list_beds_by_specialty_and_status(specialty_id, BedStatus::Available)
            .await?;

        let mut per_hospital: BTreeMap<HospitalId, u32> = BTreeMap::new();
        for bed in beds.iter().filter(|b| b.is_available()) {
            *per_hospital.entry(bed.hospital_id).or_default() += 1;
        }

        let mut candidates = Vec::with_capacity(per_hospital.len());
        for (hospital_id, available_beds) in per_hospital {
            let Some(hospital) = self.store.get_hospital(hospital_id).await? else {
                continue;
            };
            if !hospital.active {
                continue;
            }
            let distance_km = distance_between(&origin, &hospital.point());
            candidates.push(RankedHospital { hospital, available_beds, distance_km });
        }
        debug!(
            "[GeoAvailabilitySearch] {} candidate hospitals for specialty {}",
            candidates.len(),
            specialty_id
        );
        Ok(rank_candidates(candidates, bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::{BedStore, HospitalStore, InMemoryStorage};
    use chrono::Utc;
    use models::{Bed, BedId};

    fn candidate(id: u64, distance_km: f64) -> RankedHospital {
        RankedHospital {
            hospital: Hospital::new(HospitalId(id), &format!("H{}", id), "X", 0.0, 0.0, Utc::now())
                .unwrap(),
            available_beds: 1,
            distance_km,
        }
    }

    fn ids(ranked: &[RankedHospital]) -> Vec<u64> {
        ranked.iter().map(|r| r.hospital.id.value()).collect()
    }

    #[test]
    fn sorts_by_distance_then_id() {
        let ranked = rank_candidates(
            vec![candidate(3, 5.0), candidate(2, 1.0), candidate(1, 5.0)],
            SearchBound::Limit(10),
        );
        assert_eq!(ids(&ranked), vec![2, 1, 3]);
    }

    #[test]
    fn radius_and_limit_are_applied() {
        let ranked = rank_candidates(
            vec![candidate(1, 1.0), candidate(2, 20.0), candidate(3, 2.0), candidate(4, 3.0)],
            SearchBound::Radius { max_km: 10.0, limit: Some(2) },
        );
        assert_eq!(ids(&ranked), vec![1, 3]);
    }

    #[test]
    fn zero_limit_and_bad_radius_are_rejected() {
        assert!(SearchBound::Limit(0).validate().is_err());
        assert!(SearchBound::Radius { max_km: -1.0, limit: None }.validate().is_err());
        assert!(SearchBound::Radius { max_km: f64::NAN, limit: None }.validate().is_err());
        assert!(SearchBound::default().validate().is_ok());
        assert!(matches!(
            SearchBound::Radius { max_km: 5.0, limit: Some(0) }.validate(),
            Err(models::AllocationError::InvalidInput(msg)) if msg == "limit must be greater than zero"
        ));
    }

    async fn seed(store: &InMemoryStorage) {
        let a = Hospital::new(HospitalId(1), "A", "Paris", 48.8566, 2.3522, Utc::now()).unwrap();
        let b = Hospital::new(HospitalId(2), "B", "Lyon", 45.7640, 4.8357, Utc::now()).unwrap();
        let mut c = Hospital::new(HospitalId(3), "C", "Paris", 48.86, 2.35, Utc::now()).unwrap();
        c.active = false;
        for h in [a, b, c] {
            store.insert_hospital(h).await.unwrap();
        }
        let card = SpecialtyId(10);
        let beds = [
            (1, 1, card, BedStatus::Available),
            (2, 1, card, BedStatus::Available),
            (3, 1, card, BedStatus::Occupied),
            (4, 2, card, BedStatus::Available),
            (5, 3, card, BedStatus::Available),
            (6, 2, SpecialtyId(11), BedStatus::Available),
        ];
        for (id, hospital, specialty, status) in beds {
            let mut bed = Bed::new(BedId(id), HospitalId(hospital), specialty, format!("{:03}", id), Utc::now());
            bed.record_status(status, Utc::now());
            store.insert_bed(bed).await.unwrap();
        }
    }

    #[tokio::test]
    async fn ranks_active_hospitals_with_specialty_counts() {
        let store = Arc::new(InMemoryStorage::new());
        seed(&store).await;
        let search = GeoAvailabilitySearch::new(store);
        let origin = GeoPoint::new(48.85, 2.35).unwrap();

        let ranked = search.rank(SpecialtyId(10), origin, SearchBound::Limit(5)).await.unwrap();
        assert_eq!(ids(&ranked), vec![1, 2]);
        assert_eq!(ranked[0].available_beds, 2);
        assert_eq!(ranked[1].available_beds, 1);
        assert!(ranked[0].distance_km <= ranked[1].distance_km);
    }

    #[tokio::test]
    async fn radius_excludes_far_hospitals() {
        let store = Arc::new(InMemoryStorage::new());
        seed(&store).await;
        let search = GeoAvailabilitySearch::new(store);
        let origin = GeoPoint::new(48.85, 2.35).unwrap();

        let ranked = search
            .rank(SpecialtyId(10), origin, SearchBound::Radius { max_km: 50.0, limit: None })
            .await
            .unwrap();
        assert_eq!(ids(&ranked), vec![1]);
    }

    #[tokio::test]
    async fn no_candidates_is_an_empty_list() {
        let store = Arc::new(InMemoryStorage::new());
        seed(&store).await;
        let search = GeoAvailabilitySearch::new(store);
        let origin = GeoPoint::new(48.85, 2.35).unwrap();
        let ranked = search.rank(SpecialtyId(99), origin, SearchBound::default()).await.unwrap();
        assert!(ranked.is_empty());
    }
}
