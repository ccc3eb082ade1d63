// models/src/medical/bed.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::identifiers::{BedId, HospitalId, SpecialtyId};

/// Operational state of a bed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BedStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

impl BedStatus {
    pub const ALL: [BedStatus; 4] = [
        BedStatus::Available,
        BedStatus::Occupied,
        BedStatus::Maintenance,
        BedStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BedStatus::Available => "AVAILABLE",
            BedStatus::Occupied => "OCCUPIED",
            BedStatus::Maintenance => "MAINTENANCE",
            BedStatus::Reserved => "RESERVED",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BedStatus::Available)
    }
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BedStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(BedStatus::Available),
            "OCCUPIED" => Ok(BedStatus::Occupied),
            "MAINTENANCE" => Ok(BedStatus::Maintenance),
            "RESERVED" => Ok(BedStatus::Reserved),
            _ => Err(ValidationError::UnknownBedStatus(s.to_string())),
        }
    }
}

/// A single bed owned by one hospital and tagged with one specialty.
///
/// `status`, `available` and `last_occupied_at` are only changed through
/// [`Bed::record_status`], which keeps the availability flag equal to
/// `status == AVAILABLE`. Whether a given change is *allowed* is decided by the
/// lifecycle rules in the engine, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub id: BedId,
    pub hospital_id: HospitalId,
    pub specialty_id: SpecialtyId,
    pub bed_number: String,
    pub room_number: Option<String>,
    pub floor: Option<i32>,
    status: BedStatus,
    available: bool,
    last_occupied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Incremented by the store on every successful write.
    pub version: u64,
}

impl Bed {
    pub fn new(
        id: BedId,
        hospital_id: HospitalId,
        specialty_id: SpecialtyId,
        bed_number: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Bed {
            id,
            hospital_id,
            specialty_id,
            bed_number: bed_number.into(),
            room_number: None,
            floor: None,
            status: BedStatus::Available,
            available: true,
            last_occupied_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn with_location(mut self, room_number: Option<String>, floor: Option<i32>) -> Self {
        self.room_number = room_number;
        self.floor = floor;
        self
    }

    pub fn status(&self) -> BedStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn last_occupied_at(&self) -> Option<DateTime<Utc>> {
        self.last_occupied_at
    }

    /// Applies `status` and re-derives the availability flag.
    /// Entering OCCUPIED from another state stamps `last_occupied_at`.
    pub fn record_status(&mut self, status: BedStatus, now: DateTime<Utc>) {
        if status == BedStatus::Occupied && self.status != BedStatus::Occupied {
            self.last_occupied_at = Some(now);
        }
        self.status = status;
        self.available = status.is_available();
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bed() -> Bed {
        Bed::new(BedId(1), HospitalId(1), SpecialtyId(1), "001", Utc::now())
    }

    #[test]
    fn new_bed_is_available() {
        let b = bed();
        assert_eq!(b.status(), BedStatus::Available);
        assert!(b.is_available());
        assert!(b.last_occupied_at().is_none());
    }

    #[test]
    fn availability_flag_follows_status() {
        let mut b = bed();
        for status in BedStatus::ALL {
            b.record_status(status, Utc::now());
            assert_eq!(b.is_available(), status == BedStatus::Available);
        }
    }

    #[test]
    fn entering_occupied_stamps_once() {
        let mut b = bed();
        let first = Utc::now();
        b.record_status(BedStatus::Occupied, first);
        assert_eq!(b.last_occupied_at(), Some(first));

        b.record_status(BedStatus::Occupied, first + Duration::minutes(5));
        assert_eq!(b.last_occupied_at(), Some(first));

        b.record_status(BedStatus::Available, first + Duration::minutes(10));
        assert_eq!(b.last_occupied_at(), Some(first));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("reserved".parse::<BedStatus>().unwrap(), BedStatus::Reserved);
        assert!("broken".parse::<BedStatus>().is_err());
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&BedStatus::Maintenance).unwrap(), "\"MAINTENANCE\"");
    }
}
