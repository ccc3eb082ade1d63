// models/src/summaries.rs

//! Read-side projections returned by the engine and serialized by the REST layer.

use serde::{Deserialize, Serialize};

use crate::identifiers::{BedId, HospitalId, SpecialtyId};
use crate::medical::{Bed, BedStatus, Hospital, Specialty};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSummary {
    pub id: HospitalId,
    pub name: String,
    pub city: String,
    /// Depending on the query this is either the hospital-wide cached count or
    /// the count for one specialty.
    pub available_beds: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl HospitalSummary {
    pub fn with_available_beds(hospital: &Hospital, available_beds: u32) -> Self {
        HospitalSummary {
            id: hospital.id,
            name: hospital.name.clone(),
            city: hospital.city.clone(),
            available_beds,
            latitude: hospital.latitude,
            longitude: hospital.longitude,
        }
    }
}

impl From<&Hospital> for HospitalSummary {
    fn from(hospital: &Hospital) -> Self {
        HospitalSummary::with_available_beds(hospital, hospital.available_beds)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedAvailability {
    pub id: BedId,
    pub bed_number: String,
    pub status: BedStatus,
    pub specialty_id: SpecialtyId,
    pub hospital_id: HospitalId,
}

impl From<&Bed> for BedAvailability {
    fn from(bed: &Bed) -> Self {
        BedAvailability {
            id: bed.id,
            bed_number: bed.bed_number.clone(),
            status: bed.status(),
            specialty_id: bed.specialty_id,
            hospital_id: bed.hospital_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtySummary {
    pub id: SpecialtyId,
    pub code: String,
    pub name: String,
}

impl From<&Specialty> for SpecialtySummary {
    fn from(specialty: &Specialty) -> Self {
        SpecialtySummary {
            id: specialty.id,
            code: specialty.code.clone(),
            name: specialty.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub specialty_code: String,
}

/// The single recommendation produced for an emergency request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAllocation {
    pub hospital: HospitalSummary,
    pub specialty: SpecialtySummary,
    /// Available beds of the requested specialty at the chosen hospital.
    pub available_beds: u32,
    /// Great-circle distance, rounded to two decimals.
    pub distance_km: f64,
    pub estimated_time_minutes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn summaries_use_camel_case_on_the_wire() {
        let hospital =
            Hospital::new(HospitalId(3), "St Thomas' Hospital", "London", 51.498, -0.117, Utc::now())
                .unwrap();
        let json = serde_json::to_value(HospitalSummary::with_available_beds(&hospital, 2)).unwrap();
        assert_eq!(json["availableBeds"], 2);
        assert_eq!(json["id"], 3);
    }

    #[test]
    fn bed_availability_carries_status() {
        let bed = Bed::new(BedId(9), HospitalId(1), SpecialtyId(2), "009", Utc::now());
        let view = BedAvailability::from(&bed);
        assert_eq!(view.status, BedStatus::Available);
        assert_eq!(view.bed_number, "009");
    }
}
