// models/src/commands.rs

//! Write-side payloads accepted by the services.

use serde::{Deserialize, Serialize};

use crate::identifiers::{HospitalId, SpecialtyId};
use crate::medical::BedStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBed {
    pub hospital_id: HospitalId,
    pub specialty_id: SpecialtyId,
    pub bed_number: String,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub floor: Option<i32>,
    /// Initial status, AVAILABLE when omitted.
    #[serde(default)]
    pub status: Option<BedStatus>,
}

/// Partial bed update. A status change goes through the lifecycle rules; a new
/// `hospital_id` moves the bed and recounts both hospitals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BedUpdate {
    pub bed_number: Option<String>,
    pub room_number: Option<String>,
    pub floor: Option<i32>,
    pub status: Option<BedStatus>,
    pub hospital_id: Option<HospitalId>,
    pub specialty_id: Option<SpecialtyId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedStatusChange {
    pub status: BedStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHospital {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub total_beds: Option<u32>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub specialty_ids: Vec<SpecialtyId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HospitalUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_beds: Option<u32>,
    pub active: Option<bool>,
    /// Replaces the whole specialty set when present.
    pub specialty_ids: Option<Vec<SpecialtyId>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpecialty {
    pub code: String,
    pub name: String,
    pub group_code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpecialtyGroup {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial specialty update. A new `group_code` must name an existing group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtyUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub group_code: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtyGroupUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}
