// models/src/medical/hospital.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{require_text, ValidationResult};
use crate::identifiers::{HospitalId, SpecialtyId};
use crate::location::GeoPoint;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub active: bool,
    /// Declared capacity. Not recounted from the bed set.
    pub total_beds: u32,
    /// Cached number of owned beds whose availability flag is set.
    pub available_beds: u32,
    pub specialties: BTreeSet<SpecialtyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hospital {
    pub fn new(
        id: HospitalId,
        name: &str,
        city: &str,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        let name = require_text("name", name)?;
        let city = require_text("city", city)?;
        let point = GeoPoint::new(latitude, longitude)?;
        Ok(Hospital {
            id,
            name: name.to_string(),
            address: None,
            city: city.to_string(),
            postal_code: None,
            phone_number: None,
            latitude: point.latitude,
            longitude: point.longitude,
            active: true,
            total_beds: 0,
            available_beds: 0,
            specialties: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint { latitude: self.latitude, longitude: self.longitude }
    }

    pub fn supports(&self, specialty_id: SpecialtyId) -> bool {
        self.specialties.contains(&specialty_id)
    }
}
