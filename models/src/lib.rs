// models/src/lib.rs

//! Domain types shared by the allocation engine, the REST layer and the CLI.

pub mod commands;
pub mod errors;
pub mod identifiers;
pub mod location;
pub mod medical;
pub mod summaries;

pub use commands::{
    BedStatusChange, BedUpdate, HospitalUpdate, NewBed, NewHospital, NewSpecialty,
    NewSpecialtyGroup, SpecialtyGroupUpdate, SpecialtyUpdate,
};
pub use errors::{AllocationError, AllocationResult, ValidationError, ValidationResult};
pub use identifiers::{BedId, HospitalId, SpecialtyGroupId, SpecialtyId};
pub use location::GeoPoint;
pub use medical::{
    normalize_specialty_code, specialty_code_from_name, Bed, BedStatus, Hospital, Specialty,
    SpecialtyGroup,
};
pub use summaries::{
    BedAvailability, EmergencyAllocation, EmergencyRequest, HospitalSummary, SpecialtySummary,
};
