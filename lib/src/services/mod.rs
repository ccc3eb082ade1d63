// lib/src/services/mod.rs

pub mod bed_service;
pub mod hospital_service;
pub mod specialty_service;

pub use bed_service::BedService;
pub use hospital_service::HospitalService;
pub use specialty_service::SpecialtyService;
