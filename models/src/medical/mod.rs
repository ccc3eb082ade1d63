// models/src/medical/mod.rs

pub mod bed;
pub mod hospital;
pub mod specialty;

pub use bed::{Bed, BedStatus};
pub use hospital::Hospital;
pub use specialty::{normalize_specialty_code, specialty_code_from_name, Specialty, SpecialtyGroup};
