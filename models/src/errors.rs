// models/src/errors.rs

use std::io;

pub use thiserror::Error;

use crate::medical::BedStatus;

/// Errors produced by the allocation engine and its storage engines.
///
/// The first group of variants is the domain taxonomy that callers are expected to
/// inspect and turn into a response. The second group covers infrastructure
/// failures (store unavailable, corrupt record, unreadable configuration) which the core
/// never recovers from locally; see [`AllocationError::is_infrastructure`].
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("invalid bed status transition: {from} -> {to}")]
    InvalidTransition { from: BedStatus, to: BedStatus },

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("unknown specialty code: {0}")]
    UnknownSpecialty(String),

    #[error("no hospital has an available bed for specialty {0}")]
    NoCapacityAvailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("concurrent modification: {0}")]
    Conflict(String),

    // --- infrastructure ---
    #[error("storage error: {0}")]
    StorageError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AllocationResult<T> = Result<T, AllocationError>;

impl AllocationError {
    pub fn bed_not_found(id: impl ToString) -> Self {
        AllocationError::NotFound { entity: "bed", key: id.to_string() }
    }

    pub fn hospital_not_found(id: impl ToString) -> Self {
        AllocationError::NotFound { entity: "hospital", key: id.to_string() }
    }

    pub fn specialty_not_found(id: impl ToString) -> Self {
        AllocationError::NotFound { entity: "specialty", key: id.to_string() }
    }

    pub fn specialty_group_not_found(code: impl ToString) -> Self {
        AllocationError::NotFound { entity: "specialty group", key: code.to_string() }
    }

    /// True for failures of the surrounding store or runtime rather than of the request.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AllocationError::StorageError(_)
                | AllocationError::SerializationError(_)
                | AllocationError::ConfigurationError(_)
                | AllocationError::Io(_)
        )
    }
}

impl From<ValidationError> for AllocationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::CoordinatesOutOfRange { latitude, longitude } => {
                AllocationError::InvalidCoordinates { latitude, longitude }
            }
            other => AllocationError::InvalidInput(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AllocationError {
    fn from(err: serde_json::Error) -> Self {
        AllocationError::SerializationError(format!("JSON processing error: {}", err))
    }
}

#[cfg(feature = "sled-errors")]
impl From<sled::Error> for AllocationError {
    fn from(err: sled::Error) -> Self {
        AllocationError::StorageError(err.to_string())
    }
}

#[cfg(feature = "bincode-errors")]
impl From<bincode::error::EncodeError> for AllocationError {
    fn from(err: bincode::error::EncodeError) -> Self {
        AllocationError::SerializationError(format!("bincode encode error: {}", err))
    }
}

#[cfg(feature = "bincode-errors")]
impl From<bincode::error::DecodeError> for AllocationError {
    fn from(err: bincode::error::DecodeError) -> Self {
        AllocationError::SerializationError(format!("bincode decode error: {}", err))
    }
}

/// Input-level validation failures, raised before anything touches a store.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("coordinates out of range: latitude {latitude} must be in [-90, 90], longitude {longitude} in [-180, 180]")]
    CoordinatesOutOfRange { latitude: f64, longitude: f64 },
    #[error("field '{0}' must not be blank")]
    BlankField(&'static str),
    #[error("limit must be greater than zero")]
    NonPositiveLimit,
    #[error("radius must be a positive number of kilometres, got {0}")]
    InvalidRadius(f64),
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    #[error("unknown bed status '{0}'")]
    UnknownBedStatus(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejects empty or whitespace-only values.
pub fn require_text<'a>(field: &'static str, value: &'a str) -> ValidationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_validation_maps_to_invalid_coordinates() {
        let err: AllocationError =
            ValidationError::CoordinatesOutOfRange { latitude: 91.0, longitude: 0.0 }.into();
        assert!(matches!(err, AllocationError::InvalidCoordinates { latitude, .. } if latitude == 91.0));
    }

    #[test]
    fn other_validation_errors_map_to_invalid_input() {
        let err: AllocationError = ValidationError::BlankField("city").into();
        assert!(matches!(err, AllocationError::InvalidInput(ref msg) if msg.contains("city")));
    }

    #[test]
    fn domain_errors_are_not_infrastructure() {
        let invalid = AllocationError::InvalidTransition {
            from: BedStatus::Occupied,
            to: BedStatus::Reserved,
        };
        assert!(!invalid.is_infrastructure());
        assert!(!AllocationError::NoCapacityAvailable("CARD".into()).is_infrastructure());
        assert!(AllocationError::StorageError("down".into()).is_infrastructure());
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = AllocationError::InvalidTransition {
            from: BedStatus::Occupied,
            to: BedStatus::Reserved,
        };
        assert_eq!(err.to_string(), "invalid bed status transition: OCCUPIED -> RESERVED");
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("code", "  CARD "), Ok("CARD"));
        assert_eq!(require_text("code", "   "), Err(ValidationError::BlankField("code")));
    }
}
