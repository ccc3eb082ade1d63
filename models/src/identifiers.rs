// models/src/identifiers.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};

/// Declares a numeric identifier newtype. Identifiers are opaque, totally ordered
/// (ordering is used to break distance ties and to lock hospitals in a stable order)
/// and serialize as a bare, non-zero number.
macro_rules! numeric_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[serde(try_from = "u64", into = "u64")]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(value: u64) -> ValidationResult<Self> {
                if value == 0 {
                    return Err(ValidationError::InvalidIdentifier(value.to_string()));
                }
                Ok(Self(value))
            }

            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> ValidationResult<Self> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ValidationError::InvalidIdentifier(s.to_string()))?;
                Self::new(value)
            }
        }

        impl TryFrom<u64> for $name {
            type Error = ValidationError;

            fn try_from(value: u64) -> ValidationResult<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

numeric_identifier!(
    /// Identifies a single bed.
    BedId
);
numeric_identifier!(
    /// Identifies a hospital.
    HospitalId
);
numeric_identifier!(SpecialtyId);
numeric_identifier!(SpecialtyGroupId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_not_create_zero_identifier() {
        let id = BedId::new(0);
        assert_eq!(id.unwrap_err(), ValidationError::InvalidIdentifier("0".to_string()));
    }

    #[test]
    fn should_parse_identifier_from_str() {
        let id = HospitalId::from_str(" 42 ").unwrap();
        assert_eq!(id, HospitalId(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn should_reject_non_numeric_identifier() {
        assert!(SpecialtyId::from_str("card").is_err());
    }

    #[test]
    fn identifiers_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&BedId(7)).unwrap();
        assert_eq!(json, "7");
        let back: BedId = serde_json::from_str("7").unwrap();
        assert_eq!(back, BedId(7));
    }

    #[test]
    fn zero_is_rejected_when_deserializing() {
        assert!(serde_json::from_str::<HospitalId>("0").is_err());
        let payload = r#"{"hospitalId":0,"specialtyId":2,"bedNumber":"A1"}"#;
        assert!(serde_json::from_str::<crate::NewBed>(payload).is_err());
    }
}
