// models/src/medical/specialty.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{SpecialtyGroupId, SpecialtyId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub id: SpecialtyId,
    pub code: String,
    pub name: String,
    pub group_code: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyGroup {
    pub id: SpecialtyGroupId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical form of a user-supplied specialty code.
pub fn normalize_specialty_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Derives a stable code from a display name: accents folded, upper-cased,
/// runs of anything that is not `A-Z0-9` collapsed into a single `_`, no leading
/// or trailing `_`.
pub fn specialty_code_from_name(name: &str) -> String {
    let mut code = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars().map(fold_accent).flat_map(char::to_uppercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !code.is_empty() {
                code.push('_');
            }
            pending_sep = false;
            code.push(ch);
        } else {
            pending_sep = true;
        }
    }
    code
}

fn fold_accent(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_specialty_code, specialty_code_from_name};

    #[test]
    fn normalizes_user_codes() {
        assert_eq!(normalize_specialty_code(" card "), "CARD");
    }

    #[test]
    fn derives_codes_from_names() {
        assert_eq!(specialty_code_from_name("Accident and emergency"), "ACCIDENT_AND_EMERGENCY");
        assert_eq!(specialty_code_from_name("  Ear, nose & throat  "), "EAR_NOSE_THROAT");
        assert_eq!(specialty_code_from_name("Médecine générale"), "MEDECINE_GENERALE");
    }
}
