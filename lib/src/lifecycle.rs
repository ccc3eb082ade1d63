// lib/src/lifecycle.rs

//! Bed status state machine.
//!
//! | From        | Allowed to                       |
//! |-------------|----------------------------------|
//! | AVAILABLE   | RESERVED, OCCUPIED, MAINTENANCE  |
//! | RESERVED    | OCCUPIED, AVAILABLE              |
//! | OCCUPIED    | AVAILABLE                        |
//! | MAINTENANCE | AVAILABLE                        |
//!
//! A transition to the current status is a successful no-op, except for
//! [`reserve`], which is exclusive.

use chrono::{DateTime, Utc};

use models::errors::{AllocationError, AllocationResult};
use models::{Bed, BedStatus};

/// What applying a transition did to the bed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Target equals the current status. Nothing to write.
    Unchanged,
    Changed { from: BedStatus, to: BedStatus },
}

impl TransitionOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, TransitionOutcome::Changed { .. })
    }
}

pub fn allowed_targets(from: BedStatus) -> &'static [BedStatus] {
    match from {
        BedStatus::Available => &[BedStatus::Reserved, BedStatus::Occupied, BedStatus::Maintenance],
        BedStatus::Reserved => &[BedStatus::Occupied, BedStatus::Available],
        BedStatus::Occupied => &[BedStatus::Available],
        BedStatus::Maintenance => &[BedStatus::Available],
    }
}

pub fn is_allowed(from: BedStatus, to: BedStatus) -> bool {
    from == to || allowed_targets(from).contains(&to)
}

pub fn check_transition(from: BedStatus, to: BedStatus) -> AllocationResult<TransitionOutcome> {
    if from == to {
        return Ok(TransitionOutcome::Unchanged);
    }
    if allowed_targets(from).contains(&to) {
        Ok(TransitionOutcome::Changed { from, to })
    } else {
        Err(AllocationError::InvalidTransition { from, to })
    }
}

/// Validates and applies `target` to `bed` in place. On error the bed is untouched.
pub fn transition(
    bed: &mut Bed,
    target: BedStatus,
    now: DateTime<Utc>,
) -> AllocationResult<TransitionOutcome> {
    let outcome = check_transition(bed.status(), target)?;
    if outcome.is_changed() {
        bed.record_status(target, now);
    }
    Ok(outcome)
}

/// Moves an AVAILABLE bed to RESERVED. A bed that is already RESERVED is
/// rejected so that only one caller can hold a given reservation.
pub fn reserve(bed: &mut Bed, now: DateTime<Utc>) -> AllocationResult<TransitionOutcome> {
    if bed.status() == BedStatus::Reserved {
        return Err(AllocationError::InvalidTransition {
            from: BedStatus::Reserved,
            to: BedStatus::Reserved,
        });
    }
    transition(bed, BedStatus::Reserved, now)
}

/// Returns the bed to AVAILABLE. Idempotent.
pub fn release(bed: &mut Bed, now: DateTime<Utc>) -> AllocationResult<TransitionOutcome> {
    transition(bed, BedStatus::Available, now)
}
