// pawhaven-core/src/runtime/status.rs
// ============================================================================
// Module: PawHaven Status Synchronizer Rules
// Description: Pet availability effects of application status changes.
// Purpose: Keep an application's status and its pet's availability consistent.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Any application status can move to any other. Only moves into or out of
//! completed touch the pet. Stores call [`pet_status_effect`] inside the same
//! atomic write that updates the application.
//!
//! A pet can still be marked adopted directly from the staff pet screen; that
//! path does not consult applications.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ApplicationStatus;
use crate::core::PetStatus;

// ============================================================================
// SECTION: Transition Rules
// ============================================================================

/// Returns the status the linked pet must take when an application moves
/// from `previous` to `next`, or `None` when the pet is unaffected.
#[must_use]
pub const fn pet_status_effect(
    previous: ApplicationStatus,
    next: ApplicationStatus,
) -> Option<PetStatus> {
    match (previous, next) {
        (_, ApplicationStatus::Completed) => Some(PetStatus::Adopted),
        (ApplicationStatus::Completed, _) => Some(PetStatus::Available),
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_adopts_pet_from_any_status() {
        for previous in ApplicationStatus::ALL {
            assert_eq!(
                pet_status_effect(previous, ApplicationStatus::Completed),
                Some(PetStatus::Adopted)
            );
        }
    }

    #[test]
    fn leaving_completed_releases_pet() {
        for next in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(
                pet_status_effect(ApplicationStatus::Completed, next),
                Some(PetStatus::Available)
            );
        }
    }

    #[test]
    fn other_moves_leave_pet_alone() {
        let open =
            [ApplicationStatus::Pending, ApplicationStatus::Approved, ApplicationStatus::Rejected];
        for previous in open {
            for next in open {
                assert_eq!(pet_status_effect(previous, next), None);
            }
        }
    }
}
