// pawhaven-core/src/runtime/intake.rs
// ============================================================================
// Module: PawHaven Application Intake
// Description: Target pet resolution and payload assembly for applications.
// Purpose: Turn a submitted adoption form into a pending application payload.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The target pet comes from the URL path when present, otherwise from the
//! form's `pet_id` field. Field validation and pet resolution errors are
//! reported together so the form can be re-rendered once. Availability is
//! checked by the service against the store for both sources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccountId;
use crate::core::ApplicationForm;
use crate::core::NewApplication;
use crate::core::PetId;
use crate::core::Timestamp;
use crate::core::ValidationErrors;

// ============================================================================
// SECTION: Intake
// ============================================================================

/// Validates `form` and resolves the target pet into an insertable payload.
///
/// # Errors
///
/// Returns [`ValidationErrors`] when any field is invalid or no pet is named.
pub fn prepare_application(
    path_pet: Option<PetId>,
    form: &ApplicationForm,
    account_id: Option<AccountId>,
    now: Timestamp,
) -> Result<NewApplication, ValidationErrors> {
    let target = resolve_target(path_pet, form);
    match (form.validate(), target) {
        (Ok(details), Ok(pet_id)) => {
            Ok(NewApplication { pet_id, account_id, details, submitted_at: now })
        }
        (Ok(_), Err(pet_errors)) => Err(pet_errors),
        (Err(errors), Ok(_)) => Err(errors),
        (Err(mut errors), Err(pet_errors)) => {
            for error in pet_errors.errors() {
                errors.add(&error.field, error.message.clone());
            }
            Err(errors)
        }
    }
}

/// Picks the path pet, else parses the form-field pet.
fn resolve_target(
    path_pet: Option<PetId>,
    form: &ApplicationForm,
) -> Result<PetId, ValidationErrors> {
    if let Some(pet_id) = path_pet {
        return Ok(pet_id);
    }
    let Some(raw) = form.form_pet_id() else {
        return Err(ValidationErrors::single("pet_id", "select a pet to apply for"));
    };
    raw.parse::<u64>()
        .ok()
        .and_then(PetId::from_raw)
        .ok_or_else(|| ValidationErrors::single("pet_id", "select a valid pet"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
