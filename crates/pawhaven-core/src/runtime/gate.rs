// pawhaven-core/src/runtime/gate.rs
// ============================================================================
// Module: PawHaven Adoption Gate
// Description: Access decisions for the adoption application form.
// Purpose: Route anonymous applicants through sign-in and back to the form.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! When accounts are required, anonymous visitors to the application form
//! see an interstitial page offering login or registration. Both links carry
//! a `next` parameter pointing back at the form. Redirect targets taken from
//! requests pass through [`sanitize_next`] so only site-relative paths are
//! followed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::PetId;

/// Destination used when a `next` parameter is absent or unsafe.
pub const DEFAULT_NEXT: &str = "/account";

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Outcome of the adoption gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Show or accept the application form.
    Proceed,
    /// Show the login/register choice page with this post-auth destination.
    Interstitial {
        /// Form path to return to after authentication.
        next: String,
    },
}

/// Adoption form access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdoptionGate {
    /// Anonymous visitors must sign in before applying.
    require_account: bool,
}

impl AdoptionGate {
    /// Creates a gate.
    #[must_use]
    pub const fn new(require_account: bool) -> Self {
        Self { require_account }
    }

    /// Decides whether a visitor may use the form for `pet`.
    #[must_use]
    pub fn decide(&self, authenticated: bool, pet: Option<PetId>) -> GateDecision {
        if authenticated || !self.require_account {
            GateDecision::Proceed
        } else {
            GateDecision::Interstitial { next: application_path(pet) }
        }
    }
}

/// Returns the application form path for an optional pet.
#[must_use]
pub fn application_path(pet: Option<PetId>) -> String {
    pet.map_or_else(|| "/adoption/apply".to_string(), |id| format!("/adoption/apply/{id}"))
}

/// Returns `raw` when it is a site-relative path, else [`DEFAULT_NEXT`].
///
/// Accepted values start with exactly one `/` and contain no backslashes or
/// control characters, so `//host` and `https://host` are rejected.
#[must_use]
pub fn sanitize_next(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return DEFAULT_NEXT.to_string();
    };
    let safe = raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.contains('\\')
        && !raw.chars().any(char::is_control);
    if safe { raw.to_string() } else { DEFAULT_NEXT.to_string() }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
