// pawhaven-core/src/lib.rs
// ============================================================================
// Module: PawHaven Core Library
// Description: Public API surface for the PawHaven shelter core.
// Purpose: Expose domain types, store interfaces, and the shelter service.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! PawHaven core holds the shelter domain: pets, adoption applications,
//! contact messages, success stories, and accounts. It owns the listing
//! filter, intake validation, the application/pet status synchronizer, and
//! the adoption access gate. It performs no I/O and never reads the wall
//! clock; hosts pass `now` explicitly and plug storage in through
//! [`ShelterStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::PasswordHasher;
pub use interfaces::PasswordHasherError;
pub use interfaces::ShelterStats;
pub use interfaces::ShelterStore;
pub use interfaces::StoreError;
pub use runtime::AdoptionGate;
pub use runtime::ApplicationDetail;
pub use runtime::GateDecision;
pub use runtime::HomeSummary;
pub use runtime::InMemoryShelterStore;
pub use runtime::PetDetail;
pub use runtime::Shelter;
pub use runtime::ShelterError;
pub use runtime::ShelterSettings;
pub use runtime::SharedShelterStore;
pub use runtime::StaffOutcome;
pub use runtime::pet_status_effect;
pub use runtime::sanitize_next;
