// pawhaven-core/src/runtime/mod.rs
// ============================================================================
// Module: PawHaven Runtime
// Description: Shelter service, intake, status rules, gate, and stores.
// Purpose: Execute shelter operations against a pluggable record store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the shelter behaviour. Hosts build a [`Shelter`]
//! over any [`crate::interfaces::ShelterStore`] and call it from request
//! handlers or command-line tools.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gate;
pub mod intake;
pub mod shelter;
pub mod status;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::AdoptionGate;
pub use gate::DEFAULT_NEXT;
pub use gate::GateDecision;
pub use gate::application_path;
pub use gate::sanitize_next;
pub use intake::prepare_application;
pub use shelter::ACCOUNT_RECENT_LIMIT;
pub use shelter::ApplicationDetail;
pub use shelter::DEFAULT_SESSION_TTL_MINUTES;
pub use shelter::HomeSummary;
pub use shelter::PetDetail;
pub use shelter::Shelter;
pub use shelter::ShelterError;
pub use shelter::ShelterSettings;
pub use shelter::StaffOutcome;
pub use status::pet_status_effect;
pub use store::InMemoryShelterStore;
pub use store::SharedShelterStore;
