// pawhaven-web/src/lib.rs
// ============================================================================
// Module: PawHaven Web Library
// Description: HTTP surface for the PawHaven shelter site.
// Purpose: Serve public pages, accounts, and the staff dashboard over axum.
// Dependencies: axum, tera, argon2, pawhaven-core, pawhaven-config
// ============================================================================

//! ## Overview
//! PawHaven web wraps the core [`pawhaven_core::Shelter`] service in an axum
//! router with Tera page templates, cookie sessions, Argon2 password hashing,
//! and a JSON-lines audit trail.
//! Invariants:
//! - Staff routes require an authenticated staff account; anonymous visitors
//!   are redirected to login and other accounts receive 403.
//! - Post-authentication redirects only follow same-site relative paths.
//! - Handlers take time from [`Clock`], so tests can pin it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod notices;
pub mod query;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;
pub mod views;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::ShelterAuditEvent;
pub use audit::ShelterAuditKind;
pub use audit::ShelterAuditSink;
pub use audit::StderrAuditSink;
pub use auth::Argon2PasswordHasher;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use error::WebError;
pub use server::ServerError;
pub use server::ShelterServer;
pub use server::build_router;
pub use server::build_store;
pub use state::AppState;
