// pawhaven-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Shelter Store
// Description: Durable ShelterStore backend using SQLite WAL.
// Purpose: Provide persistent storage for pets, applications, and accounts.
// Dependencies: pawhaven-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ShelterStore`] implementation. All
//! tables live in one database file guarded by a versioned schema. Two-record
//! writes, such as an application status change that also moves its pet, run
//! inside a single transaction.
//!
//! [`ShelterStore`]: pawhaven_core::ShelterStore

// ============================================================================
// SECTION: Modules
// ============================================================================

mod rows;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteShelterStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
