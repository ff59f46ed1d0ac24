// pawhaven-config/src/lib.rs
// ============================================================================
// Module: PawHaven Config Library
// Description: Configuration model and validation for the shelter site.
// Purpose: Single source of truth for pawhaven.toml semantics.
// Dependencies: pawhaven-core, pawhaven-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `pawhaven-config` defines the configuration model for the shelter site.
//! Loading is strict and fail-closed: oversized, malformed, or inconsistent
//! files are rejected before any server state is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
