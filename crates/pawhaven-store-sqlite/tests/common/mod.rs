// pawhaven-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: SQLite Store Test Fixtures
// Description: Temporary database fixtures and form builders.
// Purpose: Share database setup and valid forms across SQLite store tests.
// Dependencies: pawhaven-core, pawhaven-store-sqlite, tempfile
// ============================================================================
//! ## Overview
//! Each fixture owns a temporary directory holding one database file, so
//! tests never share state and can reopen the same file to check
//! persistence.

#![allow(dead_code, reason = "Not every test binary uses every fixture.")]
#![allow(clippy::expect_used, reason = "Fixture setup failures abort the test.")]

use std::path::PathBuf;

use pawhaven_core::ApplicationForm;
use pawhaven_core::PetForm;
use pawhaven_core::Shelter;
use pawhaven_core::ShelterSettings;
use pawhaven_core::Timestamp;
use pawhaven_store_sqlite::SqliteShelterStore;
use pawhaven_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

/// Fixed clock origin for tests (2024-06-01T00:00:00Z).
pub const T0: i64 = 1_717_200_000_000;

/// Returns a timestamp `offset_ms` after [`T0`].
pub fn at(offset_ms: i64) -> Timestamp {
    Timestamp::from_unix_millis(T0 + offset_ms)
}

/// Temporary database plus an open store.
pub struct SqliteFixture {
    /// Keeps the temporary directory alive.
    _dir: TempDir,
    /// Database file path.
    pub path: PathBuf,
    /// Open store.
    pub store: SqliteShelterStore,
}

impl SqliteFixture {
    /// Creates a fresh database in a temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("shelter.db");
        let store = SqliteShelterStore::new(&SqliteStoreConfig::at(&path)).expect("open store");
        Self { _dir: dir, path, store }
    }

    /// Opens a second store over the same file.
    pub fn reopen(&self) -> SqliteShelterStore {
        SqliteShelterStore::new(&SqliteStoreConfig::at(&self.path)).expect("reopen store")
    }

    /// Wraps a clone of the store in the shelter service.
    pub fn shelter(&self) -> Shelter<SqliteShelterStore> {
        Shelter::new(self.store.clone(), ShelterSettings::default())
    }
}

/// Builds a valid pet form.
pub fn pet_form(name: &str, pet_type: &str, arrival_date: &str) -> PetForm {
    PetForm {
        name: name.to_string(),
        pet_type: pet_type.to_string(),
        breed: "Mixed".to_string(),
        age: "3 years".to_string(),
        gender: "Male".to_string(),
        size: "Medium".to_string(),
        color: "Tan".to_string(),
        description: format!("{name} loves long walks."),
        personality: vec!["Playful".to_string(), "Gentle".to_string()],
        arrival_date: arrival_date.to_string(),
        adoption_fee: "125.50".to_string(),
        ..PetForm::default()
    }
}

/// Builds a valid application form without a pet choice.
pub fn application_form(email: &str) -> ApplicationForm {
    ApplicationForm {
        first_name: "Dana".to_string(),
        last_name: "Whitfield".to_string(),
        email: email.to_string(),
        phone: "555-0199".to_string(),
        address: "12 Orchard Row".to_string(),
        housing_type: "Apartment".to_string(),
        own_or_rent: "Rent".to_string(),
        landlord_approval: "yes".to_string(),
        household_adults: "1".to_string(),
        household_children: "0".to_string(),
        has_other_pets: "yes".to_string(),
        other_pets_description: "An elderly cat".to_string(),
        previous_pet_experience: "Fostered kittens".to_string(),
        reason_for_adoption: "Looking for a running partner".to_string(),
        ..ApplicationForm::default()
    }
}
