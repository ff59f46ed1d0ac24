// pawhaven-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Shared form builders and a test password hasher.
// Purpose: Give every core test binary the same clock origin and valid forms.
// Dependencies: pawhaven-core
// ============================================================================
//! ## Overview
//! Fixtures build a shelter over a fresh in-memory store, valid pet and
//! application forms, and a reversible password hasher so account tests can
//! run without a real hashing cost.

#![allow(dead_code, reason = "Not every test binary uses every fixture.")]

use pawhaven_core::ApplicationForm;
use pawhaven_core::InMemoryShelterStore;
use pawhaven_core::PasswordHasher;
use pawhaven_core::PasswordHasherError;
use pawhaven_core::PetForm;
use pawhaven_core::Shelter;
use pawhaven_core::ShelterSettings;
use pawhaven_core::Timestamp;

/// Fixed clock origin for tests (2024-06-01T00:00:00Z).
pub const T0: i64 = 1_717_200_000_000;

/// Returns a timestamp `offset_ms` after [`T0`].
pub fn at(offset_ms: i64) -> Timestamp {
    Timestamp::from_unix_millis(T0 + offset_ms)
}

/// Builds a shelter over a fresh in-memory store.
pub fn memory_shelter() -> Shelter<InMemoryShelterStore> {
    Shelter::new(InMemoryShelterStore::new(), ShelterSettings::default())
}

/// Builds a valid pet form.
pub fn pet_form(name: &str, pet_type: &str, size: &str, arrival_date: &str) -> PetForm {
    PetForm {
        name: name.to_string(),
        pet_type: pet_type.to_string(),
        breed: "Mixed".to_string(),
        age: "2 years".to_string(),
        gender: "Female".to_string(),
        size: size.to_string(),
        color: "Brown".to_string(),
        description: format!("{name} is a friendly companion."),
        arrival_date: arrival_date.to_string(),
        adoption_fee: "95.00".to_string(),
        ..PetForm::default()
    }
}

/// Builds a valid application form without a pet choice.
pub fn application_form(email: &str) -> ApplicationForm {
    ApplicationForm {
        first_name: "Robin".to_string(),
        last_name: "Okafor".to_string(),
        email: email.to_string(),
        phone: "555-0142".to_string(),
        address: "88 Harbor Lane".to_string(),
        housing_type: "House".to_string(),
        own_or_rent: "Own".to_string(),
        landlord_approval: "no".to_string(),
        household_adults: "2".to_string(),
        household_children: "1".to_string(),
        has_other_pets: "no".to_string(),
        previous_pet_experience: "Two dogs over ten years".to_string(),
        reason_for_adoption: "Our yard is too quiet".to_string(),
        ..ApplicationForm::default()
    }
}

/// Reversible hasher for tests; never use outside tests.
#[derive(Debug, Default)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHasherError> {
        let stored = encoded
            .strip_prefix("plain$")
            .ok_or_else(|| PasswordHasherError::Malformed("missing plain$ prefix".to_string()))?;
        Ok(stored == password)
    }
}
