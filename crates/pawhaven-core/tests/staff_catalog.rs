// pawhaven-core/tests/staff_catalog.rs
// ============================================================================
// Module: Staff Catalog Tests
// Description: Pet edits and dashboard search over the in-memory store.
// Purpose: Validate that edits keep pet identity and search narrows lists.
// Dependencies: pawhaven-core
// ============================================================================
//! ## Overview
//! Edits replace every form field but keep the id, slug, and creation time.
//! Application search covers applicant names, email, and the pet's name;
//! message search covers sender, subject, and body.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::application_form;
use common::at;
use common::memory_shelter;
use common::pet_form;
use pawhaven_core::ContactForm;
use pawhaven_core::PetForm;
use pawhaven_core::PetId;
use pawhaven_core::PetStatus;
use pawhaven_core::ShelterError;
use pawhaven_core::ShelterStore;

#[test]
fn pet_edit_keeps_id_slug_and_created_at() {
    let shelter = memory_shelter();
    let pet =
        shelter.create_pet(&pet_form("Juniper", "cat", "Small", "2024-02-02"), at(0)).unwrap();

    let mut form = PetForm::from_pet(&pet);
    form.name = "Juniper Rose".to_string();
    form.slug = Some("june".to_string());
    form.size = "Medium".to_string();
    form.status = Some("pending".to_string());
    form.personality = vec!["Curious".to_string()];
    let updated = shelter.update_pet(pet.id, &form, at(50)).unwrap();

    assert_eq!(updated.id, pet.id);
    assert_eq!(updated.slug, "juniper");
    assert_eq!(updated.name, "Juniper Rose");
    assert_eq!(updated.size.as_str(), "Medium");
    assert_eq!(updated.status, PetStatus::Pending);
    assert_eq!(updated.personality, ["Curious"]);
    assert_eq!(updated.created_at, at(0));
    assert_eq!(updated.updated_at, at(50));
    assert_eq!(shelter.store().pet(pet.id).unwrap(), Some(updated));
}

#[test]
fn invalid_or_missing_pet_edits_change_nothing() {
    let shelter = memory_shelter();
    let pet =
        shelter.create_pet(&pet_form("Juniper", "cat", "Small", "2024-02-02"), at(0)).unwrap();

    let mut form = PetForm::from_pet(&pet);
    form.pet_type = "dragon".to_string();
    match shelter.update_pet(pet.id, &form, at(1)) {
        Err(ShelterError::Validation(errors)) => assert!(errors.has("type")),
        other => panic!("unexpected result: {}", other.is_ok()),
    }
    assert_eq!(shelter.store().pet(pet.id).unwrap(), Some(pet.clone()));

    let missing = PetId::from_raw(404).unwrap();
    let valid = PetForm::from_pet(&pet);
    assert!(matches!(shelter.update_pet(missing, &valid, at(2)), Err(ShelterError::NotFound(_))));
}

#[test]
fn application_search_covers_applicant_and_pet() {
    let shelter = memory_shelter();
    let juniper =
        shelter.create_pet(&pet_form("Juniper", "cat", "Small", "2024-02-02"), at(0)).unwrap();
    let otto = shelter.create_pet(&pet_form("Otto", "dog", "Large", "2024-02-03"), at(0)).unwrap();
    shelter
        .submit_application(Some(juniper.id), &application_form("robin@example.org"), None, at(1))
        .unwrap();
    let mut other = application_form("kai@example.net");
    other.first_name = "Kai".to_string();
    other.last_name = "Lindqvist".to_string();
    shelter.submit_application(Some(otto.id), &other, None, at(2)).unwrap();

    let emails = |search: Option<&str>| -> Vec<String> {
        shelter
            .applications(None, search)
            .unwrap()
            .into_iter()
            .map(|application| application.details.email)
            .collect()
    };
    assert_eq!(emails(None), ["kai@example.net", "robin@example.org"]);
    assert_eq!(emails(Some("okafor")), ["robin@example.org"]);
    assert_eq!(emails(Some("Lindq")), ["kai@example.net"]);
    assert_eq!(emails(Some("example.net")), ["kai@example.net"]);
    assert_eq!(emails(Some("juniper")), ["robin@example.org"]);
    assert_eq!(emails(Some("")), ["kai@example.net", "robin@example.org"]);
    assert!(emails(Some("harbor")).is_empty());
    assert_eq!(shelter.applications(Some("pending"), Some("otto")).unwrap().len(), 1);
}

#[test]
fn message_search_covers_sender_subject_and_body() {
    let shelter = memory_shelter();
    for (offset, name, subject, message) in [
        (1, "Noor Haddad", "Fostering", "Can we foster two kittens?"),
        (2, "Eli Park", "Donations", "Do you take old towels?"),
    ] {
        let form = ContactForm {
            name: name.to_string(),
            email: format!("{}@example.org", name.split(' ').next().unwrap().to_lowercase()),
            phone: None,
            subject: subject.to_string(),
            message: message.to_string(),
        };
        shelter.submit_contact(&form, at(offset)).unwrap();
    }

    let subjects = |unread_only: bool, search: Option<&str>| -> Vec<String> {
        shelter
            .contact_messages(unread_only, search)
            .unwrap()
            .into_iter()
            .map(|message| message.subject)
            .collect()
    };
    assert_eq!(subjects(false, Some("haddad")), ["Fostering"]);
    assert_eq!(subjects(false, Some("eli@")), ["Donations"]);
    assert_eq!(subjects(false, Some("DONAT")), ["Donations"]);
    assert_eq!(subjects(false, Some("kittens")), ["Fostering"]);
    assert_eq!(subjects(true, Some("towels")), ["Donations"]);
    assert_eq!(subjects(false, None), ["Donations", "Fostering"]);
    assert!(subjects(false, Some("volunteer")).is_empty());
}
