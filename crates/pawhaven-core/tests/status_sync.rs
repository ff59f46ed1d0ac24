// pawhaven-core/tests/status_sync.rs
// ============================================================================
// Module: Status Synchronizer Tests
// Description: Application status changes drive pet availability.
// ============================================================================
//! ## Overview
//! Exercises the status synchronizer through the shelter service over the
//! in-memory store, including the invalid-status no-op guarantee.

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
use pawhaven_core::ApplicationId;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::PetStatus;
use pawhaven_core::ShelterError;
use pawhaven_core::ShelterStore;

#[test]
fn completing_and_reopening_an_application_moves_the_pet() {
    let shelter = memory_shelter();
    let pet =
        shelter.create_pet(&pet_form("Juniper", "dog", "Large", "2024-05-20"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("robin@example.org"), None, at(10))
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(shelter.store().pet(pet.id).unwrap().unwrap().status, PetStatus::Available);

    let change = shelter.set_application_status(application.id, "completed", at(20)).unwrap();
    assert_eq!(change.previous, ApplicationStatus::Pending);
    assert_eq!(change.current, ApplicationStatus::Completed);
    assert_eq!(change.pet_status, Some(PetStatus::Adopted));
    assert_eq!(shelter.store().pet(pet.id).unwrap().unwrap().status, PetStatus::Adopted);

    let change = shelter.set_application_status(application.id, "pending", at(30)).unwrap();
    assert_eq!(change.pet_status, Some(PetStatus::Available));
    let pet = shelter.store().pet(pet.id).unwrap().unwrap();
    assert_eq!(pet.status, PetStatus::Available);
    assert_eq!(pet.updated_at, at(30));

    let stored = shelter.store().application(application.id).unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Pending);
    assert_eq!(stored.reviewed_at, Some(at(30)));
}

#[test]
fn approving_does_not_touch_the_pet() {
    let shelter = memory_shelter();
    let pet = shelter.create_pet(&pet_form("Olive", "cat", "Small", "2024-05-01"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("robin@example.org"), None, at(1))
        .unwrap();
    let change = shelter.set_application_status(application.id, "approved", at(2)).unwrap();
    assert_eq!(change.pet_status, None);
    assert_eq!(shelter.store().pet(pet.id).unwrap().unwrap().status, PetStatus::Available);
    assert_eq!(
        shelter.store().application(application.id).unwrap().unwrap().reviewed_at,
        Some(at(2))
    );
}

#[test]
fn unrecognized_status_changes_nothing() {
    let shelter = memory_shelter();
    let pet = shelter.create_pet(&pet_form("Pepper", "dog", "Small", "2024-05-01"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("robin@example.org"), None, at(1))
        .unwrap();
    shelter.set_application_status(application.id, "completed", at(2)).unwrap();

    let err = shelter.set_application_status(application.id, "archived", at(3)).unwrap_err();
    assert!(matches!(err, ShelterError::InvalidStatus(ref raw) if raw == "archived"));

    let stored = shelter.store().application(application.id).unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Completed);
    assert_eq!(stored.reviewed_at, Some(at(2)));
    assert_eq!(shelter.store().pet(pet.id).unwrap().unwrap().status, PetStatus::Adopted);
}

#[test]
fn missing_application_is_not_found() {
    let shelter = memory_shelter();
    let id = ApplicationId::from_raw(999).unwrap();
    assert!(matches!(
        shelter.set_application_status(id, "approved", at(0)),
        Err(ShelterError::NotFound(_))
    ));
    assert!(matches!(
        shelter.set_application_notes(id, "call back", at(0)),
        Err(ShelterError::NotFound(_))
    ));
}

#[test]
fn notes_update_stamps_review_time() {
    let shelter = memory_shelter();
    let pet =
        shelter.create_pet(&pet_form("Maple", "rabbit", "Small", "2024-05-01"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("robin@example.org"), None, at(1))
        .unwrap();
    let updated =
        shelter.set_application_notes(application.id, "  Home visit booked ", at(5)).unwrap();
    assert_eq!(updated.notes, "Home visit booked");
    assert_eq!(updated.reviewed_at, Some(at(5)));
    assert_eq!(updated.status, ApplicationStatus::Pending);
}
