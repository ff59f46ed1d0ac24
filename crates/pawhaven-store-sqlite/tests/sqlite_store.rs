// pawhaven-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Shelter Store Tests
// Description: Persistence, status synchronization, and corruption handling.
// ============================================================================
//! ## Overview
//! Drives the shelter service over a real database file and checks that
//! records survive a reopen, that status changes move the pet in the same
//! transaction, and that undecodable rows fail closed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use bigdecimal::BigDecimal;
use common::SqliteFixture;
use common::application_form;
use common::at;
use common::pet_form;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::ContactAction;
use pawhaven_core::NewAccount;
use pawhaven_core::PetId;
use pawhaven_core::PetStatus;
use pawhaven_core::Session;
use pawhaven_core::SessionToken;
use pawhaven_core::ShelterError;
use pawhaven_core::ShelterStore;
use pawhaven_core::StoreError;
use pawhaven_core::StoryForm;
use pawhaven_store_sqlite::SqliteShelterStore;
use pawhaven_store_sqlite::SqliteStoreConfig;
use pawhaven_store_sqlite::SqliteStoreError;
use rusqlite::Connection;
use time::macros::date;

fn account(username: &str) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: format!("{username}@example.org"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "plain$secret-pass".to_string(),
        is_staff: false,
        joined_at: at(0),
    }
}

#[test]
fn pet_seven_walkthrough_persists_across_reopen() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    for index in 1..=7 {
        shelter.create_pet(&pet_form(&format!("Pet {index}"), "dog", "2024-05-01"), at(0)).unwrap();
    }
    let seven = PetId::from_raw(7).unwrap();
    let (application, _) = shelter
        .submit_application(Some(seven), &application_form("dana@example.org"), None, at(1))
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);

    shelter.set_application_status(application.id, "completed", at(2)).unwrap();
    let reopened = fixture.reopen();
    assert_eq!(reopened.pet(seven).unwrap().unwrap().status, PetStatus::Adopted);

    shelter.set_application_status(application.id, "pending", at(3)).unwrap();
    let pet = reopened.pet(seven).unwrap().unwrap();
    assert_eq!(pet.status, PetStatus::Available);
    assert_eq!(pet.updated_at, at(3));
    let stored = reopened.application(application.id).unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Pending);
    assert_eq!(stored.reviewed_at, Some(at(3)));
}

#[test]
fn pet_records_round_trip_every_field() {
    let fixture = SqliteFixture::new();
    let mut form = pet_form("Biscuit", "rabbit", "2024-04-10");
    form.special_needs = true;
    form.special_needs_description = Some("Needs daily eye drops".to_string());
    form.main_image = Some("/media/pets/biscuit.jpg".to_string());
    form.featured = true;
    let created = fixture.shelter().create_pet(&form, at(5)).unwrap();

    let loaded = fixture.reopen().pet(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.arrival_date, date!(2024 - 04 - 10));
    assert_eq!(loaded.adoption_fee, "125.50".parse::<BigDecimal>().unwrap());
    assert_eq!(loaded.personality, vec!["Playful".to_string(), "Gentle".to_string()]);
    assert_eq!(loaded.images(), vec!["/media/pets/biscuit.jpg"]);
}

#[test]
fn slugs_stay_unique() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    let first = shelter.create_pet(&pet_form("Max", "dog", "2024-05-01"), at(0)).unwrap();
    let second = shelter.create_pet(&pet_form("Max", "cat", "2024-05-02"), at(1)).unwrap();
    let third = shelter.create_pet(&pet_form("Max", "bird", "2024-05-03"), at(2)).unwrap();
    assert_eq!(first.slug, "max");
    assert_eq!(second.slug, "max-2");
    assert_eq!(third.slug, "max-3");
}

#[test]
fn listings_use_default_orders() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    shelter.create_pet(&pet_form("Alpha", "dog", "2024-03-01"), at(0)).unwrap();
    shelter.create_pet(&pet_form("Bravo", "dog", "2024-05-01"), at(0)).unwrap();
    shelter.create_pet(&pet_form("Aardvark", "dog", "2024-05-01"), at(0)).unwrap();
    let names: Vec<String> =
        fixture.store.pets(None).unwrap().into_iter().map(|pet| pet.name).collect();
    assert_eq!(names, ["Aardvark", "Bravo", "Alpha"]);

    let pet = fixture.store.pets(None).unwrap()[0].id;
    for offset in [30, 10, 20] {
        shelter
            .submit_application(Some(pet), &application_form("order@example.org"), None, at(offset))
            .unwrap();
    }
    let submitted: Vec<_> =
        fixture.store.applications(None).unwrap().into_iter().map(|a| a.submitted_at).collect();
    assert_eq!(submitted, [at(30), at(20), at(10)]);
}

#[test]
fn unrecognized_status_leaves_both_rows_untouched() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    let pet = shelter.create_pet(&pet_form("Rocket", "dog", "2024-05-01"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("dana@example.org"), None, at(1))
        .unwrap();
    let err = shelter.set_application_status(application.id, "shipped", at(2)).unwrap_err();
    assert!(matches!(err, ShelterError::InvalidStatus(_)));
    let stored = fixture.store.application(application.id).unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Pending);
    assert_eq!(stored.reviewed_at, None);
    assert_eq!(fixture.store.pet(pet.id).unwrap().unwrap().updated_at, at(0));
}

#[test]
fn status_change_rolls_back_when_the_pet_row_is_gone() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    let pet = shelter.create_pet(&pet_form("Ghost", "cat", "2024-05-01"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("dana@example.org"), None, at(1))
        .unwrap();
    {
        let raw = Connection::open(&fixture.path).unwrap();
        raw.execute_batch("PRAGMA foreign_keys = OFF; DELETE FROM pets;").unwrap();
    }
    let err = fixture
        .store
        .set_application_status(application.id, ApplicationStatus::Completed, at(2))
        .unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
    let stored = fixture.store.application(application.id).unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Pending);
}

#[test]
fn undecodable_rows_fail_closed() {
    let fixture = SqliteFixture::new();
    let pet = fixture.shelter().create_pet(&pet_form("Odd", "dog", "2024-05-01"), at(0)).unwrap();
    {
        let raw = Connection::open(&fixture.path).unwrap();
        raw.execute("UPDATE pets SET status = 'lost' WHERE id = ?1", [1_i64]).unwrap();
    }
    assert!(matches!(fixture.store.pet(pet.id), Err(StoreError::Corrupt(_))));
    assert!(matches!(fixture.store.pets(None), Err(StoreError::Corrupt(_))));
}

#[test]
fn newer_schema_versions_are_rejected() {
    let fixture = SqliteFixture::new();
    {
        let raw = Connection::open(&fixture.path).unwrap();
        raw.execute("UPDATE store_meta SET version = 99", []).unwrap();
    }
    let result = SqliteShelterStore::new(&SqliteStoreConfig::at(&fixture.path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn duplicate_usernames_conflict() {
    let fixture = SqliteFixture::new();
    fixture.store.insert_account(account("jordan")).unwrap();
    assert!(matches!(
        fixture.store.insert_account(account("jordan")),
        Err(StoreError::Conflict(_))
    ));
    assert!(fixture.store.account_by_username("Jordan").unwrap().is_none());
}

#[test]
fn sessions_are_purged_by_expiry() {
    let fixture = SqliteFixture::new();
    let owner = fixture.store.insert_account(account("jordan")).unwrap();
    let session = |token: &str, expires: i64| Session {
        token: SessionToken::new(token),
        account_id: owner.id,
        created_at: at(0),
        expires_at: at(expires),
    };
    fixture.store.insert_session(&session("old", 10)).unwrap();
    fixture.store.insert_session(&session("fresh", 1_000)).unwrap();
    assert!(matches!(
        fixture.store.insert_session(&session("fresh", 2_000)),
        Err(StoreError::Conflict(_))
    ));
    assert_eq!(fixture.store.purge_expired_sessions(at(10)).unwrap(), 1);
    assert!(fixture.store.session(&SessionToken::new("old")).unwrap().is_none());
    let fresh = fixture.store.session(&SessionToken::new("fresh")).unwrap().unwrap();
    assert_eq!(fresh.expires_at, at(1_000));
    fixture.store.delete_session(&SessionToken::new("fresh")).unwrap();
    assert!(fixture.store.session(&SessionToken::new("fresh")).unwrap().is_none());
}

#[test]
fn messages_stories_and_stats() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    let pet = shelter.create_pet(&pet_form("Sunny", "dog", "2024-05-01"), at(0)).unwrap();
    let (application, _) = shelter
        .submit_application(Some(pet.id), &application_form("dana@example.org"), None, at(1))
        .unwrap();
    shelter.set_application_status(application.id, "completed", at(2)).unwrap();

    let message = shelter
        .submit_contact(
            &pawhaven_core::ContactForm {
                name: "Lee".to_string(),
                email: "lee@example.org".to_string(),
                phone: Some("555-0100".to_string()),
                subject: "Volunteering".to_string(),
                message: "Weekend shifts available?".to_string(),
            },
            at(3),
        )
        .unwrap();
    let updated = shelter.update_contact_message(message.id, ContactAction::MarkResponded).unwrap();
    assert!(updated.is_read && updated.is_responded);

    let story = shelter
        .create_story(
            &StoryForm {
                pet_id: Some(pet.id.to_string()),
                adopter_name: "Dana W.".to_string(),
                adoption_date: "2024-06-02".to_string(),
                title: "Sunny found a home".to_string(),
                story: "Morning runs every day now.".to_string(),
                featured: true,
                ..StoryForm::default()
            },
            at(4),
        )
        .unwrap();
    let board = shelter.success_stories().unwrap();
    assert_eq!(board.stories, vec![story.clone()]);
    assert_eq!(board.featured, vec![story]);

    let stats = fixture.reopen().stats().unwrap();
    assert_eq!(stats.available_pets, 0);
    assert_eq!(stats.adopted_pets, 1);
    assert_eq!(stats.pending_applications, 0);
    assert_eq!(stats.completed_applications, 1);
    assert_eq!(stats.unread_messages, 0);
}

#[test]
fn pet_edits_persist_and_keep_the_slug() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    let created = shelter.create_pet(&pet_form("Biscuit", "dog", "2024-04-10"), at(0)).unwrap();

    let mut form = pet_form("Biscuit the Brave", "dog", "2024-04-12");
    form.slug = Some("brave".to_string());
    form.adoption_fee = "80".to_string();
    form.featured = true;
    let updated = shelter.update_pet(created.id, &form, at(9)).unwrap();
    assert_eq!(updated.slug, "biscuit");

    let loaded = fixture.reopen().pet(created.id).unwrap().unwrap();
    assert_eq!(loaded, updated);
    assert_eq!(loaded.name, "Biscuit the Brave");
    assert_eq!(loaded.arrival_date, date!(2024 - 04 - 12));
    assert_eq!(loaded.adoption_fee, "80.00".parse::<BigDecimal>().unwrap());
    assert!(loaded.featured);
    assert_eq!(loaded.created_at, at(0));
    assert_eq!(loaded.updated_at, at(9));

    let missing = PetId::from_raw(99).unwrap();
    assert!(matches!(shelter.update_pet(missing, &form, at(10)), Err(ShelterError::NotFound(_))));
    form.adoption_fee = "free".to_string();
    assert!(matches!(
        shelter.update_pet(created.id, &form, at(10)),
        Err(ShelterError::Validation(_))
    ));
    assert_eq!(fixture.reopen().pet(created.id).unwrap().unwrap().updated_at, at(9));
}

#[test]
fn staff_search_narrows_applications_and_messages() {
    let fixture = SqliteFixture::new();
    let shelter = fixture.shelter();
    let sunny = shelter.create_pet(&pet_form("Sunny", "dog", "2024-05-01"), at(0)).unwrap();
    let pip = shelter.create_pet(&pet_form("Pip", "bird", "2024-05-02"), at(0)).unwrap();
    let mut other = application_form("sam@example.org");
    other.first_name = "Sam".to_string();
    other.last_name = "Ortega".to_string();
    shelter
        .submit_application(Some(sunny.id), &application_form("dana@example.org"), None, at(1))
        .unwrap();
    shelter.submit_application(Some(pip.id), &other, None, at(2)).unwrap();

    let emails = |search: Option<&str>| -> Vec<String> {
        shelter
            .applications(None, search)
            .unwrap()
            .into_iter()
            .map(|application| application.details.email)
            .collect()
    };
    assert_eq!(emails(Some("ortega")), ["sam@example.org"]);
    assert_eq!(emails(Some("SUNNY")), ["dana@example.org"]);
    assert_eq!(emails(Some("dana@")), ["dana@example.org"]);
    assert_eq!(emails(Some("  ")), ["sam@example.org", "dana@example.org"]);
    assert!(emails(Some("nobody")).is_empty());
    assert!(shelter.applications(Some("approved"), Some("sam")).unwrap().is_empty());

    for (name, subject) in [("Lee", "Volunteering"), ("Ria", "Donations")] {
        shelter
            .submit_contact(
                &pawhaven_core::ContactForm {
                    name: name.to_string(),
                    email: format!("{}@example.org", name.to_lowercase()),
                    phone: None,
                    subject: subject.to_string(),
                    message: "Is there a weekend slot?".to_string(),
                },
                at(3),
            )
            .unwrap();
    }
    let subjects = |search: Option<&str>| -> Vec<String> {
        shelter
            .contact_messages(false, search)
            .unwrap()
            .into_iter()
            .map(|message| message.subject)
            .collect()
    };
    assert_eq!(subjects(Some("donat")), ["Donations"]);
    assert_eq!(subjects(Some("lee@example")), ["Volunteering"]);
    assert_eq!(subjects(Some("weekend")).len(), 2);
    assert!(subjects(Some("adoption")).is_empty());
}
