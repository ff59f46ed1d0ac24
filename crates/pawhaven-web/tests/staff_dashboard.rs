// pawhaven-web/tests/staff_dashboard.rs
// ============================================================================
// Module: Staff Dashboard Tests
// Description: Access control, triage actions, pet management, and stories.
// Purpose: Validate the staff-only pages under `/admin-dashboard`.
// Dependencies: pawhaven-web, pawhaven-core
// ============================================================================
//! ## Overview
//! Staff-only pages under `/admin-dashboard`: access control, application
//! and message triage with search, and pet creation and editing.

#![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

mod common;

use axum::http::StatusCode;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::ContactForm;
use pawhaven_core::PetStatus;
use pawhaven_web::ShelterAuditKind;
use serde_json::Value;

use crate::common::TestSite;
use crate::common::application_form;
use crate::common::site;

/// Seeds a staff account and returns its session cookie.
async fn staff_cookie(site: &TestSite) -> String {
    site.seed_staff("keeper");
    site.login("keeper").await
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let site = site();
    let response = site.get("/admin-dashboard/applications?status=pending", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        "/login?next=%2Fadmin-dashboard%2Fapplications%3Fstatus%3Dpending"
    );
}

#[tokio::test]
async fn members_without_staff_rights_are_forbidden() {
    let site = site();
    let cookie = site.register("robin").await;
    for path in ["/admin-dashboard", "/admin-dashboard/stats", "/admin-dashboard/pets"] {
        assert_eq!(site.get(path, Some(&cookie)).await.status, StatusCode::FORBIDDEN, "{path}");
    }
    let post = site
        .post_form("/admin-dashboard/pets/1/featured", &[], Some(&cookie))
        .await;
    assert_eq!(post.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_summarizes_pending_work() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    site.state
        .shelter()
        .submit_application(Some(pet.id), &application_form(), None, site.now())
        .unwrap();
    let cookie = staff_cookie(&site).await;

    let response = site.get("/admin-dashboard", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Biscuit"));
    assert!(response.body.contains("Robin Okafor"));
}

#[tokio::test]
async fn stats_are_served_as_json() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    site.seed_pet("Mochi", "cat");
    site.state
        .shelter()
        .submit_application(Some(pet.id), &application_form(), None, site.now())
        .unwrap();
    let cookie = staff_cookie(&site).await;

    let response = site.get("/admin-dashboard/stats", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let stats: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(stats["pending_applications"], 1);
    assert_eq!(stats["available_pets"], 2);
    assert_eq!(stats["total_adopted"], 0);
    assert_eq!(stats["unread_messages"], 0);
}

#[tokio::test]
async fn unknown_statuses_change_nothing() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let (application, _) = site
        .state
        .shelter()
        .submit_application(Some(pet.id), &application_form(), None, site.now())
        .unwrap();
    let cookie = staff_cookie(&site).await;

    let path = format!("/admin-dashboard/applications/{}/status", application.id);
    let response = site.post_form(&path, &[("status", "shipped")], Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        format!("/admin-dashboard/applications/{}?notice=invalid_status", application.id)
    );
    let detail = site.state.shelter().application_detail(application.id).unwrap();
    assert_eq!(detail.application.status, ApplicationStatus::Pending);
    assert!(!site.audit.kinds().contains(&ShelterAuditKind::ApplicationStatusChanged));

    let pet_path = format!("/admin-dashboard/pets/{}/status", pet.id);
    let pet_response = site.post_form(&pet_path, &[("status", "lost")], Some(&cookie)).await;
    assert_eq!(pet_response.location(), "/admin-dashboard/pets?notice=invalid_status");
    assert_eq!(site.state.shelter().pet_detail(pet.id).unwrap().pet.status, PetStatus::Available);
}

#[tokio::test]
async fn application_pages_filter_and_record_notes() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let (application, _) = site
        .state
        .shelter()
        .submit_application(Some(pet.id), &application_form(), None, site.now())
        .unwrap();
    let cookie = staff_cookie(&site).await;

    let pending = site.get("/admin-dashboard/applications?status=pending", Some(&cookie)).await;
    assert!(pending.body.contains("Robin Okafor"));
    let rejected = site.get("/admin-dashboard/applications?status=rejected", Some(&cookie)).await;
    assert!(!rejected.body.contains("Robin Okafor"));

    let notes_path = format!("/admin-dashboard/applications/{}/notes", application.id);
    let saved = site
        .post_form(&notes_path, &[("notes", "Called references")], Some(&cookie))
        .await;
    assert!(saved.location().ends_with("notice=notes_saved"));
    let detail = site
        .get(&format!("/admin-dashboard/applications/{}", application.id), Some(&cookie))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body.contains("Called references"));

    let missing = site.get("/admin-dashboard/applications/999", Some(&cookie)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn staff_manage_pets() {
    let site = site();
    let cookie = staff_cookie(&site).await;

    let form = site.get("/admin-dashboard/pets/new", Some(&cookie)).await;
    assert_eq!(form.status, StatusCode::OK);

    let created = site
        .post_form(
            "/admin-dashboard/pets/new",
            &[
                ("name", "Juniper"),
                ("type", "rabbit"),
                ("breed", "Holland Lop"),
                ("age", "1 year"),
                ("gender", "Female"),
                ("size", "Small"),
                ("color", "Grey"),
                ("description", "Curious and gentle."),
                ("personality", "curious, gentle"),
                ("vaccinated", "on"),
                ("arrival_date", "2024-05-28"),
                ("adoption_fee", "60.00"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    assert_eq!(created.location(), "/admin-dashboard/pets?notice=pet_created");
    let pet = site.state.shelter().all_pets(None).unwrap().remove(0);
    assert_eq!(pet.name, "Juniper");
    assert_eq!(pet.personality, ["curious", "gentle"]);
    assert!(pet.vaccinated);

    let invalid = site
        .post_form("/admin-dashboard/pets/new", &[("name", "Nameless")], Some(&cookie))
        .await;
    assert_eq!(invalid.status, StatusCode::OK);
    assert_eq!(site.state.shelter().all_pets(None).unwrap().len(), 1);

    site.post_form(&format!("/admin-dashboard/pets/{}/featured", pet.id), &[], Some(&cookie))
        .await;
    assert!(site.state.shelter().pet_detail(pet.id).unwrap().pet.featured);

    site.post_form(
        &format!("/admin-dashboard/pets/{}/status", pet.id),
        &[("status", "pending")],
        Some(&cookie),
    )
    .await;
    assert_eq!(site.state.shelter().pet_detail(pet.id).unwrap().pet.status, PetStatus::Pending);

    let listed = site.get("/admin-dashboard/pets?status=pending", Some(&cookie)).await;
    assert!(listed.body.contains("Juniper"));
    assert!(site.audit.kinds().contains(&ShelterAuditKind::PetCreated));
}

/// Every field of the pet form with `name` and `slug` overridden.
fn pet_fields<'a>(name: &'a str, slug: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("slug", slug),
        ("type", "dog"),
        ("breed", "Beagle"),
        ("age", "4 years"),
        ("gender", "Male"),
        ("size", "Large"),
        ("color", "Tricolor"),
        ("description", "Settled and house trained."),
        ("personality", "calm, loyal"),
        ("status", "available"),
        ("arrival_date", "2024-05-02"),
        ("adoption_fee", "120"),
    ]
}

#[tokio::test]
async fn staff_edit_pets_without_moving_the_slug() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let cookie = staff_cookie(&site).await;
    let edit_path = format!("/admin-dashboard/pets/{}/edit", pet.id);

    let page = site.get(&edit_path, Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(&format!(r#"action="{edit_path}""#)));
    assert!(page.body.contains(r#"value="Biscuit""#));
    assert!(page.body.contains(r#"value="2024-05-20""#));

    let saved =
        site.post_form(&edit_path, &pet_fields("Biscuit Jr", "new-slug"), Some(&cookie)).await;
    assert_eq!(saved.status, StatusCode::SEE_OTHER);
    assert_eq!(saved.location(), "/admin-dashboard/pets?notice=pet_updated");
    let edited = site.state.shelter().pet_detail(pet.id).unwrap().pet;
    assert_eq!(edited.name, "Biscuit Jr");
    assert_eq!(edited.slug, "biscuit");
    assert_eq!(edited.breed, "Beagle");
    assert_eq!(edited.personality, ["calm", "loyal"]);
    assert_eq!(edited.adoption_fee.to_string(), "120.00");
    assert!(site.audit.kinds().contains(&ShelterAuditKind::PetUpdated));

    let invalid = site.post_form(&edit_path, &[("name", "Nameless")], Some(&cookie)).await;
    assert_eq!(invalid.status, StatusCode::OK);
    assert!(invalid.body.contains("Please correct the errors below."));
    assert_eq!(site.state.shelter().pet_detail(pet.id).unwrap().pet, edited);

    let missing = site.get("/admin-dashboard/pets/999/edit", Some(&cookie)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    let missing_post = site
        .post_form("/admin-dashboard/pets/999/edit", &pet_fields("Ghost", ""), Some(&cookie))
        .await;
    assert_eq!(missing_post.status, StatusCode::NOT_FOUND);

    let anonymous = site.get(&edit_path, None).await;
    assert_eq!(anonymous.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn applications_and_messages_are_searchable() {
    let site = site();
    let biscuit = site.seed_pet("Biscuit", "dog");
    let mochi = site.seed_pet("Mochi", "cat");
    let shelter = site.state.shelter();
    shelter.submit_application(Some(biscuit.id), &application_form(), None, site.now()).unwrap();
    let mut other = application_form();
    other.first_name = "Tamsin".to_string();
    other.last_name = "Vale".to_string();
    other.email = "tamsin@example.net".to_string();
    shelter.submit_application(Some(mochi.id), &other, None, site.now()).unwrap();
    for (name, subject, message) in [
        ("Sam Reyes", "Volunteering", "Do you need weekend dog walkers?"),
        ("Ines Duarte", "Donations", "Can I drop off blankets?"),
    ] {
        let form = ContactForm {
            name: name.to_string(),
            email: "visitor@example.com".to_string(),
            phone: None,
            subject: subject.to_string(),
            message: message.to_string(),
        };
        shelter.submit_contact(&form, site.now()).unwrap();
    }
    let cookie = staff_cookie(&site).await;

    let by_pet = site.get("/admin-dashboard/applications?search=mochi", Some(&cookie)).await;
    assert!(by_pet.body.contains("Tamsin Vale"));
    assert!(!by_pet.body.contains("Robin Okafor"));
    assert!(by_pet.body.contains(r#"name="search" value="mochi""#));
    let by_email = site
        .get("/admin-dashboard/applications?status=pending&search=robin%40", Some(&cookie))
        .await;
    assert!(by_email.body.contains("Robin Okafor"));
    assert!(!by_email.body.contains("Tamsin Vale"));
    let everyone = site.get("/admin-dashboard/applications?search=", Some(&cookie)).await;
    assert!(everyone.body.contains("Robin Okafor") && everyone.body.contains("Tamsin Vale"));

    let walkers = site.get("/admin-dashboard/messages?search=walkers", Some(&cookie)).await;
    assert!(walkers.body.contains("Volunteering"));
    assert!(!walkers.body.contains("Donations"));
    let by_sender =
        site.get("/admin-dashboard/messages?unread=1&search=duarte", Some(&cookie)).await;
    assert!(by_sender.body.contains("Donations"));
    assert!(!by_sender.body.contains("Volunteering"));
}

#[tokio::test]
async fn messages_are_triaged() {
    let site = site();
    let message = site
        .state
        .shelter()
        .submit_contact(
            &ContactForm {
                name: "Sam Reyes".to_string(),
                email: "sam@example.com".to_string(),
                phone: None,
                subject: "Volunteering".to_string(),
                message: "Do you need weekend dog walkers?".to_string(),
            },
            site.now(),
        )
        .unwrap();
    let cookie = staff_cookie(&site).await;

    let unread = site.get("/admin-dashboard/messages?unread=1", Some(&cookie)).await;
    assert!(unread.body.contains("Volunteering"));

    let read = site
        .post_form(&format!("/admin-dashboard/messages/{}/read", message.id), &[], Some(&cookie))
        .await;
    assert_eq!(read.location(), "/admin-dashboard/messages?notice=message_updated");
    assert!(site.state.shelter().contact_messages(true, None).unwrap().is_empty());

    let after = site.get("/admin-dashboard/messages?unread=1", Some(&cookie)).await;
    assert!(!after.body.contains("Volunteering"));

    let bogus = site
        .post_form(&format!("/admin-dashboard/messages/{}/archive", message.id), &[], Some(&cookie))
        .await;
    assert_eq!(bogus.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stories_are_published() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let cookie = staff_cookie(&site).await;

    let form = site.get("/admin-dashboard/stories/new", Some(&cookie)).await;
    assert!(form.body.contains("Biscuit"));

    let pet_id = pet.id.to_string();
    let created = site
        .post_form(
            "/admin-dashboard/stories/new",
            &[
                ("pet_id", &pet_id),
                ("adopter_name", "The Okafors"),
                ("adoption_date", "2024-05-30"),
                ("title", "Biscuit finds a yard"),
                ("story", "Biscuit now naps in the sun every afternoon."),
                ("featured", "on"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(created.location(), "/success-stories?notice=story_created");

    let board = site.get("/success-stories", None).await;
    assert!(board.body.contains("Biscuit finds a yard"));

    let unknown_pet = site
        .post_form(
            "/admin-dashboard/stories/new",
            &[
                ("pet_id", "999"),
                ("adopter_name", "Nobody"),
                ("adoption_date", "2024-05-30"),
                ("title", "Ghost story"),
                ("story", "Never happened."),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(unknown_pet.status, StatusCode::OK);
    assert_eq!(site.state.shelter().success_stories().unwrap().stories.len(), 1);
}
