// pawhaven-web/tests/adoption_flow.rs
// ============================================================================
// Module: Adoption Flow Tests
// Description: Access gate, application intake, and status synchronization.
// Purpose: Validate the adoption path end to end.
// Dependencies: pawhaven-web, pawhaven-core
// ============================================================================
//! ## Overview
//! Adoption applications from the gate page through staff review, including
//! the pet status moves that follow an application decision.

#![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

mod common;

use axum::http::StatusCode;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::PetStatus;
use pawhaven_core::ShelterSettings;
use pawhaven_web::ShelterAuditKind;

use crate::common::application_fields;
use crate::common::site;
use crate::common::site_with;

#[tokio::test]
async fn anonymous_visitors_see_the_gate_with_return_links() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");

    let response = site.get(&format!("/adoption/apply/{}", pet.id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(&format!("next=%2Fadoption%2Fapply%2F{}", pet.id)));
    assert!(!response.body.contains("household_adults"));
}

#[tokio::test]
async fn gate_checks_the_pet_before_the_visitor() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    site.state.shelter().set_pet_status(pet.id, "adopted", site.now()).unwrap();

    let adopted = site.get(&format!("/adoption/apply/{}", pet.id), None).await;
    assert_eq!(adopted.status, StatusCode::NOT_FOUND);
    let missing = site.get("/adoption/apply/404", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_submissions_are_sent_to_login() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");

    let response = site
        .post_form(&format!("/adoption/apply/{}", pet.id), &application_fields(), None)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), format!("/login?next=%2Fadoption%2Fapply%2F{}", pet.id));
    assert!(site.state.shelter().applications(None, None).unwrap().is_empty());
}

#[tokio::test]
async fn members_see_a_prefilled_form() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let cookie = site.register("robin").await;

    let response = site.get(&format!("/adoption/apply/{}", pet.id), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("robin@example.com"));
    assert!(response.body.contains("Biscuit"));
}

#[tokio::test]
async fn member_applications_are_linked_and_pending() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let cookie = site.register("robin").await;

    let response = site
        .post_form(&format!("/adoption/apply/{}", pet.id), &application_fields(), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/account/applications?notice=application_submitted");

    let applications = site.state.shelter().applications(None, None).unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].status, ApplicationStatus::Pending);
    assert!(applications[0].account_id.is_some());
    assert!(site.audit.kinds().contains(&ShelterAuditKind::ApplicationSubmitted));

    let listed = site.get("/account/applications", Some(&cookie)).await;
    assert!(listed.body.contains("Biscuit"));
}

#[tokio::test]
async fn pet_picker_submissions_need_a_pet_choice() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let cookie = site.register("robin").await;

    let missing = site.post_form("/adoption/apply", &application_fields(), Some(&cookie)).await;
    assert_eq!(missing.status, StatusCode::OK);
    assert!(site.state.shelter().applications(None, None).unwrap().is_empty());

    let pet_id = pet.id.to_string();
    let mut fields = application_fields();
    fields.push(("pet_id", pet_id.as_str()));
    let chosen = site.post_form("/adoption/apply", &fields, Some(&cookie)).await;
    assert_eq!(chosen.status, StatusCode::SEE_OTHER);
    assert_eq!(site.state.shelter().applications(None, None).unwrap()[0].pet_id, pet.id);
}

#[tokio::test]
async fn invalid_applications_are_shown_again() {
    let site = site();
    let pet = site.seed_pet("Biscuit", "dog");
    let cookie = site.register("robin").await;

    let response = site
        .post_form(
            &format!("/adoption/apply/{}", pet.id),
            &[("first_name", "Robin"), ("email", "robin@example.com")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(site.state.shelter().applications(None, None).unwrap().is_empty());
}

#[tokio::test]
async fn open_gate_accepts_anonymous_applications() {
    let site = site_with(ShelterSettings { require_account: false, ..ShelterSettings::default() });
    let pet = site.seed_pet("Biscuit", "dog");

    let form = site.get(&format!("/adoption/apply/{}", pet.id), None).await;
    assert!(form.body.contains("household_adults"));

    let response = site
        .post_form(&format!("/adoption/apply/{}", pet.id), &application_fields(), None)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        format!("{}?notice=application_submitted", pet.absolute_path())
    );
    let applications = site.state.shelter().applications(None, None).unwrap();
    assert_eq!(applications.len(), 1);
    assert!(applications[0].account_id.is_none());
}

#[tokio::test]
async fn completing_and_reopening_an_application_moves_the_pet() {
    let site = site();
    let names = ["Ace", "Bo", "Cleo", "Dot", "Elm", "Fig", "Gus"];
    let pets: Vec<_> = names.iter().map(|name| site.seed_pet(name, "dog")).collect();
    let pet = &pets[6];
    assert_eq!(pet.id.to_string(), "7");
    site.seed_staff("keeper");
    let member = site.register("robin").await;
    let staff = site.login("keeper").await;

    site.post_form("/adoption/apply/7", &application_fields(), Some(&member)).await;
    let application = site.state.shelter().applications(None, None).unwrap().remove(0);
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(site.state.shelter().pet_detail(pet.id).unwrap().pet.status, PetStatus::Available);

    let status_path = format!("/admin-dashboard/applications/{}/status", application.id);
    let completed = site.post_form(&status_path, &[("status", "completed")], Some(&staff)).await;
    assert_eq!(completed.status, StatusCode::SEE_OTHER);
    assert!(completed.location().ends_with("notice=status_updated"));
    assert_eq!(site.state.shelter().pet_detail(pet.id).unwrap().pet.status, PetStatus::Adopted);

    site.post_form(&status_path, &[("status", "pending")], Some(&staff)).await;
    assert_eq!(site.state.shelter().pet_detail(pet.id).unwrap().pet.status, PetStatus::Available);

    let changes: Vec<_> = site
        .audit
        .events()
        .into_iter()
        .filter(|event| event.kind == ShelterAuditKind::ApplicationStatusChanged)
        .filter_map(|event| event.detail)
        .collect();
    assert_eq!(changes.len(), 2);
    assert!(changes[0].starts_with("pending -> completed"));
    assert!(changes[1].starts_with("completed -> pending"));
}
