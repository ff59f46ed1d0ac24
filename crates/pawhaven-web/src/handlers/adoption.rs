// pawhaven-web/src/handlers/adoption.rs
// ============================================================================
// Module: Adoption Flow
// Description: Access gate, application form, and application intake.
// Purpose: Route visitors through the gate and record applications.
// Dependencies: axum, pawhaven-core
// ============================================================================

//! ## Overview
//! `GET /adoption/apply[/{pet_id}]` first confirms a path pet exists and is
//! available, then asks the adoption gate whether the visitor may see the
//! form. Anonymous visitors get a login/register choice page whose links
//! return to the form. A `POST` from an anonymous visitor while accounts are
//! required is sent to login instead of being recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Form;
use axum::extract::Path;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use pawhaven_core::Account;
use pawhaven_core::ApplicationForm;
use pawhaven_core::GateDecision;
use pawhaven_core::Pet;
use pawhaven_core::PetId;
use pawhaven_core::ShelterError;
use pawhaven_core::ValidationErrors;
use pawhaven_core::runtime::application_path;

use super::insert_form;
use super::page_context;
use super::parse_id;
use super::pet_view;
use super::render;
use crate::audit::ShelterAuditKind;
use crate::error::WebError;
use crate::notices::Notice;
use crate::notices::RequestNotice;
use crate::notices::with_notice;
use crate::session::Visitor;
use crate::session::login_redirect_path;
use crate::session::next_link;
use crate::state::AppState;
use crate::state::blocking;
use crate::views::pet_options;

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /adoption/apply`: form with a pet picker.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    show_application(&state, &visitor, notice, None)
}

/// `GET /adoption/apply/{pet_id}`: form for one available pet.
pub async fn apply_for_pet(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
    Path(pet_id): Path<String>,
) -> Result<Response, WebError> {
    let pet_id = parse_id(&pet_id, "pet", PetId::from_raw)?;
    show_application(&state, &visitor, notice, Some(pet_id))
}

/// `POST /adoption/apply`: records an application for the chosen pet.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    Form(form): Form<ApplicationForm>,
) -> Result<Response, WebError> {
    submit_application(&state, &visitor, None, &form)
}

/// `POST /adoption/apply/{pet_id}`: records an application for the path pet.
pub async fn submit_for_pet(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    Path(pet_id): Path<String>,
    Form(form): Form<ApplicationForm>,
) -> Result<Response, WebError> {
    let pet_id = parse_id(&pet_id, "pet", PetId::from_raw)?;
    submit_application(&state, &visitor, Some(pet_id), &form)
}

// ============================================================================
// SECTION: Flow
// ============================================================================

/// Shows the gate page or the form.
fn show_application(
    state: &AppState,
    visitor: &Visitor,
    notice: Option<Notice>,
    pet_id: Option<PetId>,
) -> Result<Response, WebError> {
    let pet = pet_id.map(|id| blocking(|| state.shelter.adoptable_pet(id))).transpose()?;
    match state.shelter.gate().decide(visitor.is_authenticated(), pet_id) {
        GateDecision::Interstitial { next } => {
            let mut context = page_context("Apply to Adopt", None, notice);
            context.insert("login_url", &login_redirect_path(&next));
            context.insert("register_url", &next_link("/register", &next));
            render(state, "adoption_gate.html", &context)
        }
        GateDecision::Proceed => {
            let form = prefilled_form(visitor.account.as_ref());
            render_application(state, visitor, notice, pet, &form, None)
        }
    }
}

/// Validates and records an application.
fn submit_application(
    state: &AppState,
    visitor: &Visitor,
    path_pet: Option<PetId>,
    form: &ApplicationForm,
) -> Result<Response, WebError> {
    if let GateDecision::Interstitial { next } =
        state.shelter.gate().decide(visitor.is_authenticated(), path_pet)
    {
        return Ok(Redirect::to(&login_redirect_path(&next)).into_response());
    }
    let account_id = visitor.account.as_ref().map(|account| account.id);
    let now = state.clock.now();
    match blocking(|| state.shelter.submit_application(path_pet, form, account_id, now)) {
        Ok((application, pet)) => {
            state.audit(
                ShelterAuditKind::ApplicationSubmitted,
                visitor.username(),
                Some(format!("application {}", application.id)),
                Some(format!("pet {}", pet.id)),
            );
            let target = if visitor.is_authenticated() {
                "/account/applications".to_string()
            } else {
                pet.absolute_path()
            };
            Ok(Redirect::to(&with_notice(&target, "application_submitted")).into_response())
        }
        Err(ShelterError::Validation(errors)) => {
            let pet = path_pet.map(|id| blocking(|| state.shelter.adoptable_pet(id))).transpose()?;
            render_application(state, visitor, None, pet, form, Some(&errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the application form.
fn render_application(
    state: &AppState,
    visitor: &Visitor,
    notice: Option<Notice>,
    pet: Option<Pet>,
    form: &ApplicationForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, WebError> {
    let mut context = page_context("Adoption Application", visitor.account.as_ref(), notice);
    context.insert("form_action", &application_path(pet.as_ref().map(|pet| pet.id)));
    if let Some(pet) = pet {
        context.insert("pet", &pet_view(state, pet));
    } else {
        let available = blocking(|| state.shelter.available_pets())?;
        context.insert("pet_options", &pet_options(&available, form.form_pet_id()));
    }
    insert_form(&mut context, form, errors);
    render(state, "adoption_apply.html", &context)
}

/// Starts a form with the applicant's account details filled in.
fn prefilled_form(account: Option<&Account>) -> ApplicationForm {
    account.map_or_else(ApplicationForm::default, |account| ApplicationForm {
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        email: account.email.clone(),
        ..ApplicationForm::default()
    })
}
