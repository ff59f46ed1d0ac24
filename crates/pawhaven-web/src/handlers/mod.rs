// pawhaven-web/src/handlers/mod.rs
// ============================================================================
// Module: Request Handlers
// Description: Page handlers grouped by audience, plus shared rendering.
// Purpose: Turn requests into shelter calls and rendered pages.
// Dependencies: axum, tera, pawhaven-core
// ============================================================================

//! ## Overview
//! Handlers are grouped into public pages, the adoption flow, account pages,
//! and the staff dashboard. Every page starts from [`page_context`], which
//! carries the signed-in user and any notice into the base layout.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod accounts;
pub mod admin;
pub mod adoption;
pub mod public;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use pawhaven_core::Account;
use pawhaven_core::Pet;
use pawhaven_core::PetId;
use pawhaven_core::ValidationErrors;
use serde::Deserialize;
use tera::Context;

use crate::error::WebError;
use crate::notices::Notice;
use crate::state::AppState;
use crate::state::blocking;
use crate::views::PetView;
use crate::views::UserView;
use crate::views::field_errors;

// ============================================================================
// SECTION: Shared Inputs
// ============================================================================

/// `status` form field or query parameter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusParam {
    /// Raw status value.
    pub status: Option<String>,
}

/// `next` query parameter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextParam {
    /// Post-authentication destination.
    pub next: Option<String>,
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Starts a page context with the layout variables.
pub(crate) fn page_context(
    title: &str,
    account: Option<&Account>,
    notice: Option<Notice>,
) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    if let Some(account) = account {
        context.insert("user", &UserView::from(account));
    }
    if let Some(notice) = notice {
        context.insert("notice", &notice);
    }
    context
}

/// Adds a form and its inline errors to `context`.
pub(crate) fn insert_form<T: serde::Serialize>(
    context: &mut Context,
    form: &T,
    errors: Option<&ValidationErrors>,
) {
    context.insert("form", form);
    context.insert("errors", &errors.is_some());
    context.insert("field_errors", &errors.map(field_errors).unwrap_or_default());
}

/// Renders `template` into an HTML response.
pub(crate) fn render(
    state: &AppState,
    template: &str,
    context: &Context,
) -> Result<Response, WebError> {
    Ok(Html(state.templates.render(template, context)?).into_response())
}

// ============================================================================
// SECTION: Lookups
// ============================================================================

/// Parses a numeric path id, treating anything malformed as not found.
pub(crate) fn parse_id<T>(
    raw: &str,
    kind: &str,
    from_raw: impl FnOnce(u64) -> Option<T>,
) -> Result<T, WebError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(from_raw)
        .ok_or_else(|| WebError::NotFound(format!("{kind} {raw}")))
}

/// Wraps pets for display using the configured new-arrival window.
pub(crate) fn pet_views(state: &AppState, pets: Vec<Pet>) -> Vec<PetView> {
    let today = state.clock.today();
    let window = state.shelter.settings().new_arrival_days;
    pets.into_iter().map(|pet| PetView::new(pet, today, window)).collect()
}

/// Wraps one pet for display.
pub(crate) fn pet_view(state: &AppState, pet: Pet) -> PetView {
    PetView::new(pet, state.clock.today(), state.shelter.settings().new_arrival_days)
}

/// Loads every pet keyed by id, for naming pets in application lists.
pub(crate) fn pet_index(state: &AppState) -> Result<HashMap<PetId, Pet>, WebError> {
    let pets = blocking(|| state.shelter.all_pets(None))?;
    Ok(pets.into_iter().map(|pet| (pet.id, pet)).collect())
}
