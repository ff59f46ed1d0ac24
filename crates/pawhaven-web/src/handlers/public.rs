// pawhaven-web/src/handlers/public.rs
// ============================================================================
// Module: Public Pages
// Description: Home, listings, pet detail, contact, and information pages.
// Purpose: Serve the pages anyone can visit.
// Dependencies: axum, serde_json, pawhaven-core
// ============================================================================

//! Pages open to every visitor. Only available pets are listed; the detail
//! page shows a pet in any status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Form;
use axum::extract::Path;
use axum::extract::RawQuery;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use pawhaven_core::ContactForm;
use pawhaven_core::PetId;
use pawhaven_core::ShelterError;
use pawhaven_core::ValidationErrors;
use pawhaven_core::runtime::application_path;
use serde_json::json;

use super::insert_form;
use super::page_context;
use super::parse_id;
use super::pet_view;
use super::pet_views;
use super::render;
use crate::error::WebError;
use crate::notices::Notice;
use crate::notices::RequestNotice;
use crate::notices::with_notice;
use crate::query::page_link;
use crate::query::pet_query;
use crate::query::query_pairs;
use crate::session::Visitor;
use crate::state::AppState;
use crate::state::blocking;
use crate::views::pet_type_choices;
use crate::views::size_choices;

// ============================================================================
// SECTION: Home and Listings
// ============================================================================

/// `GET /`: featured pets and shelter counts.
pub async fn home(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let summary = blocking(|| state.shelter.home())?;
    let mut context = page_context("Home", visitor.account.as_ref(), notice);
    context.insert("featured_pets", &pet_views(&state, summary.featured_pets));
    context.insert(
        "stats",
        &json!({
            "total_adopted": summary.stats.adopted_pets,
            "available_now": summary.stats.available_pets,
            "happy_families": summary.stats.completed_applications,
        }),
    );
    render(&state, "home.html", &context)
}

/// `GET /pets`: filtered, sorted, paginated available pets.
pub async fn pets(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
    RawQuery(raw): RawQuery,
) -> Result<Response, WebError> {
    let pairs = query_pairs(raw.as_deref());
    let query = pet_query(raw.as_deref());
    let page = blocking(|| state.shelter.browse_pets(&query))?;
    let previous_link = page.has_previous().then(|| page_link(&pairs, page.number - 1));
    let next_link = page.has_next().then(|| page_link(&pairs, page.number + 1));
    let page = page.map(|pet| pet_view(&state, pet));

    let mut context = page_context("Adopt a Pet", visitor.account.as_ref(), notice);
    context.insert("query", &query);
    context.insert("filtered", &query.is_filtered());
    context.insert("page", &page);
    context.insert("previous_link", &previous_link);
    context.insert("next_link", &next_link);
    context.insert("pet_types", &pet_type_choices());
    context.insert("sizes", &size_choices());
    render(&state, "pets.html", &context)
}

/// `GET /pet/{id}/{slug}`: one pet in any status plus related pets.
pub async fn pet_detail(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
    Path((id, slug)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "pet", PetId::from_raw)?;
    let detail = blocking(|| state.shelter.pet_detail(id))?;
    if detail.pet.slug != slug {
        return Ok(Redirect::permanent(&detail.pet.absolute_path()).into_response());
    }
    let mut context = page_context(&detail.pet.name, visitor.account.as_ref(), notice);
    context.insert("pet", &pet_view(&state, detail.pet));
    context.insert("related", &pet_views(&state, detail.related));
    context.insert("apply_url", &application_path(Some(id)));
    render(&state, "pet_detail.html", &context)
}

// ============================================================================
// SECTION: Contact
// ============================================================================

/// `GET /contact`: empty contact form.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    render_contact(&state, &visitor, notice, &ContactForm::default(), None)
}

/// `POST /contact`: records a message or re-renders with errors.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    Form(form): Form<ContactForm>,
) -> Result<Response, WebError> {
    let now = state.clock.now();
    match blocking(|| state.shelter.submit_contact(&form, now)) {
        Ok(_) => Ok(Redirect::to(&with_notice("/contact", "message_sent")).into_response()),
        Err(ShelterError::Validation(errors)) => {
            render_contact(&state, &visitor, None, &form, Some(&errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the contact page.
fn render_contact(
    state: &AppState,
    visitor: &Visitor,
    notice: Option<Notice>,
    form: &ContactForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, WebError> {
    let mut context = page_context("Contact Us", visitor.account.as_ref(), notice);
    insert_form(&mut context, form, errors);
    render(state, "contact.html", &context)
}

// ============================================================================
// SECTION: Information Pages
// ============================================================================

/// `GET /about`.
pub async fn about(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    render(&state, "about.html", &page_context("About Us", visitor.account.as_ref(), notice))
}

/// `GET /adoption/process`.
pub async fn adoption_process(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let context = page_context("Adoption Process", visitor.account.as_ref(), notice);
    render(&state, "adoption_process.html", &context)
}

/// `GET /success-stories`: every story plus the featured few.
pub async fn success_stories(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let board = blocking(|| state.shelter.success_stories())?;
    let mut context = page_context("Success Stories", visitor.account.as_ref(), notice);
    context.insert("stories", &board.stories);
    context.insert("featured", &board.featured);
    render(&state, "success_stories.html", &context)
}

/// Fallback for unknown paths.
pub async fn not_found() -> WebError {
    WebError::NotFound("page".to_string())
}
