// pawhaven-web/src/handlers/admin.rs
// ============================================================================
// Module: Staff Dashboard
// Description: Application triage, pet management, messages, and stories.
// Purpose: Serve the `/admin-dashboard` pages to staff accounts.
// Dependencies: axum, serde, serde_json, pawhaven-core
// ============================================================================

//! ## Overview
//! Every handler takes [`StaffMember`], so anonymous visitors are sent to
//! login and signed-in non-staff receive 403 before any work happens.
//! Status writes go through the shelter service; an unrecognized status
//! redirects back with an error notice and changes nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use axum::Form;
use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use pawhaven_core::Account;
use pawhaven_core::ApplicationId;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::ContactAction;
use pawhaven_core::ContactMessageId;
use pawhaven_core::PetForm;
use pawhaven_core::PetId;
use pawhaven_core::PetStatus;
use pawhaven_core::ShelterError;
use pawhaven_core::StatusChange;
use pawhaven_core::StoryForm;
use pawhaven_core::ValidationErrors;
use pawhaven_core::core::time::format_date;
use pawhaven_core::core::validation::is_truthy;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use super::StatusParam;
use super::insert_form;
use super::page_context;
use super::parse_id;
use super::pet_index;
use super::pet_view;
use super::pet_views;
use super::render;
use crate::audit::ShelterAuditKind;
use crate::error::WebError;
use crate::notices::Notice;
use crate::notices::RequestNotice;
use crate::notices::with_notice;
use crate::session::StaffMember;
use crate::state::AppState;
use crate::state::blocking;
use crate::views::ApplicationView;
use crate::views::MessageView;
use crate::views::UserView;
use crate::views::application_status_choices;
use crate::views::gender_choices;
use crate::views::pet_options;
use crate::views::pet_status_choices;
use crate::views::pet_type_choices;
use crate::views::size_choices;

/// Rows per dashboard summary list.
const DASHBOARD_RECENT_LIMIT: usize = 5;

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Notes form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotesForm {
    /// Replacement staff notes.
    pub notes: String,
}

/// Application list filter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationFilter {
    /// Raw status value.
    pub status: Option<String>,
    /// Applicant name, email, or pet name fragment.
    pub search: Option<String>,
}

/// Message list filter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageFilter {
    /// Truthy to list unread messages only.
    pub unread: Option<String>,
    /// Sender, subject, or body fragment.
    pub search: Option<String>,
}

// ============================================================================
// SECTION: Overview
// ============================================================================

/// `GET /admin-dashboard`: counts plus recent pending work.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let stats = blocking(|| state.shelter.stats())?;
    let mut pending = blocking(|| state.shelter.applications(Some("pending"), None))?;
    pending.truncate(DASHBOARD_RECENT_LIMIT);
    let mut unread = blocking(|| state.shelter.contact_messages(true, None))?;
    unread.truncate(DASHBOARD_RECENT_LIMIT);
    let pets = pet_index(&state)?;

    let mut context = page_context("Staff Dashboard", Some(&staff), notice);
    context.insert("stats", &stats);
    context.insert("pending_applications", &ApplicationView::list(pending, &pets));
    context.insert(
        "unread_messages",
        &unread.into_iter().map(MessageView::new).collect::<Vec<_>>(),
    );
    render(&state, "admin/dashboard.html", &context)
}

/// `GET /admin-dashboard/stats`: dashboard counts as JSON.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    StaffMember(_staff): StaffMember,
) -> Result<Json<Value>, WebError> {
    let stats = blocking(|| state.shelter.stats())?;
    Ok(Json(json!({
        "pending_applications": stats.pending_applications,
        "available_pets": stats.available_pets,
        "total_adopted": stats.adopted_pets,
        "unread_messages": stats.unread_messages,
    })))
}

// ============================================================================
// SECTION: Applications
// ============================================================================

/// `GET /admin-dashboard/applications?status=&search=`.
pub async fn applications(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Response, WebError> {
    let raw = filter.status.as_deref();
    let search = filter.search.as_deref();
    let applications = blocking(|| state.shelter.applications(raw, search))?;
    let pets = pet_index(&state)?;
    let active = raw.and_then(|raw| ApplicationStatus::parse(raw.trim()));

    let mut context = page_context("Applications", Some(&staff), notice);
    context.insert("applications", &ApplicationView::list(applications, &pets));
    context.insert("status_filter", &active.map(ApplicationStatus::as_str));
    context.insert("search", &search.map(str::trim).unwrap_or_default());
    context.insert("statuses", &application_status_choices());
    render(&state, "admin/applications.html", &context)
}

/// `GET /admin-dashboard/applications/{id}`.
pub async fn application_detail(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "application", ApplicationId::from_raw)?;
    let detail = blocking(|| state.shelter.application_detail(id))?;
    let pets: HashMap<PetId, _> =
        detail.pet.iter().map(|pet| (pet.id, pet.clone())).collect();

    let mut context =
        page_context(&format!("Application #{id}"), Some(&staff), notice);
    context.insert("application", &ApplicationView::new(detail.application, &pets));
    if let Some(pet) = detail.pet {
        context.insert("pet", &pet_view(&state, pet));
    }
    if let Some(account) = detail.account.as_ref() {
        context.insert("account", &UserView::from(account));
    }
    context.insert("statuses", &application_status_choices());
    render(&state, "admin/application_detail.html", &context)
}

/// `POST /admin-dashboard/applications/{id}/status`: moves the application
/// and applies the linked pet effect.
pub async fn update_application_status(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Path(id): Path<String>,
    Form(form): Form<StatusParam>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "application", ApplicationId::from_raw)?;
    let back = format!("/admin-dashboard/applications/{id}");
    let raw = form.status.unwrap_or_default();
    let now = state.clock.now();
    match blocking(|| state.shelter.set_application_status(id, &raw, now)) {
        Ok(change) => {
            state.audit(
                ShelterAuditKind::ApplicationStatusChanged,
                Some(&staff.username),
                Some(format!("application {id}")),
                Some(describe_change(&change)),
            );
            Ok(Redirect::to(&with_notice(&back, "status_updated")).into_response())
        }
        Err(ShelterError::InvalidStatus(_)) => {
            Ok(Redirect::to(&with_notice(&back, "invalid_status")).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /admin-dashboard/applications/{id}/notes`.
pub async fn update_application_notes(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Path(id): Path<String>,
    Form(form): Form<NotesForm>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "application", ApplicationId::from_raw)?;
    let now = state.clock.now();
    blocking(|| state.shelter.set_application_notes(id, &form.notes, now))?;
    state.audit(
        ShelterAuditKind::ApplicationNotesUpdated,
        Some(&staff.username),
        Some(format!("application {id}")),
        None,
    );
    let back = format!("/admin-dashboard/applications/{id}");
    Ok(Redirect::to(&with_notice(&back, "notes_saved")).into_response())
}

/// Summarizes a status write for the audit log.
fn describe_change(change: &StatusChange) -> String {
    let mut detail = format!("{} -> {}", change.previous.as_str(), change.current.as_str());
    if let Some(pet_status) = change.pet_status {
        detail.push_str(&format!("; pet {} {}", change.pet_id, pet_status.as_str()));
    }
    detail
}

// ============================================================================
// SECTION: Pets
// ============================================================================

/// `GET /admin-dashboard/pets?status=`: every pet in any status.
pub async fn pets(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
    Query(filter): Query<StatusParam>,
) -> Result<Response, WebError> {
    let raw = filter.status.as_deref();
    let pets = blocking(|| state.shelter.all_pets(raw))?;
    let active = raw.and_then(|raw| PetStatus::parse(raw.trim()));

    let mut context = page_context("Manage Pets", Some(&staff), notice);
    context.insert("pets", &pet_views(&state, pets));
    context.insert("status_filter", &active.map(PetStatus::as_str));
    context.insert("statuses", &pet_status_choices());
    render(&state, "admin/pets.html", &context)
}

/// `GET /admin-dashboard/pets/new`.
pub async fn new_pet(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let form = PetForm {
        status: Some(PetStatus::Available.as_str().to_string()),
        arrival_date: format_date(state.clock.today()),
        ..PetForm::default()
    };
    render_pet_form(&state, &staff, notice, &form, None, None)
}

/// `POST /admin-dashboard/pets/new`.
pub async fn create_pet(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Form(form): Form<PetForm>,
) -> Result<Response, WebError> {
    let now = state.clock.now();
    match blocking(|| state.shelter.create_pet(&form, now)) {
        Ok(pet) => {
            state.audit(
                ShelterAuditKind::PetCreated,
                Some(&staff.username),
                Some(format!("pet {}", pet.id)),
                Some(pet.slug),
            );
            Ok(Redirect::to(&with_notice("/admin-dashboard/pets", "pet_created")).into_response())
        }
        Err(ShelterError::Validation(errors)) => {
            render_pet_form(&state, &staff, None, &form, Some(&errors), None)
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /admin-dashboard/pets/{id}/edit`: the pet form prefilled.
pub async fn edit_pet(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "pet", PetId::from_raw)?;
    let detail = blocking(|| state.shelter.pet_detail(id))?;
    let form = PetForm::from_pet(&detail.pet);
    render_pet_form(&state, &staff, notice, &form, None, Some(id))
}

/// `POST /admin-dashboard/pets/{id}/edit`: saves the edit; the slug stays.
pub async fn update_pet(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Path(id): Path<String>,
    Form(form): Form<PetForm>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "pet", PetId::from_raw)?;
    let now = state.clock.now();
    match blocking(|| state.shelter.update_pet(id, &form, now)) {
        Ok(pet) => {
            state.audit(
                ShelterAuditKind::PetUpdated,
                Some(&staff.username),
                Some(format!("pet {id}")),
                Some(pet.slug),
            );
            Ok(Redirect::to(&with_notice("/admin-dashboard/pets", "pet_updated")).into_response())
        }
        Err(ShelterError::Validation(errors)) => {
            render_pet_form(&state, &staff, None, &form, Some(&errors), Some(id))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the pet form; `editing` names the pet being edited.
fn render_pet_form(
    state: &AppState,
    staff: &Account,
    notice: Option<Notice>,
    form: &PetForm,
    errors: Option<&ValidationErrors>,
    editing: Option<PetId>,
) -> Result<Response, WebError> {
    let title = if editing.is_some() { "Edit Pet" } else { "Add a Pet" };
    let mut context = page_context(title, Some(staff), notice);
    context.insert("editing_id", &editing.map(PetId::get));
    context.insert("pet_types", &pet_type_choices());
    context.insert("sizes", &size_choices());
    context.insert("genders", &gender_choices());
    context.insert("statuses", &pet_status_choices());
    insert_form(&mut context, form, errors);
    render(state, "admin/pet_form.html", &context)
}

/// `POST /admin-dashboard/pets/{id}/status`: direct status edit. Linked
/// applications are left as they are.
pub async fn update_pet_status(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Path(id): Path<String>,
    Form(form): Form<StatusParam>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "pet", PetId::from_raw)?;
    let raw = form.status.unwrap_or_default();
    let now = state.clock.now();
    match blocking(|| state.shelter.set_pet_status(id, &raw, now)) {
        Ok(pet) => {
            state.audit(
                ShelterAuditKind::PetStatusChanged,
                Some(&staff.username),
                Some(format!("pet {id}")),
                Some(pet.status.as_str().to_string()),
            );
            Ok(Redirect::to(&with_notice("/admin-dashboard/pets", "pet_updated")).into_response())
        }
        Err(ShelterError::InvalidStatus(_)) => {
            Ok(Redirect::to(&with_notice("/admin-dashboard/pets", "invalid_status"))
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `POST /admin-dashboard/pets/{id}/featured`: flips the featured flag.
pub async fn toggle_pet_featured(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "pet", PetId::from_raw)?;
    let now = state.clock.now();
    let pet = blocking(|| state.shelter.toggle_pet_featured(id, now))?;
    state.audit(
        ShelterAuditKind::PetFeaturedToggled,
        Some(&staff.username),
        Some(format!("pet {id}")),
        Some(format!("featured={}", pet.featured)),
    );
    Ok(Redirect::to(&with_notice("/admin-dashboard/pets", "pet_updated")).into_response())
}

// ============================================================================
// SECTION: Messages
// ============================================================================

/// `GET /admin-dashboard/messages?unread=1&search=`.
pub async fn messages(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
    Query(filter): Query<MessageFilter>,
) -> Result<Response, WebError> {
    let unread_only = filter.unread.as_deref().is_some_and(is_truthy);
    let search = filter.search.as_deref();
    let messages = blocking(|| state.shelter.contact_messages(unread_only, search))?;

    let mut context = page_context("Contact Messages", Some(&staff), notice);
    context.insert("unread_only", &unread_only);
    context.insert("search", &search.map(str::trim).unwrap_or_default());
    context.insert(
        "messages",
        &messages.into_iter().map(MessageView::new).collect::<Vec<_>>(),
    );
    render(&state, "admin/messages.html", &context)
}

/// `POST /admin-dashboard/messages/{id}/{read|unread|responded}`.
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Path((id, action)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let id = parse_id(&id, "message", ContactMessageId::from_raw)?;
    let parsed = ContactAction::parse(&action)
        .ok_or_else(|| WebError::NotFound(format!("message action {action}")))?;
    blocking(|| state.shelter.update_contact_message(id, parsed))?;
    state.audit(
        ShelterAuditKind::MessageUpdated,
        Some(&staff.username),
        Some(format!("message {id}")),
        Some(action),
    );
    Ok(Redirect::to(&with_notice("/admin-dashboard/messages", "message_updated")).into_response())
}

// ============================================================================
// SECTION: Stories
// ============================================================================

/// `GET /admin-dashboard/stories/new`.
pub async fn new_story(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let form = StoryForm {
        adoption_date: format_date(state.clock.today()),
        ..StoryForm::default()
    };
    render_story_form(&state, &staff, notice, &form, None)
}

/// `POST /admin-dashboard/stories/new`.
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    StaffMember(staff): StaffMember,
    Form(form): Form<StoryForm>,
) -> Result<Response, WebError> {
    let now = state.clock.now();
    match blocking(|| state.shelter.create_story(&form, now)) {
        Ok(story) => {
            state.audit(
                ShelterAuditKind::StoryCreated,
                Some(&staff.username),
                Some(format!("story {}", story.id)),
                None,
            );
            Ok(Redirect::to(&with_notice("/success-stories", "story_created")).into_response())
        }
        Err(ShelterError::Validation(errors)) => {
            render_story_form(&state, &staff, None, &form, Some(&errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the story form with a picker over every pet.
fn render_story_form(
    state: &AppState,
    staff: &Account,
    notice: Option<Notice>,
    form: &StoryForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, WebError> {
    let pets = blocking(|| state.shelter.all_pets(None))?;
    let mut context = page_context("New Success Story", Some(staff), notice);
    context.insert("pet_options", &pet_options(&pets, form.pet_id.as_deref()));
    insert_form(&mut context, form, errors);
    render(state, "admin/story_form.html", &context)
}
