// pawhaven-web/src/handlers/accounts.rs
// ============================================================================
// Module: Account Pages
// Description: Registration, login, logout, and the member dashboard.
// Purpose: Manage visitor accounts and their sessions.
// Dependencies: axum, pawhaven-core
// ============================================================================

//! ## Overview
//! Successful registration and login both start a server-side session and
//! set the session cookie before redirecting to the sanitized `next` path.
//! Failed logins show one generic message whether the username or the
//! password was wrong.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Form;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use pawhaven_core::Account;
use pawhaven_core::LoginForm;
use pawhaven_core::ProfileForm;
use pawhaven_core::RegistrationForm;
use pawhaven_core::ShelterError;
use pawhaven_core::ValidationErrors;
use pawhaven_core::runtime::ACCOUNT_RECENT_LIMIT;
use pawhaven_core::runtime::DEFAULT_NEXT;
use pawhaven_core::sanitize_next;

use super::NextParam;
use super::insert_form;
use super::page_context;
use super::pet_index;
use super::render;
use crate::audit::ShelterAuditKind;
use crate::error::WebError;
use crate::notices::Notice;
use crate::notices::RequestNotice;
use crate::notices::with_notice;
use crate::session::Member;
use crate::session::Visitor;
use crate::session::generate_token;
use crate::session::next_link;
use crate::state::AppState;
use crate::state::blocking;
use crate::views::ApplicationView;

/// Message shown for any rejected login.
const LOGIN_ERROR: &str = "Please enter a correct username and password.";

// ============================================================================
// SECTION: Registration
// ============================================================================

/// `GET /register`.
pub async fn register(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
    Query(params): Query<NextParam>,
) -> Result<Response, WebError> {
    if visitor.is_authenticated() {
        return Ok(Redirect::to(DEFAULT_NEXT).into_response());
    }
    let form = RegistrationForm { next: params.next, ..RegistrationForm::default() };
    render_registration(&state, notice, &form, None)
}

/// `POST /register`: creates the account and signs it in.
pub async fn submit_registration(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, WebError> {
    if visitor.is_authenticated() {
        return Ok(Redirect::to(DEFAULT_NEXT).into_response());
    }
    let now = state.clock.now();
    match blocking(|| state.shelter.register(&form, state.hasher.as_ref(), now)) {
        Ok(account) => {
            state.audit(
                ShelterAuditKind::AccountRegistered,
                Some(&account.username),
                Some(format!("account {}", account.id)),
                None,
            );
            sign_in(&state, &account, &sanitize_next(form.next.as_deref()), "registered")
        }
        Err(ShelterError::Validation(errors)) => {
            render_registration(&state, None, &form, Some(&errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the registration form.
fn render_registration(
    state: &AppState,
    notice: Option<Notice>,
    form: &RegistrationForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, WebError> {
    let next = sanitize_next(form.next.as_deref());
    let mut context = page_context("Register", None, notice);
    context.insert("login_url", &next_link("/login", &next));
    context.insert("next", &next);
    insert_form(&mut context, form, errors);
    render(state, "register.html", &context)
}

// ============================================================================
// SECTION: Login and Logout
// ============================================================================

/// `GET /login`.
pub async fn login(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    RequestNotice(notice): RequestNotice,
    Query(params): Query<NextParam>,
) -> Result<Response, WebError> {
    let next = sanitize_next(params.next.as_deref());
    if visitor.is_authenticated() {
        return Ok(Redirect::to(&next).into_response());
    }
    render_login(&state, notice, &next, "", None)
}

/// `POST /login`: verifies credentials and starts a session.
pub async fn submit_login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let next = sanitize_next(form.next.as_deref());
    let username = form.username.trim();
    let hasher = state.hasher.as_ref();
    match blocking(|| state.shelter.authenticate(username, &form.password, hasher)) {
        Ok(account) => {
            state.audit(ShelterAuditKind::LoginSucceeded, Some(&account.username), None, None);
            sign_in(&state, &account, &next, "logged_in")
        }
        Err(ShelterError::Unauthorized(_)) => {
            state.audit(ShelterAuditKind::LoginFailed, None, Some(username.to_string()), None);
            render_login(&state, None, &next, username, Some(LOGIN_ERROR))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the login form.
fn render_login(
    state: &AppState,
    notice: Option<Notice>,
    next: &str,
    username: &str,
    error: Option<&str>,
) -> Result<Response, WebError> {
    let mut context = page_context("Log In", None, notice);
    context.insert("next", next);
    context.insert("username", username);
    context.insert("register_url", &next_link("/register", next));
    if let Some(error) = error {
        context.insert("login_error", error);
    }
    render(state, "login.html", &context)
}

/// `GET /logout`: ends the session and clears the cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
) -> Result<Response, WebError> {
    if let Some(token) = &visitor.token {
        blocking(|| state.shelter.end_session(token))?;
    }
    if let Some(username) = visitor.username() {
        state.audit(ShelterAuditKind::Logout, Some(username), None, None);
    }
    let cookie = state.cookie.clear();
    Ok(([(SET_COOKIE, cookie)], Redirect::to(&with_notice("/", "logged_out"))).into_response())
}

/// Starts a session for `account` and redirects to `target` with a notice.
fn sign_in(
    state: &AppState,
    account: &Account,
    target: &str,
    notice: &str,
) -> Result<Response, WebError> {
    let token = generate_token();
    let now = state.clock.now();
    blocking(|| state.shelter.start_session(account.id, token.clone(), now))?;
    let cookie = state.cookie.set(&token);
    Ok(([(SET_COOKIE, cookie)], Redirect::to(&with_notice(target, notice))).into_response())
}

// ============================================================================
// SECTION: Member Dashboard
// ============================================================================

/// `GET /account`: profile summary and the most recent applications.
pub async fn account(
    State(state): State<Arc<AppState>>,
    Member(account): Member,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let applications =
        blocking(|| state.shelter.account_applications(&account, Some(ACCOUNT_RECENT_LIMIT)))?;
    let pets = pet_index(&state)?;
    let mut context = page_context("My Account", Some(&account), notice);
    context.insert("applications", &ApplicationView::list(applications, &pets));
    render(&state, "account.html", &context)
}

/// `GET /account/applications`: every application tied to the account.
pub async fn account_applications(
    State(state): State<Arc<AppState>>,
    Member(account): Member,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let applications = blocking(|| state.shelter.account_applications(&account, None))?;
    let pets = pet_index(&state)?;
    let mut context = page_context("My Applications", Some(&account), notice);
    context.insert("applications", &ApplicationView::list(applications, &pets));
    render(&state, "account_applications.html", &context)
}

/// `GET /account/edit`.
pub async fn edit_profile(
    State(state): State<Arc<AppState>>,
    Member(account): Member,
    RequestNotice(notice): RequestNotice,
) -> Result<Response, WebError> {
    let form = ProfileForm {
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        email: account.email.clone(),
    };
    render_profile(&state, &account, notice, &form, None)
}

/// `POST /account/edit`.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Member(account): Member,
    Form(form): Form<ProfileForm>,
) -> Result<Response, WebError> {
    match blocking(|| state.shelter.update_profile(account.id, &form)) {
        Ok(_) => Ok(Redirect::to(&with_notice("/account", "profile_updated")).into_response()),
        Err(ShelterError::Validation(errors)) => {
            render_profile(&state, &account, None, &form, Some(&errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// Renders the profile form.
fn render_profile(
    state: &AppState,
    account: &Account,
    notice: Option<Notice>,
    form: &ProfileForm,
    errors: Option<&ValidationErrors>,
) -> Result<Response, WebError> {
    let mut context = page_context("Edit Profile", Some(account), notice);
    insert_form(&mut context, form, errors);
    render(state, "account_edit.html", &context)
}
