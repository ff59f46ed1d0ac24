// pawhaven-web/src/session.rs
// ============================================================================
// Module: Session Cookies
// Description: Session token cookies and visitor extractors.
// Purpose: Resolve the signed-in account for each request.
// Dependencies: axum, base64, rand, url, pawhaven-core
// ============================================================================

//! ## Overview
//! Sessions are server-side records keyed by a random 32-byte token carried
//! in an `HttpOnly; SameSite=Lax` cookie. [`Visitor`] resolves the cookie on
//! every request. [`Member`] and [`StaffMember`] gate account and dashboard
//! routes: anonymous visitors are sent to the login page with a `next`
//! parameter, and signed-in non-staff receive 403 on staff routes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::extract::OriginalUri;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pawhaven_core::Account;
use pawhaven_core::SessionToken;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::WebError;
use crate::state::AppState;
use crate::state::blocking;

// ============================================================================
// SECTION: Tokens and Cookies
// ============================================================================

/// Random bytes per session token.
const TOKEN_BYTES: usize = 32;
/// Seconds per minute.
const SECONDS_PER_MINUTE: u64 = 60;

/// Generates a fresh session token (base64url, no padding).
#[must_use]
pub fn generate_token() -> SessionToken {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    SessionToken::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Session cookie policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name.
    name: String,
    /// Adds the `Secure` attribute.
    secure: bool,
    /// Cookie lifetime in seconds.
    max_age_secs: u64,
}

impl SessionCookie {
    /// Creates a cookie policy.
    #[must_use]
    pub fn new(name: &str, secure: bool, ttl_minutes: u32) -> Self {
        Self {
            name: name.to_string(),
            secure,
            max_age_secs: u64::from(ttl_minutes) * SECONDS_PER_MINUTE,
        }
    }

    /// Returns the cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the session token from the request cookies.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionToken> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.name && !value.is_empty())
            .map(|(_, value)| SessionToken::new(value))
    }

    /// Returns the `Set-Cookie` value that stores `token`.
    #[must_use]
    pub fn set(&self, token: &SessionToken) -> String {
        self.render(token.as_str(), self.max_age_secs)
    }

    /// Returns the `Set-Cookie` value that removes the session cookie.
    #[must_use]
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    /// Formats the cookie with its attributes.
    fn render(&self, value: &str, max_age_secs: u64) -> String {
        let mut cookie = format!(
            "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
            self.name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Returns `path` with an encoded `next` parameter.
#[must_use]
pub fn next_link(path: &str, next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{path}?next={encoded}")
}

/// Returns the login path that returns to `next` afterwards.
#[must_use]
pub fn login_redirect_path(next: &str) -> String {
    next_link("/login", next)
}

// ============================================================================
// SECTION: Extractors
// ============================================================================

/// The requesting visitor, signed in or not.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    /// Signed-in account.
    pub account: Option<Account>,
    /// Session token presented by the client, valid or not.
    pub token: Option<SessionToken>,
}

impl Visitor {
    /// Returns true when an account is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// Returns the signed-in username.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.account.as_ref().map(|account| account.username.as_str())
    }
}

impl FromRequestParts<Arc<AppState>> for Visitor {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = state.cookie.read(&parts.headers) else {
            return Ok(Self::default());
        };
        let now = state.clock.now();
        let account = blocking(|| state.shelter.resolve_session(&token, now))?;
        Ok(Self { account, token: Some(token) })
    }
}

/// A signed-in account; anonymous visitors are redirected to login.
#[derive(Debug, Clone)]
pub struct Member(pub Account);

impl FromRequestParts<Arc<AppState>> for Member {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let visitor =
            Visitor::from_request_parts(parts, state).await.map_err(IntoResponse::into_response)?;
        visitor.account.map(Self).ok_or_else(|| login_redirect(parts))
    }
}

/// A signed-in staff account.
#[derive(Debug, Clone)]
pub struct StaffMember(pub Account);

impl FromRequestParts<Arc<AppState>> for StaffMember {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Member(account) = Member::from_request_parts(parts, state).await?;
        if account.is_staff {
            Ok(Self(account))
        } else {
            Err(WebError::Forbidden.into_response())
        }
    }
}

/// Redirects to login, returning to the requested path afterwards. Nested
/// routers strip their prefix from `parts.uri`, so the original URI wins.
fn login_redirect(parts: &Parts) -> Response {
    let uri = parts.extensions.get::<OriginalUri>().map_or(&parts.uri, |original| &original.0);
    let next = uri.path_and_query().map_or("/", |value| value.as_str());
    Redirect::to(&login_redirect_path(next)).into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn cookie_attributes_follow_policy() {
        let cookie = SessionCookie::new("pawhaven_session", false, 60);
        let token = SessionToken::new("abc");
        assert_eq!(
            cookie.set(&token),
            "pawhaven_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        let secure = SessionCookie::new("pawhaven_session", true, 60);
        assert!(secure.set(&token).ends_with("; Secure"));
        assert!(secure.clear().contains("Max-Age=0"));
    }

    #[test]
    fn reads_the_named_cookie_only() {
        let cookie = SessionCookie::new("pawhaven_session", false, 60);
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; pawhaven_session=tok-1; other=x"),
        );
        assert_eq!(cookie.read(&headers).unwrap().as_str(), "tok-1");
        headers.insert(COOKIE, HeaderValue::from_static("pawhaven_session="));
        assert!(cookie.read(&headers).is_none());
    }

    #[test]
    fn tokens_are_long_and_distinct() {
        let first = generate_token();
        assert_eq!(first.as_str().len(), 43);
        assert_ne!(first, generate_token());
    }

    #[test]
    fn login_redirect_encodes_next() {
        assert_eq!(
            login_redirect_path("/admin-dashboard/pets?status=adopted"),
            "/login?next=%2Fadmin-dashboard%2Fpets%3Fstatus%3Dadopted"
        );
    }
}
