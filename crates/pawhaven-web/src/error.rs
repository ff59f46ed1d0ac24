// pawhaven-web/src/error.rs
// ============================================================================
// Module: Web Errors
// Description: Handler error type and its HTTP responses.
// Purpose: Map shelter failures to status pages without leaking details.
// Dependencies: axum, thiserror, tracing, pawhaven-core
// ============================================================================

//! ## Overview
//! Handlers return [`WebError`] for failures they do not render themselves.
//! Form validation is handled in place by re-rendering the form; what
//! reaches this type becomes a small standalone status page. Internal
//! errors are logged with `tracing` and shown only as a generic message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use pawhaven_core::ShelterError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Handler errors.
#[derive(Debug, Error)]
pub enum WebError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request was understood but malformed.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The account may not use this page.
    #[error("forbidden")]
    Forbidden,
    /// Anything else; details are logged, not shown.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ShelterError> for WebError {
    fn from(error: ShelterError) -> Self {
        match error {
            ShelterError::NotFound(message) => Self::NotFound(message),
            ShelterError::Validation(errors) => Self::BadRequest(errors.to_string()),
            ShelterError::InvalidStatus(status) => {
                Self::BadRequest(format!("invalid status {status}"))
            }
            ShelterError::Unauthorized(_) => Self::Forbidden,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<tera::Error> for WebError {
    fn from(error: tera::Error) -> Self {
        Self::Internal(format!("template error: {error}"))
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title, body) = match &self {
            Self::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "Page not found",
                "The page you were looking for isn't here. It may have found a new home.",
            ),
            Self::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                "Bad request",
                "We couldn't understand that request.",
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Staff only",
                "This area is for PawHaven staff. Sign in with a staff account to continue.",
            ),
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "We hit a problem handling your request. Please try again shortly.",
                )
            }
        };
        (status, Html(status_page(title, body))).into_response()
    }
}

/// Renders a self-contained status page.
fn status_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title} | \
         PawHaven</title></head><body><main class=\"status-page\"><h1>{title}</h1><p>{body}</p>\
         <p><a href=\"/\">Back to PawHaven</a></p></main></body></html>"
    )
}
