// pawhaven-web/src/notices.rs
// ============================================================================
// Module: Flash Notices
// Description: Fixed catalog of one-line notices selected by query key.
// Purpose: Carry post-redirect messages without server-side flash storage.
// Dependencies: axum, serde, url
// ============================================================================

//! ## Overview
//! A redirect appends `notice=<key>` to its target; the next page looks the
//! key up in [`NOTICES`] and shows the matching line. Unknown keys are
//! ignored, so the parameter can never inject page text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Serialize;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Confirmation.
    Success,
    /// Rejected action.
    Error,
}

/// A resolved notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Catalog key.
    pub key: &'static str,
    /// Severity.
    pub level: NoticeLevel,
    /// Display text.
    pub text: &'static str,
}

/// Every notice the site can show.
pub const NOTICES: &[Notice] = &[
    Notice {
        key: "message_sent",
        level: NoticeLevel::Success,
        text: "Thank you for contacting us! We will get back to you soon.",
    },
    Notice {
        key: "application_submitted",
        level: NoticeLevel::Success,
        text: "Your application has been submitted successfully! We will review it and contact \
               you soon.",
    },
    Notice { key: "registered", level: NoticeLevel::Success, text: "Welcome to PawHaven!" },
    Notice { key: "logged_in", level: NoticeLevel::Success, text: "You are now signed in." },
    Notice {
        key: "logged_out",
        level: NoticeLevel::Success,
        text: "You have been logged out successfully.",
    },
    Notice {
        key: "profile_updated",
        level: NoticeLevel::Success,
        text: "Your profile has been updated successfully!",
    },
    Notice {
        key: "status_updated",
        level: NoticeLevel::Success,
        text: "Application status updated.",
    },
    Notice { key: "invalid_status", level: NoticeLevel::Error, text: "That status is not valid." },
    Notice { key: "notes_saved", level: NoticeLevel::Success, text: "Notes saved." },
    Notice { key: "pet_created", level: NoticeLevel::Success, text: "Pet added to the listings." },
    Notice { key: "pet_updated", level: NoticeLevel::Success, text: "Pet updated." },
    Notice { key: "message_updated", level: NoticeLevel::Success, text: "Message updated." },
    Notice { key: "story_created", level: NoticeLevel::Success, text: "Success story published." },
];

/// Looks up a notice by key.
#[must_use]
pub fn lookup(key: &str) -> Option<Notice> {
    NOTICES.iter().find(|notice| notice.key == key).copied()
}

/// Appends `notice=<key>` to a site path.
#[must_use]
pub fn with_notice(path: &str, key: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}notice={key}")
}

// ============================================================================
// SECTION: Extractor
// ============================================================================

/// Notice requested by the `notice` query parameter, if it is in the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestNotice(pub Option<Notice>);

impl<S: Send + Sync> FromRequestParts<S> for RequestNotice {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .filter(|(name, _)| name == "notice")
                .last()
                .and_then(|(_, key)| lookup(&key))
        });
        Ok(Self(notice))
    }
}
