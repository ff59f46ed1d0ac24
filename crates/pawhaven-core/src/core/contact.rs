// pawhaven-core/src/core/contact.rs
// ============================================================================
// Module: PawHaven Contact Messages
// Description: Contact form submissions and their triage flags.
// Purpose: Capture visitor messages for staff follow-up.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Contact messages are created unread and unresponded. Staff flip the read
//! and responded flags from the dashboard.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ContactMessageId;
use crate::core::time::Timestamp;
use crate::core::validation::MAX_NAME_CHARS;
use crate::core::validation::MAX_PHONE_CHARS;
use crate::core::validation::MAX_TEXT_CHARS;
use crate::core::validation::ValidationErrors;
use crate::core::validation::optional_text;
use crate::core::validation::required_email;
use crate::core::validation::required_text;

/// Maximum characters in a message subject.
const MAX_SUBJECT_CHARS: usize = 200;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Record identifier.
    pub id: ContactMessageId,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Sender phone, if given.
    pub phone: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Staff has read the message.
    pub is_read: bool,
    /// Staff has responded.
    pub is_responded: bool,
    /// Submission time.
    pub created_at: Timestamp,
}

impl ContactMessage {
    /// Case-insensitive match over sender, subject, and body.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        [&self.name, &self.email, &self.subject, &self.message]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Validated contact payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Sender phone.
    pub phone: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Submission time.
    pub created_at: Timestamp,
}

impl NewContactMessage {
    /// Builds the stored record with both flags cleared.
    #[must_use]
    pub fn into_message(self, id: ContactMessageId) -> ContactMessage {
        ContactMessage {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            subject: self.subject,
            message: self.message,
            is_read: false,
            is_responded: false,
            created_at: self.created_at,
        }
    }
}

/// Staff triage action on a contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactAction {
    /// Mark as read.
    MarkRead,
    /// Mark as unread.
    MarkUnread,
    /// Mark as responded (implies read).
    MarkResponded,
}

impl ContactAction {
    /// Parses the dashboard route segment.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(Self::MarkRead),
            "unread" => Some(Self::MarkUnread),
            "responded" => Some(Self::MarkResponded),
            _ => None,
        }
    }

    /// Applies the action to a message's flags.
    pub const fn apply(self, message: &mut ContactMessage) {
        match self {
            Self::MarkRead => message.is_read = true,
            Self::MarkUnread => message.is_read = false,
            Self::MarkResponded => {
                message.is_read = true;
                message.is_responded = true;
            }
        }
    }
}

// ============================================================================
// SECTION: Contact Form
// ============================================================================

/// Public contact form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Sender phone.
    pub phone: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
}

impl ContactForm {
    /// Validates the form into an insertable payload stamped at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self, now: Timestamp) -> Result<NewContactMessage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_CHARS);
        let email = required_email(&mut errors, "email", &self.email);
        let phone = optional_text(&mut errors, "phone", self.phone.as_deref(), MAX_PHONE_CHARS);
        let subject = required_text(&mut errors, "subject", &self.subject, MAX_SUBJECT_CHARS);
        let message = required_text(&mut errors, "message", &self.message, MAX_TEXT_CHARS);
        errors.finish(NewContactMessage { name, email, phone, subject, message, created_at: now })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "Test fixtures use expect for clarity.")]

    use super::*;

    #[test]
    fn responded_implies_read_and_unread_keeps_responded() {
        let form = ContactForm {
            name: "Ari".to_string(),
            email: "ari@example.org".to_string(),
            phone: Some(String::new()),
            subject: "Volunteering".to_string(),
            message: "How can I help?".to_string(),
        };
        let new = form.validate(Timestamp::from_unix_millis(5)).expect("valid");
        assert_eq!(new.phone, None);
        let mut message = new.into_message(ContactMessageId::from_raw(1).expect("non-zero"));
        assert!(!message.is_read && !message.is_responded);
        ContactAction::MarkResponded.apply(&mut message);
        assert!(message.is_read && message.is_responded);
        ContactAction::MarkUnread.apply(&mut message);
        assert!(!message.is_read && message.is_responded);
    }

    #[test]
    fn blank_contact_form_reports_required_fields() {
        let errors = ContactForm::default()
            .validate(Timestamp::from_unix_millis(0))
            .expect_err("invalid");
        for field in ["name", "email", "subject", "message"] {
            assert!(errors.has(field));
        }
        assert!(!errors.has("phone"));
        assert_eq!(ContactAction::parse("archive"), None);
    }

    #[test]
    fn search_covers_sender_subject_and_body() {
        let form = ContactForm {
            name: "Ari Lane".to_string(),
            email: "ari@example.org".to_string(),
            phone: None,
            subject: "Volunteering".to_string(),
            message: "Weekend dog walks?".to_string(),
        };
        let new = form.validate(Timestamp::from_unix_millis(5)).expect("valid");
        let message = new.into_message(ContactMessageId::from_raw(1).expect("non-zero"));
        for term in ["lane", "ARI@", "volunteer", "dog walks"] {
            assert!(message.matches_search(term), "no match for {term}");
        }
        assert!(!message.matches_search("adoption"));
    }
}
