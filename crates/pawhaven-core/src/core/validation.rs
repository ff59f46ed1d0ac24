// pawhaven-core/src/core/validation.rs
// ============================================================================
// Module: PawHaven Form Validation
// Description: Field-level validation errors and shared input helpers.
// Purpose: Validate typed form structs before any record is built.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every submitted form is deserialized into a typed struct whose fields are
//! raw strings, then validated into a record payload. Failures accumulate in
//! [`ValidationErrors`] so the page can report every offending field at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum characters in a person or pet name.
pub const MAX_NAME_CHARS: usize = 100;
/// Maximum characters in an email address.
pub const MAX_EMAIL_CHARS: usize = 254;
/// Maximum characters in a phone number.
pub const MAX_PHONE_CHARS: usize = 20;
/// Maximum characters in free-form long text.
pub const MAX_TEXT_CHARS: usize = 10_000;
/// Maximum characters in an image path or URL.
pub const MAX_IMAGE_CHARS: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name.
    pub field: String,
    /// Human-readable failure message.
    pub message: String,
}

/// Accumulated field failures for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    /// Failures in field order.
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Creates an error set holding a single failure.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a failure for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.to_string(), message: message.into() });
    }

    /// Returns true when no failures were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true when `field` has at least one failure.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Returns the recorded failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns `value` when no failures were recorded, else the failures.
    ///
    /// # Errors
    ///
    /// Returns `self` when any failure was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.errors.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Trims a required text field, recording blank or overlong values.
pub fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max_chars: usize,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "this field is required");
    } else if trimmed.chars().count() > max_chars {
        errors.add(field, format!("must be at most {max_chars} characters"));
    }
    trimmed.to_string()
}

/// Trims an optional text field; blank input becomes `None`.
pub fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|value| !value.is_empty())?;
    if trimmed.chars().count() > max_chars {
        errors.add(field, format!("must be at most {max_chars} characters"));
    }
    Some(trimmed.to_string())
}

/// Validates a required email address.
pub fn required_email(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "this field is required");
    } else if trimmed.chars().count() > MAX_EMAIL_CHARS {
        errors.add(field, format!("must be at most {MAX_EMAIL_CHARS} characters"));
    } else if !is_valid_email(trimmed) {
        errors.add(field, "enter a valid email address");
    }
    trimmed.to_string()
}

/// Returns true when `value` has exactly one `@` with non-empty local and
/// domain parts and no whitespace.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

/// Parses an HTML flag value: any non-empty value other than `0`, `false`,
/// `off`, or `no` is truthy.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !["0", "false", "off", "no"].iter().any(|falsy| value.eq_ignore_ascii_case(falsy))
}

// ============================================================================
// SECTION: Serde Helpers
// ============================================================================

/// Raw flag input accepted from HTML forms and JSON imports.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagInput {
    /// JSON boolean.
    Bool(bool),
    /// Form checkbox or select value.
    Text(String),
}

/// Deserializes a checkbox-style flag from a boolean or string value.
///
/// # Errors
///
/// Returns a deserializer error when the value is neither a bool nor a string.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagInput::deserialize(deserializer)? {
        FlagInput::Bool(value) => value,
        FlagInput::Text(value) => is_truthy(&value),
    })
}

/// Raw list input accepted from HTML forms and JSON imports.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListInput {
    /// JSON array of strings.
    List(Vec<String>),
    /// Comma-separated form text.
    Text(String),
}

/// Deserializes a string list from an array or a comma-separated string.
///
/// # Errors
///
/// Returns a deserializer error when the value is neither a list nor a string.
pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match ListInput::deserialize(deserializer)? {
        ListInput::List(items) => items,
        ListInput::Text(text) => text.split(',').map(str::to_string).collect(),
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
