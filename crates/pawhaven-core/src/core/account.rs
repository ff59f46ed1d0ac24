// pawhaven-core/src/core/account.rs
// ============================================================================
// Module: PawHaven Accounts
// Description: Site accounts, sessions, and the registration/profile forms.
// Purpose: Identify adopters and staff across requests.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Accounts are created by registration or the `staff create` command. The
//! stored password hash is opaque to the core; hashing is delegated to a
//! [`crate::interfaces::PasswordHasher`]. Sessions bind an opaque token to an
//! account until their expiry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::SessionToken;
use crate::core::time::Timestamp;
use crate::core::validation::MAX_NAME_CHARS;
use crate::core::validation::ValidationErrors;
use crate::core::validation::optional_text;
use crate::core::validation::required_email;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Minimum username length.
const MIN_USERNAME_CHARS: usize = 3;
/// Maximum username length.
const MAX_USERNAME_CHARS: usize = 150;
/// Minimum password length.
pub const MIN_PASSWORD_CHARS: usize = 8;
/// Maximum password length accepted for hashing.
const MAX_PASSWORD_CHARS: usize = 1024;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Site account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Record identifier.
    pub id: AccountId,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Encoded password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// May enter the staff dashboard.
    pub is_staff: bool,
    /// Registration time.
    pub joined_at: Timestamp,
}

impl Account {
    /// Returns the first name when set, else the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() { &self.username } else { &self.first_name }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("is_staff", &self.is_staff)
            .finish_non_exhaustive()
    }
}

/// Insertable account payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Encoded password hash.
    pub password_hash: String,
    /// Staff flag.
    pub is_staff: bool,
    /// Registration time.
    pub joined_at: Timestamp,
}

impl NewAccount {
    /// Builds the stored record once the store has assigned an identifier.
    #[must_use]
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            is_staff: self.is_staff,
            joined_at: self.joined_at,
        }
    }
}

/// Server-side session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Cookie token.
    pub token: SessionToken,
    /// Signed-in account.
    pub account_id: AccountId,
    /// Creation time.
    pub created_at: Timestamp,
    /// Expiry time (exclusive).
    pub expires_at: Timestamp,
}

impl Session {
    /// Returns true once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

// ============================================================================
// SECTION: Forms
// ============================================================================

/// Registration form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Password.
    #[serde(skip_serializing)]
    pub password1: String,
    /// Password confirmation.
    #[serde(skip_serializing)]
    pub password2: String,
    /// Post-registration destination.
    pub next: Option<String>,
}

/// Validated registration, with the password still in plain text.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Plain-text password, hashed by the service.
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").field("username", &self.username).finish_non_exhaustive()
    }
}

impl RegistrationForm {
    /// Validates the registration fields. Username uniqueness is checked by
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = self.username.trim().to_string();
        if let Err(message) = check_username(&username) {
            errors.add("username", message);
        }
        let email = required_email(&mut errors, "email", &self.email);
        let first_name =
            optional_text(&mut errors, "first_name", self.first_name.as_deref(), MAX_NAME_CHARS)
                .unwrap_or_default();
        let last_name =
            optional_text(&mut errors, "last_name", self.last_name.as_deref(), MAX_NAME_CHARS)
                .unwrap_or_default();
        if let Err(message) = check_password(&self.password1) {
            errors.add("password1", message);
        }
        if self.password1 != self.password2 {
            errors.add("password2", "the two password fields didn't match");
        }
        errors.finish(Registration {
            username,
            email,
            first_name,
            last_name,
            password: self.password1.clone(),
        })
    }
}

/// Login form as submitted.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
    /// Post-login destination.
    pub next: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm").field("username", &self.username).finish_non_exhaustive()
    }
}

/// Profile edit form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
}

/// Validated profile update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
}

impl ProfileForm {
    /// Validates the profile fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let first_name =
            optional_text(&mut errors, "first_name", Some(&self.first_name), MAX_NAME_CHARS)
                .unwrap_or_default();
        let last_name =
            optional_text(&mut errors, "last_name", Some(&self.last_name), MAX_NAME_CHARS)
                .unwrap_or_default();
        let email = required_email(&mut errors, "email", &self.email);
        errors.finish(ProfileUpdate { first_name, last_name, email })
    }
}

// ============================================================================
// SECTION: Credential Rules
// ============================================================================

/// Checks the username length and character set.
///
/// # Errors
///
/// Returns a message describing the first failed rule.
pub fn check_username(username: &str) -> Result<(), &'static str> {
    let length = username.chars().count();
    if length < MIN_USERNAME_CHARS {
        return Err("username must be at least 3 characters");
    }
    if length > MAX_USERNAME_CHARS {
        return Err("username must be at most 150 characters");
    }
    if !username.chars().all(|ch| ch.is_ascii_alphanumeric() || "@.+_-".contains(ch)) {
        return Err("username may contain only letters, digits, and @ . + - _");
    }
    Ok(())
}

/// Checks the password strength rules.
///
/// # Errors
///
/// Returns a message describing the first failed rule.
pub fn check_password(password: &str) -> Result<(), &'static str> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_CHARS {
        return Err("password must contain at least 8 characters");
    }
    if length > MAX_PASSWORD_CHARS {
        return Err("password is too long");
    }
    if password.chars().all(|ch| ch.is_ascii_digit()) {
        return Err("password can't be entirely numeric");
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "Test fixtures use expect for clarity.")]

    use super::*;

    fn registration() -> RegistrationForm {
        RegistrationForm {
            username: "jamie.k".to_string(),
            email: "jamie@example.org".to_string(),
            first_name: Some("Jamie".to_string()),
            last_name: None,
            password1: "tail-wag-2024".to_string(),
            password2: "tail-wag-2024".to_string(),
            next: None,
        }
    }

    #[test]
    fn username_rules() {
        assert!(check_username("ab").is_err());
        assert!(check_username("a.b+c@d_e-f").is_ok());
        assert!(check_username("has space").is_err());
        assert!(check_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(check_password("short1").is_err());
        assert!(check_password("12345678").is_err());
        assert!(check_password("good-password").is_ok());
    }

    #[test]
    fn registration_checks_confirmation() {
        let valid = registration().validate().expect("valid registration");
        assert_eq!(valid.first_name, "Jamie");
        assert_eq!(valid.last_name, "");

        let mut form = registration();
        form.password2 = "different-pass".to_string();
        let errors = form.validate().expect_err("mismatch");
        assert!(errors.has("password2"));
        assert!(!errors.has("password1"));
    }

    #[test]
    fn session_expiry_is_exclusive() {
        let session = Session {
            token: SessionToken::new("t"),
            account_id: AccountId::from_raw(1).expect("non-zero"),
            created_at: Timestamp::from_unix_millis(0),
            expires_at: Timestamp::from_unix_millis(100),
        };
        assert!(!session.is_expired(Timestamp::from_unix_millis(99)));
        assert!(session.is_expired(Timestamp::from_unix_millis(100)));
    }

    #[test]
    fn profile_requires_email() {
        let errors = ProfileForm::default().validate().expect_err("blank email");
        assert!(errors.has("email"));
        assert_eq!(errors.errors().len(), 1);
    }
}
