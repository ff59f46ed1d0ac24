// pawhaven-web/src/views.rs
// ============================================================================
// Module: Page View Models
// Description: Serializable shapes handed to the templates.
// Purpose: Precompute labels, links, badges, and display dates for pages.
// Dependencies: serde, time, pawhaven-core
// ============================================================================

//! ## Overview
//! Templates receive records wrapped in view structs that flatten the
//! record and add the derived display fields, so templates never compute
//! dates or status logic themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;

use pawhaven_core::Account;
use pawhaven_core::AdoptionApplication;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::ContactMessage;
use pawhaven_core::Pet;
use pawhaven_core::PetGender;
use pawhaven_core::PetId;
use pawhaven_core::PetSize;
use pawhaven_core::PetStatus;
use pawhaven_core::PetType;
use pawhaven_core::Timestamp;
use pawhaven_core::ValidationErrors;
use pawhaven_core::core::time::format_date;
use serde::Serialize;
use time::Date;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Pet with display fields.
#[derive(Debug, Clone, Serialize)]
pub struct PetView {
    /// The pet record.
    #[serde(flatten)]
    pub pet: Pet,
    /// Canonical detail path.
    pub url: String,
    /// Species label.
    pub type_label: &'static str,
    /// Status label.
    pub status_label: &'static str,
    /// Card badge text.
    pub badge: Option<&'static str>,
    /// Present images in display order.
    pub images: Vec<String>,
    /// Fee as decimal text.
    pub fee: String,
}

impl PetView {
    /// Wraps a pet, computing its badge for `today`.
    #[must_use]
    pub fn new(pet: Pet, today: Date, new_arrival_days: u32) -> Self {
        Self {
            url: pet.absolute_path(),
            type_label: pet.pet_type.label(),
            status_label: pet.status.label(),
            badge: pet.badge(today, new_arrival_days).map(|badge| badge.label()),
            images: pet.images().into_iter().map(str::to_string).collect(),
            fee: pet.adoption_fee.to_string(),
            pet,
        }
    }
}

/// Application with display fields.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    /// The application record.
    #[serde(flatten)]
    pub application: AdoptionApplication,
    /// "first last".
    pub applicant_name: String,
    /// Status label.
    pub status_label: &'static str,
    /// Submission time text.
    pub submitted: String,
    /// Last review time text.
    pub reviewed: Option<String>,
    /// Pet name when the pet is known.
    pub pet_name: Option<String>,
    /// Pet detail path when the pet is known.
    pub pet_url: Option<String>,
}

impl ApplicationView {
    /// Wraps an application, looking its pet up in `pets`.
    #[must_use]
    pub fn new(application: AdoptionApplication, pets: &HashMap<PetId, Pet>) -> Self {
        let pet = pets.get(&application.pet_id);
        Self {
            applicant_name: application.applicant_name(),
            status_label: application.status.label(),
            submitted: format_timestamp(application.submitted_at),
            reviewed: application.reviewed_at.map(format_timestamp),
            pet_name: pet.map(|pet| pet.name.clone()),
            pet_url: pet.map(Pet::absolute_path),
            application,
        }
    }

    /// Wraps a list of applications.
    #[must_use]
    pub fn list(applications: Vec<AdoptionApplication>, pets: &HashMap<PetId, Pet>) -> Vec<Self> {
        applications.into_iter().map(|application| Self::new(application, pets)).collect()
    }
}

/// Contact message with display fields.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    /// The message record.
    #[serde(flatten)]
    pub message: ContactMessage,
    /// Receipt time text.
    pub received: String,
}

impl MessageView {
    /// Wraps a message.
    #[must_use]
    pub fn new(message: ContactMessage) -> Self {
        Self { received: format_timestamp(message.created_at), message }
    }
}

/// Signed-in account as shown in page chrome.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    /// Username.
    pub username: String,
    /// First name or username.
    pub display_name: String,
    /// Email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Staff flag.
    pub is_staff: bool,
    /// Join date text.
    pub joined: String,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            display_name: account.display_name().to_string(),
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            is_staff: account.is_staff,
            joined: format_timestamp(account.joined_at),
        }
    }
}

// ============================================================================
// SECTION: Choices and Errors
// ============================================================================

/// One option of a select or checkbox group.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Choice {
    /// Submitted value.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// Species options.
#[must_use]
pub fn pet_type_choices() -> Vec<Choice> {
    PetType::ALL.iter().map(|kind| Choice { value: kind.as_str(), label: kind.label() }).collect()
}

/// Size options.
#[must_use]
pub fn size_choices() -> Vec<Choice> {
    PetSize::ALL.iter().map(|size| Choice { value: size.as_str(), label: size.as_str() }).collect()
}

/// Gender options.
#[must_use]
pub fn gender_choices() -> Vec<Choice> {
    PetGender::ALL
        .iter()
        .map(|gender| Choice { value: gender.as_str(), label: gender.as_str() })
        .collect()
}

/// Pet status options.
#[must_use]
pub fn pet_status_choices() -> Vec<Choice> {
    PetStatus::ALL
        .iter()
        .map(|status| Choice { value: status.as_str(), label: status.label() })
        .collect()
}

/// Application status options.
#[must_use]
pub fn application_status_choices() -> Vec<Choice> {
    ApplicationStatus::ALL
        .iter()
        .map(|status| Choice { value: status.as_str(), label: status.label() })
        .collect()
}

/// One pet in a pet picker.
#[derive(Debug, Clone, Serialize)]
pub struct PetOption {
    /// Pet id text.
    pub value: String,
    /// "Name (Breed)".
    pub label: String,
    /// Preselected in the form.
    pub selected: bool,
}

/// Builds picker options, preselecting `selected` when it names a listed pet.
#[must_use]
pub fn pet_options(pets: &[Pet], selected: Option<&str>) -> Vec<PetOption> {
    let selected = selected.map(str::trim);
    pets.iter()
        .map(|pet| {
            let value = pet.id.to_string();
            PetOption {
                selected: selected == Some(value.as_str()),
                label: format!("{} ({})", pet.name, pet.breed),
                value,
            }
        })
        .collect()
}

/// First message per failed field, for inline form errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for error in errors.errors() {
        fields.entry(error.field.clone()).or_insert_with(|| error.message.clone());
    }
    fields
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM` UTC.
#[must_use]
pub fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp.to_datetime().map_or_else(String::new, |moment| {
        format!("{} {:02}:{:02}", format_date(moment.date()), moment.hour(), moment.minute())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_in_utc() {
        let midnight = Timestamp::from_unix_millis(1_717_200_000_000);
        assert_eq!(format_timestamp(midnight), "2024-06-01 00:00");
        let afternoon = Timestamp::from_unix_millis(1_717_245_900_000);
        assert_eq!(format_timestamp(afternoon), "2024-06-01 12:45");
    }

    #[test]
    fn field_errors_keep_the_first_message() {
        let mut errors = ValidationErrors::single("email", "enter a valid email address");
        errors.add("email", "second");
        errors.add("phone", "this field is required");
        let fields = field_errors(&errors);
        assert_eq!(fields["email"], "enter a valid email address");
        assert_eq!(fields.len(), 2);
    }
}
