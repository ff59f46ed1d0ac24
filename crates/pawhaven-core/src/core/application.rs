// pawhaven-core/src/core/application.rs
// ============================================================================
// Module: PawHaven Adoption Applications
// Description: Application records, review statuses, and the intake form.
// Purpose: Model adoption requests from submission through staff review.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`AdoptionApplication`] is created once per successful form submission
//! with status pending. Staff later move it between any of the four review
//! statuses; moves into or out of completed also change the linked pet.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::PetId;
use crate::core::pet::PetStatus;
use crate::core::time::Timestamp;
use crate::core::validation::MAX_NAME_CHARS;
use crate::core::validation::MAX_PHONE_CHARS;
use crate::core::validation::MAX_TEXT_CHARS;
use crate::core::validation::ValidationErrors;
use crate::core::validation::required_email;
use crate::core::validation::required_text;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum characters in the housing type.
const MAX_HOUSING_TYPE_CHARS: usize = 50;
/// Maximum characters in the own-or-rent answer.
const MAX_OWN_OR_RENT_CHARS: usize = 20;
/// Upper bound on household member counts.
const MAX_HOUSEHOLD_MEMBERS: u32 = 50;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Application review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting staff review.
    Pending,
    /// Approved by staff.
    Approved,
    /// Rejected by staff.
    Rejected,
    /// Adoption completed.
    Completed,
}

impl ApplicationStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Approved, Self::Rejected, Self::Completed];

    /// Returns the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Adoption Completed",
        }
    }

    /// Parses an exact stored value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

// ============================================================================
// SECTION: Application Record
// ============================================================================

/// Stored adoption application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionApplication {
    /// Record identifier.
    pub id: ApplicationId,
    /// Pet applied for.
    pub pet_id: PetId,
    /// Submitting account, when the applicant was signed in.
    pub account_id: Option<AccountId>,
    /// Validated applicant answers.
    #[serde(flatten)]
    pub details: ApplicationDetails,
    /// Review status.
    pub status: ApplicationStatus,
    /// Submission time.
    pub submitted_at: Timestamp,
    /// Time of the last staff status or notes change.
    pub reviewed_at: Option<Timestamp>,
    /// Staff notes.
    pub notes: String,
}

impl AdoptionApplication {
    /// Returns "first last".
    #[must_use]
    pub fn applicant_name(&self) -> String {
        format!("{} {}", self.details.first_name, self.details.last_name)
    }

    /// Case-insensitive match over applicant name, email, and `pet_name`.
    #[must_use]
    pub fn matches_search(&self, term: &str, pet_name: &str) -> bool {
        let needle = term.trim().to_lowercase();
        [
            self.details.first_name.as_str(),
            self.details.last_name.as_str(),
            self.details.email.as_str(),
            pet_name,
        ]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Applicant answers shared by the form, payload, and record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    /// Applicant first name.
    pub first_name: String,
    /// Applicant last name.
    pub last_name: String,
    /// Applicant email.
    pub email: String,
    /// Applicant phone.
    pub phone: String,
    /// Applicant postal address.
    pub address: String,
    /// Housing type such as House or Apartment.
    pub housing_type: String,
    /// Own or rent.
    pub own_or_rent: String,
    /// Landlord approves pets.
    pub landlord_approval: bool,
    /// Adults in the household.
    pub household_adults: u32,
    /// Children in the household.
    pub household_children: u32,
    /// Household has other pets.
    pub has_other_pets: bool,
    /// Description of other pets.
    pub other_pets_description: String,
    /// Prior pet experience.
    pub previous_pet_experience: String,
    /// Reason for adopting.
    pub reason_for_adoption: String,
}

/// Insertable application payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    /// Pet applied for.
    pub pet_id: PetId,
    /// Submitting account, if any.
    pub account_id: Option<AccountId>,
    /// Validated answers.
    pub details: ApplicationDetails,
    /// Submission time.
    pub submitted_at: Timestamp,
}

impl NewApplication {
    /// Builds the pending record once the store has assigned an identifier.
    #[must_use]
    pub fn into_application(self, id: ApplicationId) -> AdoptionApplication {
        AdoptionApplication {
            id,
            pet_id: self.pet_id,
            account_id: self.account_id,
            details: self.details,
            status: ApplicationStatus::Pending,
            submitted_at: self.submitted_at,
            reviewed_at: None,
            notes: String::new(),
        }
    }
}

/// Result of a staff status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Application updated.
    pub application_id: ApplicationId,
    /// Linked pet.
    pub pet_id: PetId,
    /// Status before the write.
    pub previous: ApplicationStatus,
    /// Status after the write.
    pub current: ApplicationStatus,
    /// Pet status written alongside, if the pet changed.
    pub pet_status: Option<PetStatus>,
}

// ============================================================================
// SECTION: Application Form
// ============================================================================

/// Public adoption form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    pub email: String,
    /// Phone.
    pub phone: String,
    /// Address.
    pub address: String,
    /// Pet chosen in the form when the URL names none.
    pub pet_id: Option<String>,
    /// Housing type.
    pub housing_type: String,
    /// Own or rent.
    pub own_or_rent: String,
    /// `yes` when the landlord approves.
    pub landlord_approval: String,
    /// Adult count text.
    pub household_adults: String,
    /// Child count text.
    pub household_children: String,
    /// `yes` when other pets live in the home.
    pub has_other_pets: String,
    /// Other pets description.
    pub other_pets_description: String,
    /// Prior pet experience.
    pub previous_pet_experience: String,
    /// Reason for adopting.
    pub reason_for_adoption: String,
}

impl ApplicationForm {
    /// Validates the applicant answers.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<ApplicationDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let first_name = required_text(&mut errors, "first_name", &self.first_name, MAX_NAME_CHARS);
        let last_name = required_text(&mut errors, "last_name", &self.last_name, MAX_NAME_CHARS);
        let email = required_email(&mut errors, "email", &self.email);
        let phone = required_text(&mut errors, "phone", &self.phone, MAX_PHONE_CHARS);
        let address = required_text(&mut errors, "address", &self.address, MAX_TEXT_CHARS);
        let housing_type =
            required_text(&mut errors, "housing_type", &self.housing_type, MAX_HOUSING_TYPE_CHARS);
        let own_or_rent =
            required_text(&mut errors, "own_or_rent", &self.own_or_rent, MAX_OWN_OR_RENT_CHARS);
        let household_adults =
            parse_count(&mut errors, "household_adults", &self.household_adults, 1, 1);
        let household_children =
            parse_count(&mut errors, "household_children", &self.household_children, 0, 0);
        let previous_pet_experience = required_text(
            &mut errors,
            "previous_pet_experience",
            &self.previous_pet_experience,
            MAX_TEXT_CHARS,
        );
        let reason_for_adoption = required_text(
            &mut errors,
            "reason_for_adoption",
            &self.reason_for_adoption,
            MAX_TEXT_CHARS,
        );
        let other_pets_description = self.other_pets_description.trim().to_string();
        if other_pets_description.chars().count() > MAX_TEXT_CHARS {
            errors.add(
                "other_pets_description",
                format!("must be at most {MAX_TEXT_CHARS} characters"),
            );
        }

        errors.finish(ApplicationDetails {
            first_name,
            last_name,
            email,
            phone,
            address,
            housing_type,
            own_or_rent,
            landlord_approval: is_yes(&self.landlord_approval),
            household_adults,
            household_children,
            has_other_pets: is_yes(&self.has_other_pets),
            other_pets_description,
            previous_pet_experience,
            reason_for_adoption,
        })
    }

    /// Returns the trimmed form-field pet id, if one was supplied.
    #[must_use]
    pub fn form_pet_id(&self) -> Option<&str> {
        self.pet_id.as_deref().map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Returns true for the `yes` answer of a yes/no select.
fn is_yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

/// Parses a household count; blank input takes `default`.
fn parse_count(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &str,
    default: u32,
    min: u32,
) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return default;
    }
    match raw.parse::<u32>() {
        Ok(value) if (min..=MAX_HOUSEHOLD_MEMBERS).contains(&value) => value,
        Ok(_) => {
            errors.add(field, format!("must be between {min} and {MAX_HOUSEHOLD_MEMBERS}"));
            default
        }
        Err(_) => {
            errors.add(field, "enter a whole number");
            default
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
