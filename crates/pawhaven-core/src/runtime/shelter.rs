// pawhaven-core/src/runtime/shelter.rs
// ============================================================================
// Module: PawHaven Shelter Service
// Description: Shelter operations composed over a record store.
// Purpose: Provide one entry point for every public page and staff action.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`Shelter`] wraps a [`ShelterStore`] with the listing filter, application
//! intake, status synchronizer, contact and story intake, accounts, and
//! sessions. Every mutating call takes `now` from the caller. Raw status
//! strings from requests are parsed here, before any store write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::Account;
use crate::core::AccountId;
use crate::core::AdoptionApplication;
use crate::core::ApplicationForm;
use crate::core::ApplicationId;
use crate::core::ApplicationStatus;
use crate::core::ContactAction;
use crate::core::ContactForm;
use crate::core::ContactMessage;
use crate::core::ContactMessageId;
use crate::core::DEFAULT_NEW_ARRIVAL_DAYS;
use crate::core::DEFAULT_PAGE_SIZE;
use crate::core::NewAccount;
use crate::core::Page;
use crate::core::Pet;
use crate::core::PetForm;
use crate::core::PetId;
use crate::core::PetQuery;
use crate::core::PetStatus;
use crate::core::ProfileForm;
use crate::core::RegistrationForm;
use crate::core::Session;
use crate::core::SessionToken;
use crate::core::StatusChange;
use crate::core::StoryBoard;
use crate::core::StoryForm;
use crate::core::SuccessStory;
use crate::core::Timestamp;
use crate::core::ValidationErrors;
use crate::core::check_password;
use crate::core::check_username;
use crate::core::validation::is_valid_email;
use crate::interfaces::PasswordHasher;
use crate::interfaces::PasswordHasherError;
use crate::interfaces::ShelterStats;
use crate::interfaces::ShelterStore;
use crate::interfaces::StoreError;
use crate::runtime::gate::AdoptionGate;
use crate::runtime::intake::prepare_application;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Featured pets shown on the home page.
const HOME_FEATURED_LIMIT: usize = 3;
/// Related pets shown on a detail page.
const RELATED_PET_LIMIT: usize = 3;
/// Recent applications shown on the account dashboard.
pub const ACCOUNT_RECENT_LIMIT: usize = 3;
/// Default session lifetime: fourteen days.
pub const DEFAULT_SESSION_TTL_MINUTES: u32 = 14 * 24 * 60;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Shelter service errors.
#[derive(Debug, Error)]
pub enum ShelterError {
    /// The record does not exist or is not eligible.
    #[error("shelter record not found: {0}")]
    NotFound(String),
    /// Submitted input failed validation.
    #[error("shelter validation error: {0}")]
    Validation(ValidationErrors),
    /// A status string is not a recognized status.
    #[error("shelter invalid status: {0}")]
    InvalidStatus(String),
    /// The write conflicts with an existing record.
    #[error("shelter conflict: {0}")]
    Conflict(String),
    /// Credentials were rejected.
    #[error("shelter unauthorized: {0}")]
    Unauthorized(String),
    /// Password hashing failed.
    #[error("shelter credential error: {0}")]
    Credentials(#[from] PasswordHasherError),
    /// The store failed.
    #[error("shelter store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ShelterError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Store(other),
        }
    }
}

impl From<ValidationErrors> for ShelterError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

// ============================================================================
// SECTION: Settings and Views
// ============================================================================

/// Tunables for the shelter service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShelterSettings {
    /// Pets per listing page.
    pub page_size: usize,
    /// New-arrival window in days.
    pub new_arrival_days: u32,
    /// Anonymous visitors must sign in before applying.
    pub require_account: bool,
    /// Session lifetime in minutes.
    pub session_ttl_minutes: u32,
}

impl Default for ShelterSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            new_arrival_days: DEFAULT_NEW_ARRIVAL_DAYS,
            require_account: true,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

/// Home page data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeSummary {
    /// Featured available pets.
    pub featured_pets: Vec<Pet>,
    /// Record counts.
    pub stats: ShelterStats,
}

/// Pet detail page data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetDetail {
    /// The pet, in any status.
    pub pet: Pet,
    /// Other available pets of the same type.
    pub related: Vec<Pet>,
}

/// Staff application detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDetail {
    /// The application.
    pub application: AdoptionApplication,
    /// Its pet.
    pub pet: Option<Pet>,
    /// Linked account.
    pub account: Option<Account>,
}

/// Result of `staff create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffOutcome {
    /// A new staff account was created.
    Created,
    /// An existing account was promoted.
    Promoted,
}

// ============================================================================
// SECTION: Shelter Service
// ============================================================================

/// Shelter service over a record store.
#[derive(Debug, Clone)]
pub struct Shelter<S> {
    /// Record store.
    store: S,
    /// Service tunables.
    settings: ShelterSettings,
}

impl<S: ShelterStore> Shelter<S> {
    /// Creates a service over `store`.
    #[must_use]
    pub const fn new(store: S, settings: ShelterSettings) -> Self {
        Self { store, settings }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the service settings.
    #[must_use]
    pub const fn settings(&self) -> &ShelterSettings {
        &self.settings
    }

    /// Returns the adoption gate for the configured policy.
    #[must_use]
    pub const fn gate(&self) -> AdoptionGate {
        AdoptionGate::new(self.settings.require_account)
    }

    // ------------------------------------------------------------------------
    // Public pages
    // ------------------------------------------------------------------------

    /// Returns the home page featured pets and counts.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn home(&self) -> Result<HomeSummary, ShelterError> {
        let featured_pets = self
            .store
            .pets(Some(PetStatus::Available))?
            .into_iter()
            .filter(|pet| pet.featured)
            .take(HOME_FEATURED_LIMIT)
            .collect();
        Ok(HomeSummary { featured_pets, stats: self.store.stats()? })
    }

    /// Returns one page of available pets matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn browse_pets(&self, query: &PetQuery) -> Result<Page<Pet>, ShelterError> {
        let pets = self.store.pets(Some(PetStatus::Available))?;
        Ok(query.apply(pets, self.settings.page_size))
    }

    /// Returns a pet in any status plus related available pets.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::NotFound`] when the pet does not exist.
    pub fn pet_detail(&self, id: PetId) -> Result<PetDetail, ShelterError> {
        let pet = self.store.pet(id)?.ok_or_else(|| ShelterError::NotFound(format!("pet {id}")))?;
        let related = self
            .store
            .pets(Some(PetStatus::Available))?
            .into_iter()
            .filter(|other| other.pet_type == pet.pet_type && other.id != pet.id)
            .take(RELATED_PET_LIMIT)
            .collect();
        Ok(PetDetail { pet, related })
    }

    /// Returns every available pet, for the application form's pet picker.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn available_pets(&self) -> Result<Vec<Pet>, ShelterError> {
        Ok(self.store.pets(Some(PetStatus::Available))?)
    }

    /// Returns the pet when it exists and is available.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::NotFound`] when the pet is missing or not available.
    pub fn adoptable_pet(&self, id: PetId) -> Result<Pet, ShelterError> {
        self.store
            .pet(id)?
            .filter(|pet| pet.status == PetStatus::Available)
            .ok_or_else(|| ShelterError::NotFound(format!("no available pet {id}")))
    }

    /// Returns every success story plus the featured subset.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn success_stories(&self) -> Result<StoryBoard, ShelterError> {
        Ok(StoryBoard::from_stories(self.store.stories()?))
    }

    /// Returns record counts.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn stats(&self) -> Result<ShelterStats, ShelterError> {
        Ok(self.store.stats()?)
    }

    // ------------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------------

    /// Records one pending application for an available pet.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields or a missing
    /// pet choice, and [`ShelterError::NotFound`] when the pet does not exist
    /// or is not available.
    pub fn submit_application(
        &self,
        path_pet: Option<PetId>,
        form: &ApplicationForm,
        account_id: Option<AccountId>,
        now: Timestamp,
    ) -> Result<(AdoptionApplication, Pet), ShelterError> {
        let application = prepare_application(path_pet, form, account_id, now)?;
        let pet = self.adoptable_pet(application.pet_id)?;
        let record = self.store.insert_application(application)?;
        Ok((record, pet))
    }

    /// Records a contact message.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields.
    pub fn submit_contact(
        &self,
        form: &ContactForm,
        now: Timestamp,
    ) -> Result<ContactMessage, ShelterError> {
        let message = form.validate(now)?;
        Ok(self.store.insert_contact_message(message)?)
    }

    // ------------------------------------------------------------------------
    // Staff: applications
    // ------------------------------------------------------------------------

    /// Lists applications; an unrecognized status filter lists all. A
    /// non-blank `search` keeps applications whose applicant name, email, or
    /// pet name contains it.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn applications(
        &self,
        status_filter: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<AdoptionApplication>, ShelterError> {
        let status = status_filter.and_then(|raw| ApplicationStatus::parse(raw.trim()));
        let applications = self.store.applications(status)?;
        let Some(term) = search_term(search) else {
            return Ok(applications);
        };
        let pet_names: HashMap<PetId, String> =
            self.store.pets(None)?.into_iter().map(|pet| (pet.id, pet.name)).collect();
        Ok(applications
            .into_iter()
            .filter(|application| {
                let pet_name = pet_names.get(&application.pet_id).map_or("", String::as_str);
                application.matches_search(term, pet_name)
            })
            .collect())
    }

    /// Returns an application with its pet and account.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::NotFound`] when the application does not exist.
    pub fn application_detail(&self, id: ApplicationId) -> Result<ApplicationDetail, ShelterError> {
        let application = self
            .store
            .application(id)?
            .ok_or_else(|| ShelterError::NotFound(format!("application {id}")))?;
        let pet = self.store.pet(application.pet_id)?;
        let account = match application.account_id {
            Some(account_id) => self.store.account(account_id)?,
            None => None,
        };
        Ok(ApplicationDetail { application, pet, account })
    }

    /// Moves an application to `raw_status` and applies the pet effect.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::InvalidStatus`] before any write when the
    /// status is unrecognized, and [`ShelterError::NotFound`] when the
    /// application does not exist.
    pub fn set_application_status(
        &self,
        id: ApplicationId,
        raw_status: &str,
        now: Timestamp,
    ) -> Result<StatusChange, ShelterError> {
        let status = ApplicationStatus::parse(raw_status.trim())
            .ok_or_else(|| ShelterError::InvalidStatus(raw_status.to_string()))?;
        Ok(self.store.set_application_status(id, status, now)?)
    }

    /// Replaces an application's staff notes.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::NotFound`] when the application does not exist.
    pub fn set_application_notes(
        &self,
        id: ApplicationId,
        notes: &str,
        now: Timestamp,
    ) -> Result<AdoptionApplication, ShelterError> {
        Ok(self.store.set_application_notes(id, notes.trim(), now)?)
    }

    // ------------------------------------------------------------------------
    // Staff: pets, messages, stories
    // ------------------------------------------------------------------------

    /// Lists pets in any status; an unrecognized status filter lists all.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn all_pets(&self, status_filter: Option<&str>) -> Result<Vec<Pet>, ShelterError> {
        let status = status_filter.and_then(|raw| PetStatus::parse(raw.trim()));
        Ok(self.store.pets(status)?)
    }

    /// Creates a pet from the staff form.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields.
    pub fn create_pet(&self, form: &PetForm, now: Timestamp) -> Result<Pet, ShelterError> {
        let pet = form.validate()?;
        Ok(self.store.insert_pet(pet, now)?)
    }

    /// Replaces a pet's fields from the staff form. The slug never changes.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields and
    /// [`ShelterError::NotFound`] when the pet does not exist.
    pub fn update_pet(
        &self,
        id: PetId,
        form: &PetForm,
        now: Timestamp,
    ) -> Result<Pet, ShelterError> {
        let pet = form.validate()?;
        Ok(self.store.update_pet(id, pet, now)?)
    }

    /// Sets a pet's status directly.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::InvalidStatus`] for an unrecognized status and
    /// [`ShelterError::NotFound`] when the pet does not exist.
    pub fn set_pet_status(
        &self,
        id: PetId,
        raw_status: &str,
        now: Timestamp,
    ) -> Result<Pet, ShelterError> {
        let status = PetStatus::parse(raw_status.trim())
            .ok_or_else(|| ShelterError::InvalidStatus(raw_status.to_string()))?;
        Ok(self.store.set_pet_status(id, status, now)?)
    }

    /// Flips a pet's featured flag.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::NotFound`] when the pet does not exist.
    pub fn toggle_pet_featured(&self, id: PetId, now: Timestamp) -> Result<Pet, ShelterError> {
        let pet = self.store.pet(id)?.ok_or_else(|| ShelterError::NotFound(format!("pet {id}")))?;
        Ok(self.store.set_pet_featured(id, !pet.featured, now)?)
    }

    /// Lists contact messages. A non-blank `search` keeps messages whose
    /// sender, subject, or body contains it.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn contact_messages(
        &self,
        unread_only: bool,
        search: Option<&str>,
    ) -> Result<Vec<ContactMessage>, ShelterError> {
        let mut messages = self.store.contact_messages(unread_only)?;
        if let Some(term) = search_term(search) {
            messages.retain(|message| message.matches_search(term));
        }
        Ok(messages)
    }

    /// Applies a triage action to a contact message.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::NotFound`] when the message does not exist.
    pub fn update_contact_message(
        &self,
        id: ContactMessageId,
        action: ContactAction,
    ) -> Result<ContactMessage, ShelterError> {
        Ok(self.store.update_contact_message(id, action)?)
    }

    /// Creates a success story.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields or an unknown
    /// linked pet.
    pub fn create_story(
        &self,
        form: &StoryForm,
        now: Timestamp,
    ) -> Result<SuccessStory, ShelterError> {
        let story = form.validate()?;
        if let Some(pet_id) = story.pet_id
            && self.store.pet(pet_id)?.is_none()
        {
            return Err(ValidationErrors::single("pet_id", "select a valid pet").into());
        }
        Ok(self.store.insert_story(story, now)?)
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    /// Registers a new non-staff account.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields or a taken
    /// username.
    pub fn register(
        &self,
        form: &RegistrationForm,
        hasher: &dyn PasswordHasher,
        now: Timestamp,
    ) -> Result<Account, ShelterError> {
        let registration = form.validate()?;
        if self.store.account_by_username(&registration.username)?.is_some() {
            return Err(username_taken());
        }
        let password_hash = hasher.hash(&registration.password)?;
        let account = NewAccount {
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
            is_staff: false,
            joined_at: now,
        };
        match self.store.insert_account(account) {
            Ok(account) => Ok(account),
            Err(StoreError::Conflict(_)) => Err(username_taken()),
            Err(err) => Err(err.into()),
        }
    }

    /// Verifies a username and password.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Unauthorized`] when the credentials do not match.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        hasher: &dyn PasswordHasher,
    ) -> Result<Account, ShelterError> {
        let rejected = || ShelterError::Unauthorized("invalid username or password".to_string());
        let account = self.store.account_by_username(username.trim())?.ok_or_else(rejected)?;
        if hasher.verify(password, &account.password_hash)? { Ok(account) } else { Err(rejected()) }
    }

    /// Creates a staff account, or promotes and re-keys an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for an invalid username, email,
    /// or password.
    pub fn create_staff(
        &self,
        username: &str,
        email: &str,
        password: &str,
        hasher: &dyn PasswordHasher,
        now: Timestamp,
    ) -> Result<(Account, StaffOutcome), ShelterError> {
        let username = username.trim();
        let email = email.trim();
        let mut errors = ValidationErrors::new();
        if let Err(message) = check_username(username) {
            errors.add("username", message);
        }
        if !is_valid_email(email) {
            errors.add("email", "enter a valid email address");
        }
        if let Err(message) = check_password(password) {
            errors.add("password", message);
        }
        errors.finish(())?;
        let password_hash = hasher.hash(password)?;
        if let Some(existing) = self.store.account_by_username(username)? {
            let account = self.store.promote_to_staff(existing.id, &password_hash)?;
            return Ok((account, StaffOutcome::Promoted));
        }
        let account = self.store.insert_account(NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            is_staff: true,
            joined_at: now,
        })?;
        Ok((account, StaffOutcome::Created))
    }

    /// Updates the signed-in account's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Validation`] for invalid fields.
    pub fn update_profile(
        &self,
        account_id: AccountId,
        form: &ProfileForm,
    ) -> Result<Account, ShelterError> {
        let profile = form.validate()?;
        Ok(self.store.update_account_profile(account_id, &profile)?)
    }

    /// Lists applications linked to the account or sent from its email,
    /// newest first, optionally truncated.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn account_applications(
        &self,
        account: &Account,
        limit: Option<usize>,
    ) -> Result<Vec<AdoptionApplication>, ShelterError> {
        let mut applications = self.store.applications_for_account(account.id, &account.email)?;
        if let Some(limit) = limit {
            applications.truncate(limit);
        }
        Ok(applications)
    }

    // ------------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------------

    /// Starts a session for `account_id` under a caller-generated token.
    /// Expired sessions are purged first.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Conflict`] when the token is already in use.
    pub fn start_session(
        &self,
        account_id: AccountId,
        token: SessionToken,
        now: Timestamp,
    ) -> Result<Session, ShelterError> {
        self.store.purge_expired_sessions(now)?;
        let session = Session {
            token,
            account_id,
            created_at: now,
            expires_at: now.plus_minutes(self.settings.session_ttl_minutes),
        };
        self.store.insert_session(&session)?;
        Ok(session)
    }

    /// Resolves a session token to its account. Expired sessions are deleted
    /// and resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn resolve_session(
        &self,
        token: &SessionToken,
        now: Timestamp,
    ) -> Result<Option<Account>, ShelterError> {
        let Some(session) = self.store.session(token)? else {
            return Ok(None);
        };
        if session.is_expired(now) {
            self.store.delete_session(token)?;
            return Ok(None);
        }
        Ok(self.store.account(session.account_id)?)
    }

    /// Ends a session.
    ///
    /// # Errors
    ///
    /// Returns [`ShelterError::Store`] when the store fails.
    pub fn end_session(&self, token: &SessionToken) -> Result<(), ShelterError> {
        Ok(self.store.delete_session(token)?)
    }
}

/// Validation error for a taken username.
fn username_taken() -> ShelterError {
    ShelterError::Validation(ValidationErrors::single(
        "username",
        "a user with that username already exists",
    ))
}

/// Trims a search parameter, treating blank as absent.
fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|term| !term.is_empty())
}
