// pawhaven-core/src/interfaces/mod.rs
// ============================================================================
// Module: PawHaven Interfaces
// Description: Backend-agnostic storage and credential interfaces.
// Purpose: Define the contracts hosts implement to persist shelter records.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`ShelterStore`] is the record store seam: every page and dashboard action
//! goes through it. Implementations must make each call atomic; in
//! particular [`ShelterStore::set_application_status`] writes the application
//! and its pet together or not at all. [`PasswordHasher`] keeps the core free
//! of hashing crates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::Account;
use crate::core::AccountId;
use crate::core::AdoptionApplication;
use crate::core::ApplicationId;
use crate::core::ApplicationStatus;
use crate::core::ContactAction;
use crate::core::ContactMessage;
use crate::core::ContactMessageId;
use crate::core::NewAccount;
use crate::core::NewApplication;
use crate::core::NewContactMessage;
use crate::core::NewPet;
use crate::core::NewStory;
use crate::core::Pet;
use crate::core::PetId;
use crate::core::PetStatus;
use crate::core::ProfileUpdate;
use crate::core::Session;
use crate::core::SessionToken;
use crate::core::StatusChange;
use crate::core::SuccessStory;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Shelter store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("shelter store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or fails integrity checks.
    #[error("shelter store corruption: {0}")]
    Corrupt(String),
    /// Stored schema version is incompatible.
    #[error("shelter store version mismatch: {0}")]
    VersionMismatch(String),
    /// Input cannot be stored.
    #[error("shelter store invalid data: {0}")]
    Invalid(String),
    /// Referenced record does not exist.
    #[error("shelter store record not found: {0}")]
    NotFound(String),
    /// Write conflicts with an existing record.
    #[error("shelter store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("shelter store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Aggregates
// ============================================================================

/// Record counts for the home page and staff dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShelterStats {
    /// Pets with status available.
    pub available_pets: u64,
    /// Pets with status adopted.
    pub adopted_pets: u64,
    /// Applications awaiting review.
    pub pending_applications: u64,
    /// Applications marked completed.
    pub completed_applications: u64,
    /// Contact messages not yet read.
    pub unread_messages: u64,
}

// ============================================================================
// SECTION: Shelter Store
// ============================================================================

/// Record store for every shelter entity.
///
/// List methods return records in their default order: pets by arrival date
/// descending then name; applications by submission time descending; contact
/// messages by creation time descending; stories by adoption date descending.
pub trait ShelterStore: Send + Sync {
    /// Inserts a pet, assigning an id and a unique slug derived from
    /// [`NewPet::slug_base`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn insert_pet(&self, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError>;

    /// Replaces a pet's editable fields. The id, slug and `created_at` are
    /// kept; `slug_base` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the pet does not exist.
    fn update_pet(&self, id: PetId, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError>;

    /// Loads a pet by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn pet(&self, id: PetId) -> Result<Option<Pet>, StoreError>;

    /// Lists pets, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn pets(&self, status: Option<PetStatus>) -> Result<Vec<Pet>, StoreError>;

    /// Sets a pet's status directly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the pet does not exist.
    fn set_pet_status(
        &self,
        id: PetId,
        status: PetStatus,
        now: Timestamp,
    ) -> Result<Pet, StoreError>;

    /// Sets a pet's featured flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the pet does not exist.
    fn set_pet_featured(&self, id: PetId, featured: bool, now: Timestamp)
    -> Result<Pet, StoreError>;

    /// Inserts a pending application.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the pet or account does not exist.
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<AdoptionApplication, StoreError>;

    /// Loads an application by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn application(&self, id: ApplicationId) -> Result<Option<AdoptionApplication>, StoreError>;

    /// Lists applications, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<AdoptionApplication>, StoreError>;

    /// Lists applications linked to `account_id` or submitted with `email`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn applications_for_account(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> Result<Vec<AdoptionApplication>, StoreError>;

    /// Writes an application's status and applies the pet effect from
    /// [`crate::runtime::pet_status_effect`] atomically. Stamps `reviewed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the application does not exist;
    /// on any error neither record changes.
    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: Timestamp,
    ) -> Result<StatusChange, StoreError>;

    /// Replaces an application's staff notes. Stamps `reviewed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the application does not exist.
    fn set_application_notes(
        &self,
        id: ApplicationId,
        notes: &str,
        now: Timestamp,
    ) -> Result<AdoptionApplication, StoreError>;

    /// Inserts a contact message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StoreError>;

    /// Lists contact messages, optionally only unread ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn contact_messages(&self, unread_only: bool) -> Result<Vec<ContactMessage>, StoreError>;

    /// Applies a triage action to a contact message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the message does not exist.
    fn update_contact_message(
        &self,
        id: ContactMessageId,
        action: ContactAction,
    ) -> Result<ContactMessage, StoreError>;

    /// Inserts a success story.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the linked pet does not exist.
    fn insert_story(&self, story: NewStory, now: Timestamp) -> Result<SuccessStory, StoreError>;

    /// Lists every success story.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn stories(&self) -> Result<Vec<SuccessStory>, StoreError>;

    /// Inserts an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the username is taken.
    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Loads an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Loads an account by exact username.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Updates an account's profile fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the account does not exist.
    fn update_account_profile(
        &self,
        id: AccountId,
        profile: &ProfileUpdate,
    ) -> Result<Account, StoreError>;

    /// Grants staff access and replaces the password hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the account does not exist.
    fn promote_to_staff(&self, id: AccountId, password_hash: &str)
    -> Result<Account, StoreError>;

    /// Persists a session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the token already exists.
    fn insert_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Loads a session by token, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn session(&self, token: &SessionToken) -> Result<Option<Session>, StoreError>;

    /// Deletes a session; deleting a missing session succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn delete_session(&self, token: &SessionToken) -> Result<(), StoreError>;

    /// Deletes sessions expired at `now`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn purge_expired_sessions(&self, now: Timestamp) -> Result<u64, StoreError>;

    /// Returns record counts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn stats(&self) -> Result<ShelterStats, StoreError>;
}

// ============================================================================
// SECTION: Password Hashing
// ============================================================================

/// Password hashing errors.
#[derive(Debug, Error)]
pub enum PasswordHasherError {
    /// Hashing failed.
    #[error("password hashing error: {0}")]
    Hash(String),
    /// The stored hash could not be parsed.
    #[error("password hash is malformed: {0}")]
    Malformed(String),
}

/// Password hashing backend.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plain-text password into a self-describing encoded string.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError`] when hashing fails.
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError>;

    /// Returns true when `password` matches `encoded`.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError::Malformed`] when `encoded` is unreadable.
    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHasherError>;
}
