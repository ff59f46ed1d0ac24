// pawhaven-core/src/runtime/store.rs
// ============================================================================
// Module: PawHaven In-Memory Store
// Description: Mutex-guarded in-memory shelter store and a shared wrapper.
// Purpose: Provide a deterministic store for tests and the `memory` backend.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryShelterStore`] keeps every table behind one mutex, so each call
//! is atomic, including the two-record status write. Contents are lost when
//! the process exits. [`SharedShelterStore`] wraps any store in a clonable
//! `Arc` trait object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

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
use crate::core::PetSort;
use crate::core::PetStatus;
use crate::core::ProfileUpdate;
use crate::core::Session;
use crate::core::SessionToken;
use crate::core::StatusChange;
use crate::core::StoryId;
use crate::core::SuccessStory;
use crate::core::Timestamp;
use crate::core::unique_slug;
use crate::interfaces::ShelterStats;
use crate::interfaces::ShelterStore;
use crate::interfaces::StoreError;
use crate::runtime::status::pet_status_effect;

// ============================================================================
// SECTION: Tables
// ============================================================================

/// All in-memory tables plus id counters.
#[derive(Debug, Default)]
struct Tables {
    /// Pets keyed by id.
    pets: BTreeMap<PetId, Pet>,
    /// Applications keyed by id.
    applications: BTreeMap<ApplicationId, AdoptionApplication>,
    /// Contact messages keyed by id.
    messages: BTreeMap<ContactMessageId, ContactMessage>,
    /// Stories keyed by id.
    stories: BTreeMap<StoryId, SuccessStory>,
    /// Accounts keyed by id.
    accounts: BTreeMap<AccountId, Account>,
    /// Sessions keyed by token.
    sessions: HashMap<SessionToken, Session>,
    /// Last assigned id per table, in [`Table`] order.
    sequences: [u64; 5],
}

/// Tables with their own id sequence.
#[derive(Debug, Clone, Copy)]
enum Table {
    /// Pets.
    Pets = 0,
    /// Applications.
    Applications = 1,
    /// Contact messages.
    Messages = 2,
    /// Stories.
    Stories = 3,
    /// Accounts.
    Accounts = 4,
}

impl Tables {
    /// Returns the next id for `table`; ids start at 1 and are never reused.
    const fn next_id(&mut self, table: Table) -> u64 {
        let slot = &mut self.sequences[table as usize];
        *slot += 1;
        *slot
    }
}

/// Builds the error for an id counter that produced zero.
fn zero_id() -> StoreError {
    StoreError::Corrupt("in-memory id counter produced zero".to_string())
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory shelter store for tests and ephemeral deployments.
#[derive(Debug, Default, Clone)]
pub struct InMemoryShelterStore {
    /// Tables protected by a single mutex.
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryShelterStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the tables.
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Store("shelter store mutex poisoned".to_string()))
    }
}

impl ShelterStore for InMemoryShelterStore {
    fn insert_pet(&self, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError> {
        let mut tables = self.lock()?;
        let slug = unique_slug(&pet.slug_base, |candidate| {
            tables.pets.values().any(|existing| existing.slug == candidate)
        });
        let id = PetId::from_raw(tables.next_id(Table::Pets)).ok_or_else(zero_id)?;
        let record = pet.into_pet(id, slug, now);
        tables.pets.insert(id, record.clone());
        drop(tables);
        Ok(record)
    }

    fn update_pet(&self, id: PetId, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError> {
        let mut tables = self.lock()?;
        let existing = tables
            .pets
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("pet {id}")))?;
        *existing = pet.into_update(existing, now);
        Ok(existing.clone())
    }

    fn pet(&self, id: PetId) -> Result<Option<Pet>, StoreError> {
        Ok(self.lock()?.pets.get(&id).cloned())
    }

    fn pets(&self, status: Option<PetStatus>) -> Result<Vec<Pet>, StoreError> {
        let mut pets: Vec<Pet> = self
            .lock()?
            .pets
            .values()
            .filter(|pet| status.is_none_or(|status| pet.status == status))
            .cloned()
            .collect();
        pets.sort_by(|a, b| PetSort::Newest.compare(a, b));
        Ok(pets)
    }

    fn set_pet_status(
        &self,
        id: PetId,
        status: PetStatus,
        now: Timestamp,
    ) -> Result<Pet, StoreError> {
        let mut tables = self.lock()?;
        let pet = tables
            .pets
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("pet {id}")))?;
        pet.status = status;
        pet.updated_at = now;
        Ok(pet.clone())
    }

    fn set_pet_featured(
        &self,
        id: PetId,
        featured: bool,
        now: Timestamp,
    ) -> Result<Pet, StoreError> {
        let mut tables = self.lock()?;
        let pet = tables
            .pets
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("pet {id}")))?;
        pet.featured = featured;
        pet.updated_at = now;
        Ok(pet.clone())
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<AdoptionApplication, StoreError> {
        let mut tables = self.lock()?;
        if !tables.pets.contains_key(&application.pet_id) {
            return Err(StoreError::NotFound(format!("pet {}", application.pet_id)));
        }
        if let Some(account_id) = application.account_id
            && !tables.accounts.contains_key(&account_id)
        {
            return Err(StoreError::NotFound(format!("account {account_id}")));
        }
        let id =
            ApplicationId::from_raw(tables.next_id(Table::Applications)).ok_or_else(zero_id)?;
        let record = application.into_application(id);
        tables.applications.insert(id, record.clone());
        drop(tables);
        Ok(record)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<AdoptionApplication>, StoreError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        let mut applications: Vec<AdoptionApplication> = self
            .lock()?
            .applications
            .values()
            .filter(|application| status.is_none_or(|status| application.status == status))
            .cloned()
            .collect();
        sort_applications(&mut applications);
        Ok(applications)
    }

    fn applications_for_account(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        let mut applications: Vec<AdoptionApplication> = self
            .lock()?
            .applications
            .values()
            .filter(|application| {
                application.account_id == Some(account_id) || application.details.email == email
            })
            .cloned()
            .collect();
        sort_applications(&mut applications);
        Ok(applications)
    }

    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: Timestamp,
    ) -> Result<StatusChange, StoreError> {
        let mut tables = self.lock()?;
        let (previous, pet_id) = {
            let application = tables
                .applications
                .get(&id)
                .ok_or_else(|| StoreError::NotFound(format!("application {id}")))?;
            (application.status, application.pet_id)
        };
        let pet_status = pet_status_effect(previous, status);
        // Validate both rows before mutating either.
        if pet_status.is_some() && !tables.pets.contains_key(&pet_id) {
            return Err(StoreError::Corrupt(format!("application {id} references missing pet")));
        }
        if let Some(application) = tables.applications.get_mut(&id) {
            application.status = status;
            application.reviewed_at = Some(now);
        }
        if let Some(pet_status) = pet_status
            && let Some(pet) = tables.pets.get_mut(&pet_id)
        {
            pet.status = pet_status;
            pet.updated_at = now;
        }
        drop(tables);
        Ok(StatusChange { application_id: id, pet_id, previous, current: status, pet_status })
    }

    fn set_application_notes(
        &self,
        id: ApplicationId,
        notes: &str,
        now: Timestamp,
    ) -> Result<AdoptionApplication, StoreError> {
        let mut tables = self.lock()?;
        let application = tables
            .applications
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("application {id}")))?;
        notes.clone_into(&mut application.notes);
        application.reviewed_at = Some(now);
        Ok(application.clone())
    }

    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        let mut tables = self.lock()?;
        let id =
            ContactMessageId::from_raw(tables.next_id(Table::Messages)).ok_or_else(zero_id)?;
        let record = message.into_message(id);
        tables.messages.insert(id, record.clone());
        drop(tables);
        Ok(record)
    }

    fn contact_messages(&self, unread_only: bool) -> Result<Vec<ContactMessage>, StoreError> {
        let mut messages: Vec<ContactMessage> = self
            .lock()?
            .messages
            .values()
            .filter(|message| !unread_only || !message.is_read)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(messages)
    }

    fn update_contact_message(
        &self,
        id: ContactMessageId,
        action: ContactAction,
    ) -> Result<ContactMessage, StoreError> {
        let mut tables = self.lock()?;
        let message = tables
            .messages
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("contact message {id}")))?;
        action.apply(message);
        Ok(message.clone())
    }

    fn insert_story(&self, story: NewStory, now: Timestamp) -> Result<SuccessStory, StoreError> {
        let mut tables = self.lock()?;
        if let Some(pet_id) = story.pet_id
            && !tables.pets.contains_key(&pet_id)
        {
            return Err(StoreError::NotFound(format!("pet {pet_id}")));
        }
        let id = StoryId::from_raw(tables.next_id(Table::Stories)).ok_or_else(zero_id)?;
        let record = story.into_story(id, now);
        tables.stories.insert(id, record.clone());
        drop(tables);
        Ok(record)
    }

    fn stories(&self) -> Result<Vec<SuccessStory>, StoreError> {
        let mut stories: Vec<SuccessStory> = self.lock()?.stories.values().cloned().collect();
        stories.sort_by(|a, b| {
            b.adoption_date.cmp(&a.adoption_date).then_with(|| b.id.cmp(&a.id))
        });
        Ok(stories)
    }

    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.lock()?;
        if tables.accounts.values().any(|existing| existing.username == account.username) {
            return Err(StoreError::Conflict(format!("username {} is taken", account.username)));
        }
        let id = AccountId::from_raw(tables.next_id(Table::Accounts)).ok_or_else(zero_id)?;
        let record = account.into_account(id);
        tables.accounts.insert(id, record.clone());
        drop(tables);
        Ok(record)
    }

    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.accounts.values().find(|account| account.username == username).cloned())
    }

    fn update_account_profile(
        &self,
        id: AccountId,
        profile: &ProfileUpdate,
    ) -> Result<Account, StoreError> {
        let mut tables = self.lock()?;
        let account = tables
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        profile.first_name.clone_into(&mut account.first_name);
        profile.last_name.clone_into(&mut account.last_name);
        profile.email.clone_into(&mut account.email);
        Ok(account.clone())
    }

    fn promote_to_staff(&self, id: AccountId, password_hash: &str) -> Result<Account, StoreError> {
        let mut tables = self.lock()?;
        let account = tables
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        account.is_staff = true;
        password_hash.clone_into(&mut account.password_hash);
        Ok(account.clone())
    }

    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.sessions.contains_key(&session.token) {
            return Err(StoreError::Conflict("session token already exists".to_string()));
        }
        tables.sessions.insert(session.token.clone(), session.clone());
        drop(tables);
        Ok(())
    }

    fn session(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        Ok(self.lock()?.sessions.get(token).cloned())
    }

    fn delete_session(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.lock()?.sessions.remove(token);
        Ok(())
    }

    fn purge_expired_sessions(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut tables = self.lock()?;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, session| !session.is_expired(now));
        let removed = before - tables.sessions.len();
        drop(tables);
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    fn stats(&self) -> Result<ShelterStats, StoreError> {
        let tables = self.lock()?;
        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        let pets_with = |status: PetStatus| {
            count(tables.pets.values().filter(|pet| pet.status == status).count())
        };
        let applications_with = |status: ApplicationStatus| {
            count(tables.applications.values().filter(|app| app.status == status).count())
        };
        Ok(ShelterStats {
            available_pets: pets_with(PetStatus::Available),
            adopted_pets: pets_with(PetStatus::Adopted),
            pending_applications: applications_with(ApplicationStatus::Pending),
            completed_applications: applications_with(ApplicationStatus::Completed),
            unread_messages: count(tables.messages.values().filter(|m| !m.is_read).count()),
        })
    }
}

/// Orders applications newest submission first.
fn sort_applications(applications: &mut [AdoptionApplication]) {
    applications
        .sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then_with(|| b.id.cmp(&a.id)));
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared shelter store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedShelterStore {
    /// Inner store implementation.
    inner: Arc<dyn ShelterStore>,
}

impl SharedShelterStore {
    /// Wraps a store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ShelterStore + 'static) -> Self {
        Self { inner: Arc::new(store) }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn ShelterStore>) -> Self {
        Self { inner: store }
    }
}

impl ShelterStore for SharedShelterStore {
    fn insert_pet(&self, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError> {
        self.inner.insert_pet(pet, now)
    }

    fn update_pet(&self, id: PetId, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError> {
        self.inner.update_pet(id, pet, now)
    }

    fn pet(&self, id: PetId) -> Result<Option<Pet>, StoreError> {
        self.inner.pet(id)
    }

    fn pets(&self, status: Option<PetStatus>) -> Result<Vec<Pet>, StoreError> {
        self.inner.pets(status)
    }

    fn set_pet_status(
        &self,
        id: PetId,
        status: PetStatus,
        now: Timestamp,
    ) -> Result<Pet, StoreError> {
        self.inner.set_pet_status(id, status, now)
    }

    fn set_pet_featured(
        &self,
        id: PetId,
        featured: bool,
        now: Timestamp,
    ) -> Result<Pet, StoreError> {
        self.inner.set_pet_featured(id, featured, now)
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<AdoptionApplication, StoreError> {
        self.inner.insert_application(application)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<AdoptionApplication>, StoreError> {
        self.inner.application(id)
    }

    fn applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        self.inner.applications(status)
    }

    fn applications_for_account(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        self.inner.applications_for_account(account_id, email)
    }

    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: Timestamp,
    ) -> Result<StatusChange, StoreError> {
        self.inner.set_application_status(id, status, now)
    }

    fn set_application_notes(
        &self,
        id: ApplicationId,
        notes: &str,
        now: Timestamp,
    ) -> Result<AdoptionApplication, StoreError> {
        self.inner.set_application_notes(id, notes, now)
    }

    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        self.inner.insert_contact_message(message)
    }

    fn contact_messages(&self, unread_only: bool) -> Result<Vec<ContactMessage>, StoreError> {
        self.inner.contact_messages(unread_only)
    }

    fn update_contact_message(
        &self,
        id: ContactMessageId,
        action: ContactAction,
    ) -> Result<ContactMessage, StoreError> {
        self.inner.update_contact_message(id, action)
    }

    fn insert_story(&self, story: NewStory, now: Timestamp) -> Result<SuccessStory, StoreError> {
        self.inner.insert_story(story, now)
    }

    fn stories(&self) -> Result<Vec<SuccessStory>, StoreError> {
        self.inner.stories()
    }

    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.inner.insert_account(account)
    }

    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.inner.account(id)
    }

    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.inner.account_by_username(username)
    }

    fn update_account_profile(
        &self,
        id: AccountId,
        profile: &ProfileUpdate,
    ) -> Result<Account, StoreError> {
        self.inner.update_account_profile(id, profile)
    }

    fn promote_to_staff(&self, id: AccountId, password_hash: &str) -> Result<Account, StoreError> {
        self.inner.promote_to_staff(id, password_hash)
    }

    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.inner.insert_session(session)
    }

    fn session(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        self.inner.session(token)
    }

    fn delete_session(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.inner.delete_session(token)
    }

    fn purge_expired_sessions(&self, now: Timestamp) -> Result<u64, StoreError> {
        self.inner.purge_expired_sessions(now)
    }

    fn stats(&self) -> Result<ShelterStats, StoreError> {
        self.inner.stats()
    }
}
