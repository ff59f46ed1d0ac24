// pawhaven-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Shelter Store
// Description: Durable ShelterStore backed by SQLite WAL.
// Purpose: Persist shelter records with transactional two-record updates.
// Dependencies: pawhaven-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ShelterStore`] using `SQLite`. One
//! connection is shared behind a mutex; every mutation runs in its own
//! transaction, so an application status change and the pet update it
//! implies either both land or neither does. Stored rows that fail to decode
//! are reported as corruption rather than skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use pawhaven_core::Account;
use pawhaven_core::AccountId;
use pawhaven_core::AdoptionApplication;
use pawhaven_core::ApplicationId;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::ContactAction;
use pawhaven_core::ContactMessage;
use pawhaven_core::ContactMessageId;
use pawhaven_core::NewAccount;
use pawhaven_core::NewApplication;
use pawhaven_core::NewContactMessage;
use pawhaven_core::NewPet;
use pawhaven_core::NewStory;
use pawhaven_core::Pet;
use pawhaven_core::PetId;
use pawhaven_core::PetSort;
use pawhaven_core::PetStatus;
use pawhaven_core::ProfileUpdate;
use pawhaven_core::Session;
use pawhaven_core::SessionToken;
use pawhaven_core::ShelterStats;
use pawhaven_core::ShelterStore;
use pawhaven_core::StatusChange;
use pawhaven_core::StoreError;
use pawhaven_core::StoryId;
use pawhaven_core::SuccessStory;
use pawhaven_core::Timestamp;
use pawhaven_core::core::time::format_date;
use pawhaven_core::pet_status_effect;
use pawhaven_core::unique_slug;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::rows::ACCOUNT_COLUMNS;
use crate::rows::APPLICATION_COLUMNS;
use crate::rows::MESSAGE_COLUMNS;
use crate::rows::PET_COLUMNS;
use crate::rows::SESSION_COLUMNS;
use crate::rows::STORY_COLUMNS;
use crate::rows::account_from_row;
use crate::rows::application_from_row;
use crate::rows::message_from_row;
use crate::rows::pet_from_row;
use crate::rows::session_from_row;
use crate::rows::story_from_row;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Schema for a fresh database.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        is_staff INTEGER NOT NULL,
        joined_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS pets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        pet_type TEXT NOT NULL,
        breed TEXT NOT NULL,
        age TEXT NOT NULL,
        gender TEXT NOT NULL,
        size TEXT NOT NULL,
        color TEXT NOT NULL,
        description TEXT NOT NULL,
        personality TEXT NOT NULL,
        vaccinated INTEGER NOT NULL,
        spayed_neutered INTEGER NOT NULL,
        microchipped INTEGER NOT NULL,
        special_needs INTEGER NOT NULL,
        special_needs_description TEXT,
        main_image TEXT,
        image_2 TEXT,
        image_3 TEXT,
        status TEXT NOT NULL,
        arrival_date TEXT NOT NULL,
        adoption_fee TEXT NOT NULL,
        featured INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_pets_status ON pets (status);
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pet_id INTEGER NOT NULL REFERENCES pets(id),
        account_id INTEGER REFERENCES accounts(id) ON DELETE SET NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        address TEXT NOT NULL,
        housing_type TEXT NOT NULL,
        own_or_rent TEXT NOT NULL,
        landlord_approval INTEGER NOT NULL,
        household_adults INTEGER NOT NULL,
        household_children INTEGER NOT NULL,
        has_other_pets INTEGER NOT NULL,
        other_pets_description TEXT NOT NULL,
        previous_pet_experience TEXT NOT NULL,
        reason_for_adoption TEXT NOT NULL,
        status TEXT NOT NULL,
        submitted_at INTEGER NOT NULL,
        reviewed_at INTEGER,
        notes TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_applications_pet_id ON applications (pet_id);
    CREATE INDEX IF NOT EXISTS idx_applications_account_id ON applications (account_id);
    CREATE TABLE IF NOT EXISTS contact_messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        subject TEXT NOT NULL,
        message TEXT NOT NULL,
        is_read INTEGER NOT NULL,
        is_responded INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS success_stories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pet_id INTEGER REFERENCES pets(id) ON DELETE SET NULL,
        adopter_name TEXT NOT NULL,
        adoption_date TEXT NOT NULL,
        title TEXT NOT NULL,
        story TEXT NOT NULL,
        image TEXT,
        featured INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions (expires_at);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` shelter store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default pragmas.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed to decode.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Referenced record does not exist.
    #[error("sqlite store record not found: {0}")]
    NotFound(String),
    /// Uniqueness constraint violated.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
                Self::Corrupt(format!("column {column}: {source}"))
            }
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(message.unwrap_or_else(|| failure.to_string()))
            }
            other => Self::Db(other.to_string()),
        }
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed shelter store with WAL support.
#[derive(Clone)]
pub struct SqliteShelterStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteShelterStore {
    /// Opens an `SQLite`-backed shelter store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when it carries an unsupported schema version.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    /// Runs `op` inside a transaction that commits only when `op` succeeds.
    fn write<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, StoreError> {
        let run = || -> Result<T, SqliteStoreError> {
            let mut guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let tx = guard.transaction()?;
            let value = op(&tx)?;
            tx.commit()?;
            Ok(value)
        };
        run().map_err(StoreError::from)
    }

    /// Runs a read-only `op` against the shared connection.
    fn read<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, StoreError> {
        let run = || -> Result<T, SqliteStoreError> {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            op(&guard)
        };
        run().map_err(StoreError::from)
    }
}

impl ShelterStore for SqliteShelterStore {
    fn insert_pet(&self, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError> {
        self.write(|tx| {
            let taken = slugs_with_prefix(tx, &pet.slug_base)?;
            let slug = unique_slug(&pet.slug_base, |candidate| taken.contains(candidate));
            let personality = serde_json::to_string(&pet.personality)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
            tx.execute(
                "INSERT INTO pets (name, slug, pet_type, breed, age, gender, size, color, \
                 description, personality, vaccinated, spayed_neutered, microchipped, \
                 special_needs, special_needs_description, main_image, image_2, image_3, \
                 status, arrival_date, adoption_fee, featured, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                 ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?23)",
                params![
                    pet.name,
                    slug,
                    pet.pet_type.as_str(),
                    pet.breed,
                    pet.age,
                    pet.gender.as_str(),
                    pet.size.as_str(),
                    pet.color,
                    pet.description,
                    personality,
                    pet.vaccinated,
                    pet.spayed_neutered,
                    pet.microchipped,
                    pet.special_needs,
                    pet.special_needs_description,
                    pet.main_image,
                    pet.image_2,
                    pet.image_3,
                    pet.status.as_str(),
                    format_date(pet.arrival_date),
                    pet.adoption_fee.to_string(),
                    pet.featured,
                    now.as_unix_millis(),
                ],
            )?;
            let id = last_insert_id(tx, PetId::from_raw)?;
            Ok(pet.into_pet(id, slug, now))
        })
    }

    fn update_pet(&self, id: PetId, pet: NewPet, now: Timestamp) -> Result<Pet, StoreError> {
        self.write(|tx| {
            let personality = serde_json::to_string(&pet.personality)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
            let changed = tx.execute(
                "UPDATE pets SET name = ?1, pet_type = ?2, breed = ?3, age = ?4, gender = ?5, \
                 size = ?6, color = ?7, description = ?8, personality = ?9, vaccinated = ?10, \
                 spayed_neutered = ?11, microchipped = ?12, special_needs = ?13, \
                 special_needs_description = ?14, main_image = ?15, image_2 = ?16, \
                 image_3 = ?17, status = ?18, arrival_date = ?19, adoption_fee = ?20, \
                 featured = ?21, updated_at = ?22 WHERE id = ?23",
                params![
                    pet.name,
                    pet.pet_type.as_str(),
                    pet.breed,
                    pet.age,
                    pet.gender.as_str(),
                    pet.size.as_str(),
                    pet.color,
                    pet.description,
                    personality,
                    pet.vaccinated,
                    pet.spayed_neutered,
                    pet.microchipped,
                    pet.special_needs,
                    pet.special_needs_description,
                    pet.main_image,
                    pet.image_2,
                    pet.image_3,
                    pet.status.as_str(),
                    format_date(pet.arrival_date),
                    pet.adoption_fee.to_string(),
                    pet.featured,
                    now.as_unix_millis(),
                    key(id.get())?,
                ],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("pet {id}")));
            }
            require_pet(tx, id)
        })
    }

    fn pet(&self, id: PetId) -> Result<Option<Pet>, StoreError> {
        self.read(|conn| load_pet(conn, id))
    }

    fn pets(&self, status: Option<PetStatus>) -> Result<Vec<Pet>, StoreError> {
        let mut pets = self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PET_COLUMNS} FROM pets WHERE (?1 IS NULL OR status = ?1) \
                 ORDER BY arrival_date DESC, name ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![status.map(PetStatus::as_str)], pet_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })?;
        pets.sort_by(|a, b| PetSort::Newest.compare(a, b));
        Ok(pets)
    }

    fn set_pet_status(
        &self,
        id: PetId,
        status: PetStatus,
        now: Timestamp,
    ) -> Result<Pet, StoreError> {
        self.write(|tx| {
            update_pet_status(tx, id, status, now)?;
            require_pet(tx, id)
        })
    }

    fn set_pet_featured(
        &self,
        id: PetId,
        featured: bool,
        now: Timestamp,
    ) -> Result<Pet, StoreError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE pets SET featured = ?1, updated_at = ?2 WHERE id = ?3",
                params![featured, now.as_unix_millis(), key(id.get())?],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("pet {id}")));
            }
            require_pet(tx, id)
        })
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<AdoptionApplication, StoreError> {
        self.write(|tx| {
            require_pet(tx, application.pet_id)?;
            if let Some(account_id) = application.account_id {
                load_account(tx, account_id)?
                    .ok_or_else(|| SqliteStoreError::NotFound(format!("account {account_id}")))?;
            }
            let account = application.account_id.map(|id| key(id.get())).transpose()?;
            let details = &application.details;
            tx.execute(
                "INSERT INTO applications (pet_id, account_id, first_name, last_name, email, \
                 phone, address, housing_type, own_or_rent, landlord_approval, \
                 household_adults, household_children, has_other_pets, \
                 other_pets_description, previous_pet_experience, reason_for_adoption, \
                 status, submitted_at, reviewed_at, notes) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                 ?16, ?17, ?18, NULL, '')",
                params![
                    key(application.pet_id.get())?,
                    account,
                    details.first_name,
                    details.last_name,
                    details.email,
                    details.phone,
                    details.address,
                    details.housing_type,
                    details.own_or_rent,
                    details.landlord_approval,
                    details.household_adults,
                    details.household_children,
                    details.has_other_pets,
                    details.other_pets_description,
                    details.previous_pet_experience,
                    details.reason_for_adoption,
                    ApplicationStatus::Pending.as_str(),
                    application.submitted_at.as_unix_millis(),
                ],
            )?;
            let id = last_insert_id(tx, ApplicationId::from_raw)?;
            Ok(application.into_application(id))
        })
    }

    fn application(&self, id: ApplicationId) -> Result<Option<AdoptionApplication>, StoreError> {
        self.read(|conn| load_application(conn, id))
    }

    fn applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications \
                 WHERE (?1 IS NULL OR status = ?1) ORDER BY submitted_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map(params![status.map(ApplicationStatus::as_str)], application_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn applications_for_account(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications \
                 WHERE account_id = ?1 OR email = ?2 ORDER BY submitted_at DESC, id DESC"
            ))?;
            let rows =
                stmt.query_map(params![key(account_id.get())?, email], application_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        now: Timestamp,
    ) -> Result<StatusChange, StoreError> {
        self.write(|tx| {
            let application = load_application(tx, id)?
                .ok_or_else(|| SqliteStoreError::NotFound(format!("application {id}")))?;
            let previous = application.status;
            let pet_id = application.pet_id;
            let pet_status = pet_status_effect(previous, status);
            if let Some(pet_status) = pet_status {
                update_pet_status(tx, pet_id, pet_status, now).map_err(|err| match err {
                    SqliteStoreError::NotFound(_) => SqliteStoreError::Corrupt(format!(
                        "application {id} references missing pet {pet_id}"
                    )),
                    other => other,
                })?;
            }
            tx.execute(
                "UPDATE applications SET status = ?1, reviewed_at = ?2 WHERE id = ?3",
                params![status.as_str(), now.as_unix_millis(), key(id.get())?],
            )?;
            Ok(StatusChange { application_id: id, pet_id, previous, current: status, pet_status })
        })
    }

    fn set_application_notes(
        &self,
        id: ApplicationId,
        notes: &str,
        now: Timestamp,
    ) -> Result<AdoptionApplication, StoreError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE applications SET notes = ?1, reviewed_at = ?2 WHERE id = ?3",
                params![notes, now.as_unix_millis(), key(id.get())?],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            load_application(tx, id)?
                .ok_or_else(|| SqliteStoreError::NotFound(format!("application {id}")))
        })
    }

    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StoreError> {
        self.write(|tx| {
            tx.execute(
                "INSERT INTO contact_messages (name, email, phone, subject, message, is_read, \
                 is_responded, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6)",
                params![
                    message.name,
                    message.email,
                    message.phone,
                    message.subject,
                    message.message,
                    message.created_at.as_unix_millis(),
                ],
            )?;
            let id = last_insert_id(tx, ContactMessageId::from_raw)?;
            Ok(message.into_message(id))
        })
    }

    fn contact_messages(&self, unread_only: bool) -> Result<Vec<ContactMessage>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM contact_messages \
                 WHERE (?1 = 0 OR is_read = 0) ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![unread_only], message_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn update_contact_message(
        &self,
        id: ContactMessageId,
        action: ContactAction,
    ) -> Result<ContactMessage, StoreError> {
        self.write(|tx| {
            let mut message = tx
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = ?1"),
                    params![key(id.get())?],
                    message_from_row,
                )
                .optional()?
                .ok_or_else(|| SqliteStoreError::NotFound(format!("contact message {id}")))?;
            action.apply(&mut message);
            tx.execute(
                "UPDATE contact_messages SET is_read = ?1, is_responded = ?2 WHERE id = ?3",
                params![message.is_read, message.is_responded, key(id.get())?],
            )?;
            Ok(message)
        })
    }

    fn insert_story(&self, story: NewStory, now: Timestamp) -> Result<SuccessStory, StoreError> {
        self.write(|tx| {
            if let Some(pet_id) = story.pet_id {
                require_pet(tx, pet_id)?;
            }
            let pet = story.pet_id.map(|id| key(id.get())).transpose()?;
            tx.execute(
                "INSERT INTO success_stories (pet_id, adopter_name, adoption_date, title, \
                 story, image, featured, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    pet,
                    story.adopter_name,
                    format_date(story.adoption_date),
                    story.title,
                    story.story,
                    story.image,
                    story.featured,
                    now.as_unix_millis(),
                ],
            )?;
            let id = last_insert_id(tx, StoryId::from_raw)?;
            Ok(story.into_story(id, now))
        })
    }

    fn stories(&self) -> Result<Vec<SuccessStory>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STORY_COLUMNS} FROM success_stories ORDER BY adoption_date DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![], story_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.write(|tx| {
            let taken: Option<i64> = tx
                .query_row(
                    "SELECT id FROM accounts WHERE username = ?1",
                    params![account.username],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "username {} is taken",
                    account.username
                )));
            }
            tx.execute(
                "INSERT INTO accounts (username, email, first_name, last_name, password_hash, \
                 is_staff, joined_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    account.username,
                    account.email,
                    account.first_name,
                    account.last_name,
                    account.password_hash,
                    account.is_staff,
                    account.joined_at.as_unix_millis(),
                ],
            )?;
            let id = last_insert_id(tx, AccountId::from_raw)?;
            Ok(account.into_account(id))
        })
    }

    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.read(|conn| load_account(conn, id))
    }

    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
                    params![username],
                    account_from_row,
                )
                .optional()?)
        })
    }

    fn update_account_profile(
        &self,
        id: AccountId,
        profile: &ProfileUpdate,
    ) -> Result<Account, StoreError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE accounts SET first_name = ?1, last_name = ?2, email = ?3 WHERE id = ?4",
                params![profile.first_name, profile.last_name, profile.email, key(id.get())?],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("account {id}")));
            }
            load_account(tx, id)?.ok_or_else(|| SqliteStoreError::NotFound(format!("account {id}")))
        })
    }

    fn promote_to_staff(&self, id: AccountId, password_hash: &str) -> Result<Account, StoreError> {
        self.write(|tx| {
            let changed = tx.execute(
                "UPDATE accounts SET is_staff = 1, password_hash = ?1 WHERE id = ?2",
                params![password_hash, key(id.get())?],
            )?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("account {id}")));
            }
            load_account(tx, id)?.ok_or_else(|| SqliteStoreError::NotFound(format!("account {id}")))
        })
    }

    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.write(|tx| {
            tx.execute(
                "INSERT INTO sessions (token, account_id, created_at, expires_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token.as_str(),
                    key(session.account_id.get())?,
                    session.created_at.as_unix_millis(),
                    session.expires_at.as_unix_millis(),
                ],
            )?;
            Ok(())
        })
    }

    fn session(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token = ?1"),
                    params![token.as_str()],
                    session_from_row,
                )
                .optional()?)
        })
    }

    fn delete_session(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.write(|tx| {
            tx.execute("DELETE FROM sessions WHERE token = ?1", params![token.as_str()])?;
            Ok(())
        })
    }

    fn purge_expired_sessions(&self, now: Timestamp) -> Result<u64, StoreError> {
        self.write(|tx| {
            let removed = tx.execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![now.as_unix_millis()],
            )?;
            Ok(u64::try_from(removed).unwrap_or(u64::MAX))
        })
    }

    fn stats(&self) -> Result<ShelterStats, StoreError> {
        self.read(|conn| {
            let counts: [i64; 5] = conn.query_row(
                "SELECT \
                 (SELECT COUNT(*) FROM pets WHERE status = ?1), \
                 (SELECT COUNT(*) FROM pets WHERE status = ?2), \
                 (SELECT COUNT(*) FROM applications WHERE status = ?3), \
                 (SELECT COUNT(*) FROM applications WHERE status = ?4), \
                 (SELECT COUNT(*) FROM contact_messages WHERE is_read = 0)",
                params![
                    PetStatus::Available.as_str(),
                    PetStatus::Adopted.as_str(),
                    ApplicationStatus::Pending.as_str(),
                    ApplicationStatus::Completed.as_str(),
                ],
                |row| Ok([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?]),
            )?;
            let [available, adopted, pending, completed, unread] =
                counts.map(|count| u64::try_from(count).unwrap_or(0));
            Ok(ShelterStats {
                available_pets: available,
                adopted_pets: adopted,
                pending_applications: pending,
                completed_applications: completed,
                unread_messages: unread,
            })
        })
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Converts a record id to an `SQLite` integer key.
fn key(raw: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(raw).map_err(|_| SqliteStoreError::Invalid(format!("id {raw} out of range")))
}

/// Reads the id assigned by the last insert on this connection.
fn last_insert_id<T>(
    conn: &Connection,
    from_raw: impl FnOnce(u64) -> Option<T>,
) -> Result<T, SqliteStoreError> {
    let raw = conn.last_insert_rowid();
    u64::try_from(raw)
        .ok()
        .and_then(from_raw)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid row id {raw}")))
}

/// Loads a pet by id.
fn load_pet(conn: &Connection, id: PetId) -> Result<Option<Pet>, SqliteStoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {PET_COLUMNS} FROM pets WHERE id = ?1"),
            params![key(id.get())?],
            pet_from_row,
        )
        .optional()?)
}

/// Loads a pet that must exist.
fn require_pet(conn: &Connection, id: PetId) -> Result<Pet, SqliteStoreError> {
    load_pet(conn, id)?.ok_or_else(|| SqliteStoreError::NotFound(format!("pet {id}")))
}

/// Sets a pet's status, failing when the pet does not exist.
fn update_pet_status(
    conn: &Connection,
    id: PetId,
    status: PetStatus,
    now: Timestamp,
) -> Result<(), SqliteStoreError> {
    let changed = conn.execute(
        "UPDATE pets SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now.as_unix_millis(), key(id.get())?],
    )?;
    if changed == 0 {
        return Err(SqliteStoreError::NotFound(format!("pet {id}")));
    }
    Ok(())
}

/// Collects stored slugs that could collide with `base` or its suffixed forms.
fn slugs_with_prefix(conn: &Connection, base: &str) -> Result<HashSet<String>, SqliteStoreError> {
    let mut stmt = conn.prepare("SELECT slug FROM pets WHERE slug = ?1 OR slug LIKE ?1 || '-%'")?;
    let rows = stmt.query_map(params![base], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<HashSet<_>, _>>()?)
}

/// Loads an application by id.
fn load_application(
    conn: &Connection,
    id: ApplicationId,
) -> Result<Option<AdoptionApplication>, SqliteStoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?1"),
            params![key(id.get())?],
            application_from_row,
        )
        .optional()?)
}

/// Loads an account by id.
fn load_account(conn: &Connection, id: AccountId) -> Result<Option<Account>, SqliteStoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
            params![key(id.get())?],
            account_from_row,
        )
        .optional()?)
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path is empty".to_string()));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection and applies pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(SCHEMA)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
