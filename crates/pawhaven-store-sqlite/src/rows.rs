// pawhaven-store-sqlite/src/rows.rs
// ============================================================================
// Module: SQLite Row Mapping
// Description: Column lists and row decoders for the shelter tables.
// Purpose: Turn stored rows back into typed shelter records.
// Dependencies: pawhaven-core, rusqlite, bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! Each table has a fixed column list used by every `SELECT`, and a decoder
//! that reads those columns by position. Values that do not parse back into
//! their domain type surface as conversion failures, which the store reports
//! as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use pawhaven_core::Account;
use pawhaven_core::AccountId;
use pawhaven_core::AdoptionApplication;
use pawhaven_core::ApplicationDetails;
use pawhaven_core::ApplicationId;
use pawhaven_core::ApplicationStatus;
use pawhaven_core::ContactMessage;
use pawhaven_core::ContactMessageId;
use pawhaven_core::Pet;
use pawhaven_core::PetGender;
use pawhaven_core::PetId;
use pawhaven_core::PetSize;
use pawhaven_core::PetStatus;
use pawhaven_core::PetType;
use pawhaven_core::Session;
use pawhaven_core::SessionToken;
use pawhaven_core::StoryId;
use pawhaven_core::SuccessStory;
use pawhaven_core::Timestamp;
use pawhaven_core::core::time::parse_date;
use rusqlite::Row;
use rusqlite::types::Type;

// ============================================================================
// SECTION: Column Lists
// ============================================================================

/// Pet columns in decoder order.
pub const PET_COLUMNS: &str = "id, name, slug, pet_type, breed, age, gender, size, color, \
     description, personality, vaccinated, spayed_neutered, microchipped, special_needs, \
     special_needs_description, main_image, image_2, image_3, status, arrival_date, \
     adoption_fee, featured, created_at, updated_at";

/// Application columns in decoder order.
pub const APPLICATION_COLUMNS: &str = "id, pet_id, account_id, first_name, last_name, email, \
     phone, address, housing_type, own_or_rent, landlord_approval, household_adults, \
     household_children, has_other_pets, other_pets_description, previous_pet_experience, \
     reason_for_adoption, status, submitted_at, reviewed_at, notes";

/// Contact message columns in decoder order.
pub const MESSAGE_COLUMNS: &str =
    "id, name, email, phone, subject, message, is_read, is_responded, created_at";

/// Story columns in decoder order.
pub const STORY_COLUMNS: &str =
    "id, pet_id, adopter_name, adoption_date, title, story, image, featured, created_at";

/// Account columns in decoder order.
pub const ACCOUNT_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_staff, joined_at";

/// Session columns in decoder order.
pub const SESSION_COLUMNS: &str = "token, account_id, created_at, expires_at";

// ============================================================================
// SECTION: Decoders
// ============================================================================

/// Decodes a pet row.
pub fn pet_from_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    let personality: String = row.get(10)?;
    let personality: Vec<String> = serde_json::from_str(&personality)
        .map_err(|err| conversion_error(10, format!("personality is not a json list: {err}")))?;
    Ok(Pet {
        id: id_column(row, 0, PetId::from_raw)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        pet_type: text_column(row, 3, PetType::parse)?,
        breed: row.get(4)?,
        age: row.get(5)?,
        gender: text_column(row, 6, PetGender::parse)?,
        size: text_column(row, 7, PetSize::parse)?,
        color: row.get(8)?,
        description: row.get(9)?,
        personality,
        vaccinated: row.get(11)?,
        spayed_neutered: row.get(12)?,
        microchipped: row.get(13)?,
        special_needs: row.get(14)?,
        special_needs_description: row.get(15)?,
        main_image: row.get(16)?,
        image_2: row.get(17)?,
        image_3: row.get(18)?,
        status: text_column(row, 19, PetStatus::parse)?,
        arrival_date: text_column(row, 20, parse_date)?,
        adoption_fee: text_column(row, 21, |raw| BigDecimal::from_str(raw).ok())?,
        featured: row.get(22)?,
        created_at: Timestamp::from_unix_millis(row.get(23)?),
        updated_at: Timestamp::from_unix_millis(row.get(24)?),
    })
}

/// Decodes an application row.
pub fn application_from_row(row: &Row<'_>) -> rusqlite::Result<AdoptionApplication> {
    let reviewed_at: Option<i64> = row.get(19)?;
    Ok(AdoptionApplication {
        id: id_column(row, 0, ApplicationId::from_raw)?,
        pet_id: id_column(row, 1, PetId::from_raw)?,
        account_id: optional_id_column(row, 2, AccountId::from_raw)?,
        details: ApplicationDetails {
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            email: row.get(5)?,
            phone: row.get(6)?,
            address: row.get(7)?,
            housing_type: row.get(8)?,
            own_or_rent: row.get(9)?,
            landlord_approval: row.get(10)?,
            household_adults: row.get(11)?,
            household_children: row.get(12)?,
            has_other_pets: row.get(13)?,
            other_pets_description: row.get(14)?,
            previous_pet_experience: row.get(15)?,
            reason_for_adoption: row.get(16)?,
        },
        status: text_column(row, 17, ApplicationStatus::parse)?,
        submitted_at: Timestamp::from_unix_millis(row.get(18)?),
        reviewed_at: reviewed_at.map(Timestamp::from_unix_millis),
        notes: row.get(20)?,
    })
}

/// Decodes a contact message row.
pub fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: id_column(row, 0, ContactMessageId::from_raw)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        is_read: row.get(6)?,
        is_responded: row.get(7)?,
        created_at: Timestamp::from_unix_millis(row.get(8)?),
    })
}

/// Decodes a success story row.
pub fn story_from_row(row: &Row<'_>) -> rusqlite::Result<SuccessStory> {
    Ok(SuccessStory {
        id: id_column(row, 0, StoryId::from_raw)?,
        pet_id: optional_id_column(row, 1, PetId::from_raw)?,
        adopter_name: row.get(2)?,
        adoption_date: text_column(row, 3, parse_date)?,
        title: row.get(4)?,
        story: row.get(5)?,
        image: row.get(6)?,
        featured: row.get(7)?,
        created_at: Timestamp::from_unix_millis(row.get(8)?),
    })
}

/// Decodes an account row.
pub fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: id_column(row, 0, AccountId::from_raw)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        password_hash: row.get(5)?,
        is_staff: row.get(6)?,
        joined_at: Timestamp::from_unix_millis(row.get(7)?),
    })
}

/// Decodes a session row.
pub fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let token: String = row.get(0)?;
    Ok(Session {
        token: SessionToken::new(token),
        account_id: id_column(row, 1, AccountId::from_raw)?,
        created_at: Timestamp::from_unix_millis(row.get(2)?),
        expires_at: Timestamp::from_unix_millis(row.get(3)?),
    })
}

// ============================================================================
// SECTION: Column Helpers
// ============================================================================

/// Builds a conversion failure for `column`.
fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

/// Reads a text column and parses it with `parse`.
fn text_column<T>(
    row: &Row<'_>,
    column: usize,
    parse: impl FnOnce(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    parse(&raw).ok_or_else(|| conversion_error(column, format!("unrecognized value `{raw}`")))
}

/// Reads a non-null identifier column.
fn id_column<T>(
    row: &Row<'_>,
    column: usize,
    from_raw: impl FnOnce(u64) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: i64 = row.get(column)?;
    u64::try_from(raw)
        .ok()
        .and_then(from_raw)
        .ok_or_else(|| conversion_error(column, format!("invalid id {raw}")))
}

/// Reads a nullable identifier column.
fn optional_id_column<T>(
    row: &Row<'_>,
    column: usize,
    from_raw: impl FnOnce(u64) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<i64> = row.get(column)?;
    match raw {
        None => Ok(None),
        Some(raw) => u64::try_from(raw)
            .ok()
            .and_then(from_raw)
            .map(Some)
            .ok_or_else(|| conversion_error(column, format!("invalid id {raw}"))),
    }
}
