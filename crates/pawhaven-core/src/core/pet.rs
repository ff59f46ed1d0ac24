// pawhaven-core/src/core/pet.rs
// ============================================================================
// Module: PawHaven Pets
// Description: Pet records, choice enums, computed badges, and the pet form.
// Purpose: Model adoptable animals and validate staff-entered pet data.
// Dependencies: bigdecimal, serde, slug, time
// ============================================================================

//! ## Overview
//! A [`Pet`] is created by staff and never hard-deleted; its status moves
//! between available, pending, and adopted. Computed properties (badge,
//! new-arrival check, canonical path) take `today` from the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;
use time::Date;

use crate::core::identifiers::PetId;
use crate::core::time::Timestamp;
use crate::core::time::days_between;
use crate::core::time::format_date;
use crate::core::time::parse_date;
use crate::core::validation::MAX_IMAGE_CHARS;
use crate::core::validation::MAX_NAME_CHARS;
use crate::core::validation::MAX_TEXT_CHARS;
use crate::core::validation::ValidationErrors;
use crate::core::validation::deserialize_flag;
use crate::core::validation::deserialize_string_list;
use crate::core::validation::optional_text;
use crate::core::validation::required_text;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default window, in days, in which a pet counts as a new arrival.
pub const DEFAULT_NEW_ARRIVAL_DAYS: u32 = 30;
/// Maximum characters in a pet slug.
pub const MAX_SLUG_CHARS: usize = 100;
/// Slug used when a name slugifies to nothing.
const FALLBACK_SLUG: &str = "pet";
/// Maximum characters in the pet age text.
const MAX_AGE_CHARS: usize = 50;
/// Maximum personality tags kept per pet.
const MAX_PERSONALITY_TAGS: usize = 20;
/// Exclusive upper bound on adoption fees (10 digits, 2 decimal places).
const MAX_FEE_WHOLE: i64 = 100_000_000;

// ============================================================================
// SECTION: Choice Enums
// ============================================================================

/// Pet species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    /// Dog.
    Dog,
    /// Cat.
    Cat,
    /// Rabbit.
    Rabbit,
    /// Bird.
    Bird,
}

impl PetType {
    /// All species in display order.
    pub const ALL: [Self; 4] = [Self::Dog, Self::Cat, Self::Rabbit, Self::Bird];

    /// Returns the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Rabbit => "rabbit",
            Self::Bird => "bird",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Rabbit => "Rabbit",
            Self::Bird => "Bird",
        }
    }

    /// Parses an exact stored value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Pet size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetSize {
    /// Small.
    Small,
    /// Medium.
    Medium,
    /// Large.
    Large,
}

impl PetSize {
    /// All sizes in display order.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Returns the stored value (also the display label).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }

    /// Parses an exact stored value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.as_str() == value)
    }
}

/// Pet gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetGender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl PetGender {
    /// All genders in display order.
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Returns the stored value (also the display label).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Parses an exact stored value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|gender| gender.as_str() == value)
    }
}

/// Pet availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Listed and open to applications.
    Available,
    /// Held while an adoption is arranged.
    Pending,
    /// Adopted.
    Adopted,
}

impl PetStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Available, Self::Pending, Self::Adopted];

    /// Returns the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Adopted => "adopted",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Pending => "Pending",
            Self::Adopted => "Adopted",
        }
    }

    /// Parses an exact stored value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// Badge shown on pet cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PetBadge {
    /// The pet has special needs.
    SpecialNeeds,
    /// The pet arrived recently.
    NewArrival,
}

impl PetBadge {
    /// Returns the badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SpecialNeeds => "Special Needs",
            Self::NewArrival => "New Arrival",
        }
    }
}

// ============================================================================
// SECTION: Pet Record
// ============================================================================

/// Adoptable animal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Record identifier.
    pub id: PetId,
    /// Pet name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Species.
    pub pet_type: PetType,
    /// Breed text.
    pub breed: String,
    /// Free-form age text such as "3 years" or "6 months".
    pub age: String,
    /// Gender.
    pub gender: PetGender,
    /// Size class.
    pub size: PetSize,
    /// Coat or plumage color.
    pub color: String,
    /// Long description.
    pub description: String,
    /// Personality tags.
    pub personality: Vec<String>,
    /// Vaccinations are current.
    pub vaccinated: bool,
    /// Spayed or neutered.
    pub spayed_neutered: bool,
    /// Microchipped.
    pub microchipped: bool,
    /// Has special needs.
    pub special_needs: bool,
    /// Description of special needs, when any.
    pub special_needs_description: Option<String>,
    /// Main image path or URL.
    pub main_image: Option<String>,
    /// Second image path or URL.
    pub image_2: Option<String>,
    /// Third image path or URL.
    pub image_3: Option<String>,
    /// Availability status.
    pub status: PetStatus,
    /// Date the pet arrived at the shelter.
    pub arrival_date: Date,
    /// Adoption fee.
    pub adoption_fee: BigDecimal,
    /// Highlighted on the home page.
    pub featured: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl Pet {
    /// Returns true when the pet arrived within `window_days` of `today`.
    #[must_use]
    pub fn is_new_arrival(&self, today: Date, window_days: u32) -> bool {
        days_between(self.arrival_date, today) <= i64::from(window_days)
    }

    /// Returns the card badge: special needs first, then new arrival.
    #[must_use]
    pub fn badge(&self, today: Date, window_days: u32) -> Option<PetBadge> {
        if self.special_needs {
            Some(PetBadge::SpecialNeeds)
        } else if self.is_new_arrival(today, window_days) {
            Some(PetBadge::NewArrival)
        } else {
            None
        }
    }

    /// Returns the present images in order main, second, third.
    #[must_use]
    pub fn images(&self) -> Vec<&str> {
        [&self.main_image, &self.image_2, &self.image_3]
            .into_iter()
            .filter_map(|image| image.as_deref())
            .collect()
    }

    /// Returns the canonical detail page path.
    #[must_use]
    pub fn absolute_path(&self) -> String {
        format!("/pet/{}/{}", self.id, self.slug)
    }
}

// ============================================================================
// SECTION: New Pet Payload
// ============================================================================

/// Validated pet payload ready for insertion.
///
/// # Invariants
/// - `slug_base` is non-empty; the store appends `-2`, `-3`, ... on collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    /// Pet name.
    pub name: String,
    /// Preferred slug before collision handling.
    pub slug_base: String,
    /// Species.
    pub pet_type: PetType,
    /// Breed text.
    pub breed: String,
    /// Age text.
    pub age: String,
    /// Gender.
    pub gender: PetGender,
    /// Size class.
    pub size: PetSize,
    /// Color text.
    pub color: String,
    /// Description.
    pub description: String,
    /// Personality tags.
    pub personality: Vec<String>,
    /// Vaccinated flag.
    pub vaccinated: bool,
    /// Spayed or neutered flag.
    pub spayed_neutered: bool,
    /// Microchipped flag.
    pub microchipped: bool,
    /// Special needs flag.
    pub special_needs: bool,
    /// Special needs description.
    pub special_needs_description: Option<String>,
    /// Main image.
    pub main_image: Option<String>,
    /// Second image.
    pub image_2: Option<String>,
    /// Third image.
    pub image_3: Option<String>,
    /// Initial status.
    pub status: PetStatus,
    /// Arrival date.
    pub arrival_date: Date,
    /// Adoption fee, scaled to two decimal places.
    pub adoption_fee: BigDecimal,
    /// Featured flag.
    pub featured: bool,
}

impl NewPet {
    /// Builds the stored record once the store has assigned identity.
    #[must_use]
    pub fn into_pet(self, id: PetId, slug: String, now: Timestamp) -> Pet {
        Pet {
            id,
            name: self.name,
            slug,
            pet_type: self.pet_type,
            breed: self.breed,
            age: self.age,
            gender: self.gender,
            size: self.size,
            color: self.color,
            description: self.description,
            personality: self.personality,
            vaccinated: self.vaccinated,
            spayed_neutered: self.spayed_neutered,
            microchipped: self.microchipped,
            special_needs: self.special_needs,
            special_needs_description: self.special_needs_description,
            main_image: self.main_image,
            image_2: self.image_2,
            image_3: self.image_3,
            status: self.status,
            arrival_date: self.arrival_date,
            adoption_fee: self.adoption_fee,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an edit to `existing`, keeping its id, slug and creation time.
    #[must_use]
    pub fn into_update(self, existing: &Pet, now: Timestamp) -> Pet {
        let mut pet = self.into_pet(existing.id, existing.slug.clone(), existing.created_at);
        pet.updated_at = now;
        pet
    }
}

// ============================================================================
// SECTION: Slugs
// ============================================================================

/// Derives a slug from an explicit slug or the pet name.
#[must_use]
pub fn slug_base(explicit: Option<&str>, name: &str) -> String {
    let source = explicit.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(name);
    let mut slug = slug::slugify(source);
    // Leave room for a collision suffix.
    let limit = MAX_SLUG_CHARS - 8;
    if slug.len() > limit {
        slug.truncate(limit);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    if slug.is_empty() { FALLBACK_SLUG.to_string() } else { slug }
}

/// Returns `base` or the first `base-N` (N >= 2) that `is_taken` rejects.
pub fn unique_slug(base: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let mut suffix: u64 = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

// ============================================================================
// SECTION: Pet Form
// ============================================================================

/// Staff pet form, also the record shape for `pets import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetForm {
    /// Pet name.
    pub name: String,
    /// Optional explicit slug.
    pub slug: Option<String>,
    /// Species value.
    #[serde(rename = "type")]
    pub pet_type: String,
    /// Breed text.
    pub breed: String,
    /// Age text.
    pub age: String,
    /// Gender value.
    pub gender: String,
    /// Size value.
    pub size: String,
    /// Color text.
    pub color: String,
    /// Description.
    pub description: String,
    /// Personality tags, as a list or comma-separated text.
    #[serde(deserialize_with = "deserialize_string_list")]
    pub personality: Vec<String>,
    /// Vaccinated flag.
    #[serde(deserialize_with = "deserialize_flag")]
    pub vaccinated: bool,
    /// Spayed or neutered flag.
    #[serde(deserialize_with = "deserialize_flag")]
    pub spayed_neutered: bool,
    /// Microchipped flag.
    #[serde(deserialize_with = "deserialize_flag")]
    pub microchipped: bool,
    /// Special needs flag.
    #[serde(deserialize_with = "deserialize_flag")]
    pub special_needs: bool,
    /// Special needs description.
    pub special_needs_description: Option<String>,
    /// Main image path or URL.
    pub main_image: Option<String>,
    /// Second image path or URL.
    pub image_2: Option<String>,
    /// Third image path or URL.
    pub image_3: Option<String>,
    /// Status value; defaults to available.
    pub status: Option<String>,
    /// Arrival date as `YYYY-MM-DD`.
    pub arrival_date: String,
    /// Adoption fee as decimal text.
    pub adoption_fee: String,
    /// Featured flag.
    #[serde(deserialize_with = "deserialize_flag")]
    pub featured: bool,
}

impl PetForm {
    /// Prefills the form from a stored pet for editing.
    #[must_use]
    pub fn from_pet(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            slug: Some(pet.slug.clone()),
            pet_type: pet.pet_type.as_str().to_string(),
            breed: pet.breed.clone(),
            age: pet.age.clone(),
            gender: pet.gender.as_str().to_string(),
            size: pet.size.as_str().to_string(),
            color: pet.color.clone(),
            description: pet.description.clone(),
            personality: pet.personality.clone(),
            vaccinated: pet.vaccinated,
            spayed_neutered: pet.spayed_neutered,
            microchipped: pet.microchipped,
            special_needs: pet.special_needs,
            special_needs_description: pet.special_needs_description.clone(),
            main_image: pet.main_image.clone(),
            image_2: pet.image_2.clone(),
            image_3: pet.image_3.clone(),
            status: Some(pet.status.as_str().to_string()),
            arrival_date: format_date(pet.arrival_date),
            adoption_fee: pet.adoption_fee.to_string(),
            featured: pet.featured,
        }
    }

    /// Validates the form into an insertable payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewPet, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_CHARS);
        let explicit_slug =
            optional_text(&mut errors, "slug", self.slug.as_deref(), MAX_SLUG_CHARS);
        let pet_type = PetType::parse(self.pet_type.trim());
        if pet_type.is_none() {
            errors.add("type", "select a valid pet type");
        }
        let breed = required_text(&mut errors, "breed", &self.breed, MAX_NAME_CHARS);
        let age = required_text(&mut errors, "age", &self.age, MAX_AGE_CHARS);
        let gender = PetGender::parse(self.gender.trim());
        if gender.is_none() {
            errors.add("gender", "select a valid gender");
        }
        let size = PetSize::parse(self.size.trim());
        if size.is_none() {
            errors.add("size", "select a valid size");
        }
        let color = required_text(&mut errors, "color", &self.color, MAX_NAME_CHARS);
        let description =
            required_text(&mut errors, "description", &self.description, MAX_TEXT_CHARS);
        if self.personality.len() > MAX_PERSONALITY_TAGS {
            errors.add("personality", format!("at most {MAX_PERSONALITY_TAGS} traits"));
        }
        let special_needs_description = optional_text(
            &mut errors,
            "special_needs_description",
            self.special_needs_description.as_deref(),
            MAX_TEXT_CHARS,
        );
        let main_image =
            optional_text(&mut errors, "main_image", self.main_image.as_deref(), MAX_IMAGE_CHARS);
        let image_2 =
            optional_text(&mut errors, "image_2", self.image_2.as_deref(), MAX_IMAGE_CHARS);
        let image_3 =
            optional_text(&mut errors, "image_3", self.image_3.as_deref(), MAX_IMAGE_CHARS);
        let status = match self.status.as_deref().map(str::trim).filter(|value| !value.is_empty())
        {
            None => Some(PetStatus::Available),
            Some(value) => {
                let parsed = PetStatus::parse(value);
                if parsed.is_none() {
                    errors.add("status", "select a valid status");
                }
                parsed
            }
        };
        let arrival_date = parse_date(&self.arrival_date);
        if arrival_date.is_none() {
            errors.add("arrival_date", "enter a date as YYYY-MM-DD");
        }
        let adoption_fee = parse_fee(&mut errors, &self.adoption_fee);

        match (pet_type, gender, size, status, arrival_date, adoption_fee) {
            (
                Some(pet_type),
                Some(gender),
                Some(size),
                Some(status),
                Some(arrival_date),
                Some(adoption_fee),
            ) => {
                let slug_base = slug_base(explicit_slug.as_deref(), &name);
                errors.finish(NewPet {
                    name,
                    slug_base,
                    pet_type,
                    breed,
                    age,
                    gender,
                    size,
                    color,
                    description,
                    personality: self.personality.clone(),
                    vaccinated: self.vaccinated,
                    spayed_neutered: self.spayed_neutered,
                    microchipped: self.microchipped,
                    special_needs: self.special_needs,
                    special_needs_description,
                    main_image,
                    image_2,
                    image_3,
                    status,
                    arrival_date,
                    adoption_fee,
                    featured: self.featured,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Parses a non-negative fee with at most two decimal places.
fn parse_fee(errors: &mut ValidationErrors, raw: &str) -> Option<BigDecimal> {
    let Ok(fee) = BigDecimal::from_str(raw.trim()) else {
        errors.add("adoption_fee", "enter a decimal amount");
        return None;
    };
    let (_, scale) = fee.as_bigint_and_exponent();
    if fee < BigDecimal::from(0) {
        errors.add("adoption_fee", "must not be negative");
        return None;
    }
    if scale > 2 {
        errors.add("adoption_fee", "at most two decimal places");
        return None;
    }
    if fee >= BigDecimal::from(MAX_FEE_WHOLE) {
        errors.add("adoption_fee", "amount is too large");
        return None;
    }
    Some(fee.with_scale(2))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
