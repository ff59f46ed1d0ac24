// pawhaven-core/src/core/story.rs
// ============================================================================
// Module: PawHaven Success Stories
// Description: Adoption success stories and the staff story form.
// Purpose: Publish adopter stories, optionally linked to the adopted pet.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Success stories are written by staff and read-only to the public. A story
//! may link to a pet; the link is optional and survives independently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;

use crate::core::identifiers::PetId;
use crate::core::identifiers::StoryId;
use crate::core::time::Timestamp;
use crate::core::time::parse_date;
use crate::core::validation::MAX_IMAGE_CHARS;
use crate::core::validation::MAX_NAME_CHARS;
use crate::core::validation::MAX_TEXT_CHARS;
use crate::core::validation::ValidationErrors;
use crate::core::validation::deserialize_flag;
use crate::core::validation::optional_text;
use crate::core::validation::required_text;

/// Maximum featured stories shown on the stories page.
pub const FEATURED_STORY_LIMIT: usize = 3;
/// Maximum characters in a story title.
const MAX_TITLE_CHARS: usize = 200;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored success story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessStory {
    /// Record identifier.
    pub id: StoryId,
    /// Adopted pet, if linked.
    pub pet_id: Option<PetId>,
    /// Adopter display name.
    pub adopter_name: String,
    /// Adoption date.
    pub adoption_date: Date,
    /// Headline.
    pub title: String,
    /// Story body.
    pub story: String,
    /// Image path or URL.
    pub image: Option<String>,
    /// Highlighted at the top of the page.
    pub featured: bool,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Validated story payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    /// Linked pet.
    pub pet_id: Option<PetId>,
    /// Adopter display name.
    pub adopter_name: String,
    /// Adoption date.
    pub adoption_date: Date,
    /// Headline.
    pub title: String,
    /// Story body.
    pub story: String,
    /// Image path or URL.
    pub image: Option<String>,
    /// Featured flag.
    pub featured: bool,
}

impl NewStory {
    /// Builds the stored record once the store has assigned an identifier.
    #[must_use]
    pub fn into_story(self, id: StoryId, now: Timestamp) -> SuccessStory {
        SuccessStory {
            id,
            pet_id: self.pet_id,
            adopter_name: self.adopter_name,
            adoption_date: self.adoption_date,
            title: self.title,
            story: self.story,
            image: self.image,
            featured: self.featured,
            created_at: now,
        }
    }
}

/// Public story listing: every story plus the featured subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryBoard {
    /// All stories, newest adoption first.
    pub stories: Vec<SuccessStory>,
    /// Featured stories, at most [`FEATURED_STORY_LIMIT`].
    pub featured: Vec<SuccessStory>,
}

impl StoryBoard {
    /// Splits an ordered story list into the board.
    #[must_use]
    pub fn from_stories(stories: Vec<SuccessStory>) -> Self {
        let featured = stories
            .iter()
            .filter(|story| story.featured)
            .take(FEATURED_STORY_LIMIT)
            .cloned()
            .collect();
        Self { stories, featured }
    }
}

// ============================================================================
// SECTION: Story Form
// ============================================================================

/// Staff story form, also the record shape for `stories import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryForm {
    /// Linked pet id text.
    pub pet_id: Option<String>,
    /// Adopter display name.
    pub adopter_name: String,
    /// Adoption date as `YYYY-MM-DD`.
    pub adoption_date: String,
    /// Headline.
    pub title: String,
    /// Story body.
    pub story: String,
    /// Image path or URL.
    pub image: Option<String>,
    /// Featured flag.
    #[serde(deserialize_with = "deserialize_flag")]
    pub featured: bool,
}

impl StoryForm {
    /// Validates the form. The pet link is checked for shape only; the
    /// service confirms the pet exists.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field.
    pub fn validate(&self) -> Result<NewStory, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let pet_id = match self.pet_id.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            None => None,
            Some(raw) => {
                let parsed = raw.parse::<u64>().ok().and_then(PetId::from_raw);
                if parsed.is_none() {
                    errors.add("pet_id", "select a valid pet");
                }
                parsed
            }
        };
        let adopter_name =
            required_text(&mut errors, "adopter_name", &self.adopter_name, MAX_NAME_CHARS);
        let adoption_date = parse_date(&self.adoption_date);
        if adoption_date.is_none() {
            errors.add("adoption_date", "enter a date as YYYY-MM-DD");
        }
        let title = required_text(&mut errors, "title", &self.title, MAX_TITLE_CHARS);
        let story = required_text(&mut errors, "story", &self.story, MAX_TEXT_CHARS);
        let image = optional_text(&mut errors, "image", self.image.as_deref(), MAX_IMAGE_CHARS);
        let Some(adoption_date) = adoption_date else {
            return Err(errors);
        };
        errors.finish(NewStory {
            pet_id,
            adopter_name,
            adoption_date,
            title,
            story,
            image,
            featured: self.featured,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "Test fixtures use expect for clarity.")]

    use time::macros::date;

    use super::*;

    fn story(id: u64, featured: bool) -> SuccessStory {
        SuccessStory {
            id: StoryId::from_raw(id).expect("non-zero"),
            pet_id: None,
            adopter_name: "The Parks".to_string(),
            adoption_date: date!(2024 - 02 - 01),
            title: format!("Story {id}"),
            story: "Happy ending.".to_string(),
            image: None,
            featured,
            created_at: Timestamp::from_unix_millis(0),
        }
    }

    #[test]
    fn board_caps_featured_subset() {
        let stories = (1..=6).map(|id| story(id, id != 2)).collect::<Vec<_>>();
        let board = StoryBoard::from_stories(stories);
        assert_eq!(board.stories.len(), 6);
        let featured_ids = board.featured.iter().map(|story| story.id.get()).collect::<Vec<_>>();
        assert_eq!(featured_ids, vec![1, 3, 4]);
    }

    #[test]
    fn story_form_checks_pet_link_shape() {
        let mut form = StoryForm {
            pet_id: Some("0".to_string()),
            adopter_name: "Lee".to_string(),
            adoption_date: "2024-02-10".to_string(),
            title: "Home at last".to_string(),
            story: "Max settled in fast.".to_string(),
            ..StoryForm::default()
        };
        assert!(form.validate().expect_err("zero id").has("pet_id"));
        form.pet_id = Some("12".to_string());
        let new = form.validate().expect("valid");
        assert_eq!(new.pet_id.map(PetId::get), Some(12));
        assert_eq!(new.adoption_date, date!(2024 - 02 - 10));
    }
}
