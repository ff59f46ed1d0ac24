// pawhaven-core/src/core/mod.rs
// ============================================================================
// Module: PawHaven Core Types
// Description: Shelter records, forms, and listing types.
// Purpose: Provide stable, serializable types shared by stores and the web layer.
// Dependencies: bigdecimal, serde, slug, time
// ============================================================================

//! ## Overview
//! Core types describe every shelter record, the typed forms that create
//! them, and the listing query. They are the single source of truth for the
//! SQLite schema and the rendered pages.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod account;
pub mod application;
pub mod contact;
pub mod identifiers;
pub mod listing;
pub mod pet;
pub mod story;
pub mod time;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use account::Account;
pub use account::LoginForm;
pub use account::NewAccount;
pub use account::ProfileForm;
pub use account::ProfileUpdate;
pub use account::Registration;
pub use account::RegistrationForm;
pub use account::Session;
pub use account::check_password;
pub use account::check_username;
pub use application::AdoptionApplication;
pub use application::ApplicationDetails;
pub use application::ApplicationForm;
pub use application::ApplicationStatus;
pub use application::NewApplication;
pub use application::StatusChange;
pub use contact::ContactAction;
pub use contact::ContactForm;
pub use contact::ContactMessage;
pub use contact::NewContactMessage;
pub use identifiers::AccountId;
pub use identifiers::ApplicationId;
pub use identifiers::ContactMessageId;
pub use identifiers::PetId;
pub use identifiers::SessionToken;
pub use identifiers::StoryId;
pub use listing::DEFAULT_PAGE_SIZE;
pub use listing::Page;
pub use listing::PetQuery;
pub use listing::PetSort;
pub use pet::DEFAULT_NEW_ARRIVAL_DAYS;
pub use pet::NewPet;
pub use pet::Pet;
pub use pet::PetBadge;
pub use pet::PetForm;
pub use pet::PetGender;
pub use pet::PetSize;
pub use pet::PetStatus;
pub use pet::PetType;
pub use pet::slug_base;
pub use pet::unique_slug;
pub use story::FEATURED_STORY_LIMIT;
pub use story::NewStory;
pub use story::StoryBoard;
pub use story::StoryForm;
pub use story::SuccessStory;
pub use time::Timestamp;
pub use validation::FieldError;
pub use validation::ValidationErrors;
