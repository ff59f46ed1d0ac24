// pawhaven-core/src/core/listing.rs
// ============================================================================
// Module: PawHaven Listing Filter
// Description: Public pet search, filtering, sorting, and pagination.
// Purpose: Turn browse query parameters into one page of available pets.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The pet listing only ever shows available pets. Query parameters narrow
//! that population (search, type, sizes, age, special needs), choose an
//! order, and select a page. Nothing here can fail: unknown values either
//! match nothing or fall back to defaults, and page numbers clamp.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use serde::Serialize;

use crate::core::pet::Pet;
use crate::core::pet::PetStatus;
use crate::core::validation::is_truthy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Pets per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 9;
/// Sentinel selecting every type or age.
const ALL_SENTINEL: &str = "all";

// ============================================================================
// SECTION: Sort Order
// ============================================================================

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PetSort {
    /// Most recent arrival first.
    #[default]
    Newest,
    /// Earliest arrival first.
    Oldest,
    /// Alphabetical by name.
    Name,
}

impl PetSort {
    /// Parses a sort key; absent or unknown keys select [`PetSort::Newest`].
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("name") => Self::Name,
            _ => Self::Newest,
        }
    }

    /// Returns the query-string key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Name => "name",
        }
    }

    /// Compares two pets under this order.
    #[must_use]
    pub fn compare(self, a: &Pet, b: &Pet) -> Ordering {
        match self {
            Self::Newest => {
                b.arrival_date.cmp(&a.arrival_date).then_with(|| compare_names(a, b))
            }
            Self::Oldest => {
                a.arrival_date.cmp(&b.arrival_date).then_with(|| compare_names(a, b))
            }
            Self::Name => compare_names(a, b),
        }
    }
}

/// Orders pets by name, then by id for a stable total order.
fn compare_names(a: &Pet, b: &Pet) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

// ============================================================================
// SECTION: Query
// ============================================================================

/// Parsed browse parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PetQuery {
    /// Free-text search over name, breed, and description.
    pub search: Option<String>,
    /// Exact species filter.
    #[serde(rename = "type")]
    pub pet_type: Option<String>,
    /// Accepted sizes; empty means any size.
    pub sizes: Vec<String>,
    /// Substring filter on the age text.
    pub age: Option<String>,
    /// Only pets with special needs.
    pub special_needs: bool,
    /// Listing order.
    pub sort: PetSort,
    /// Raw page parameter.
    pub page: Option<String>,
}

impl PetQuery {
    /// Builds a query from decoded query-string pairs. `size` may repeat;
    /// for every other key the last value wins.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "search" => query.search = non_blank(value),
                "type" => query.pet_type = non_blank(value),
                "size" => {
                    if let Some(size) = non_blank(value) {
                        query.sizes.push(size);
                    }
                }
                "age" => query.age = non_blank(value),
                "specialNeeds" => query.special_needs = is_truthy(value),
                "sort" => query.sort = PetSort::parse(Some(value)),
                "page" => query.page = non_blank(value),
                _ => {}
            }
        }
        query
    }

    /// Returns true when `pet` is available and passes every filter.
    #[must_use]
    pub fn matches(&self, pet: &Pet) -> bool {
        pet.status == PetStatus::Available
            && self.matches_search(pet)
            && self.matches_type(pet)
            && self.matches_size(pet)
            && self.matches_age(pet)
            && (!self.special_needs || pet.special_needs)
    }

    /// Filters, sorts, and paginates `pets` into one page.
    #[must_use]
    pub fn apply(&self, pets: Vec<Pet>, page_size: usize) -> Page<Pet> {
        let mut matched: Vec<Pet> = pets.into_iter().filter(|pet| self.matches(pet)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));
        Page::paginate(matched, self.page.as_deref(), page_size)
    }

    /// Returns true when any filter narrows the listing.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.search.is_some()
            || self.effective_type().is_some()
            || !self.sizes.is_empty()
            || self.effective_age().is_some()
            || self.special_needs
    }

    /// Case-insensitive OR match over name, breed, and description.
    fn matches_search(&self, pet: &Pet) -> bool {
        let Some(search) = self.search.as_deref() else {
            return true;
        };
        let needle = search.to_lowercase();
        [&pet.name, &pet.breed, &pet.description]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Exact species match unless the selector is absent or the sentinel.
    fn matches_type(&self, pet: &Pet) -> bool {
        self.effective_type().is_none_or(|kind| kind == pet.pet_type.as_str())
    }

    /// Set membership over the selected sizes.
    fn matches_size(&self, pet: &Pet) -> bool {
        self.sizes.is_empty() || self.sizes.iter().any(|size| size == pet.size.as_str())
    }

    /// Case-insensitive substring match on the age text.
    fn matches_age(&self, pet: &Pet) -> bool {
        self.effective_age()
            .is_none_or(|age| pet.age.to_lowercase().contains(&age.to_lowercase()))
    }

    /// Type selector with the sentinel removed.
    fn effective_type(&self) -> Option<&str> {
        self.pet_type.as_deref().filter(|kind| *kind != ALL_SENTINEL)
    }

    /// Age selector with the sentinel removed.
    fn effective_age(&self) -> Option<&str> {
        self.age.as_deref().filter(|age| *age != ALL_SENTINEL)
    }
}

/// Returns the trimmed value, or `None` when blank.
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// One page of results.
///
/// # Invariants
/// - `1 <= number <= total_pages`; `total_pages >= 1` even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: usize,
    /// Page size used.
    pub page_size: usize,
    /// Total matching items across all pages.
    pub total_items: usize,
    /// Total page count.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slices `items` into the requested page, clamping the page number.
    /// A zero page size is treated as one.
    #[must_use]
    pub fn paginate(items: Vec<T>, requested: Option<&str>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let number = resolve_page_number(requested, total_pages);
        let start = (number - 1) * page_size;
        let items = items.into_iter().skip(start).take(page_size).collect();
        Self { items, number, page_size, total_items, total_pages }
    }

    /// Returns true when a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Returns true when a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Maps the items while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Resolves a raw page parameter to a valid page number. `last` selects the
/// final page; non-numeric input selects the first page.
fn resolve_page_number(requested: Option<&str>, total_pages: usize) -> usize {
    let Some(raw) = requested.map(str::trim) else {
        return 1;
    };
    if raw == "last" {
        return total_pages;
    }
    match raw.parse::<i64>() {
        Ok(value) if value < 1 => 1,
        Ok(value) => usize::try_from(value).map_or(total_pages, |value| value.min(total_pages)),
        Err(_) => 1,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parse_defaults_to_newest() {
        assert_eq!(PetSort::parse(None), PetSort::Newest);
        assert_eq!(PetSort::parse(Some("oldest")), PetSort::Oldest);
        assert_eq!(PetSort::parse(Some("name")), PetSort::Name);
        assert_eq!(PetSort::parse(Some("price")), PetSort::Newest);
    }

    #[test]
    fn from_pairs_collects_repeated_sizes() {
        let query = PetQuery::from_pairs([
            ("search", " lab "),
            ("type", "dog"),
            ("size", "Small"),
            ("size", "Large"),
            ("size", ""),
            ("specialNeeds", "on"),
            ("sort", "name"),
            ("page", "2"),
            ("utm_source", "mail"),
        ]);
        assert_eq!(query.search.as_deref(), Some("lab"));
        assert_eq!(query.sizes, vec!["Small", "Large"]);
        assert!(query.special_needs);
        assert_eq!(query.sort, PetSort::Name);
        assert_eq!(query.page.as_deref(), Some("2"));
        assert!(query.is_filtered());
    }

    #[test]
    fn special_needs_flag_ignores_falsy_values() {
        assert!(!PetQuery::from_pairs([("specialNeeds", "0")]).special_needs);
        assert!(!PetQuery::from_pairs([("specialNeeds", "false")]).special_needs);
        assert!(!PetQuery::from_pairs([("type", "all"), ("age", "all")]).is_filtered());
    }

    #[test]
    fn page_numbers_clamp() {
        let items: Vec<u32> = (1..=20).collect();
        let page = Page::paginate(items.clone(), Some("99"), 9);
        assert_eq!((page.number, page.total_pages, page.items.len()), (3, 3, 2));
        let page = Page::paginate(items.clone(), Some("-4"), 9);
        assert_eq!(page.number, 1);
        let page = Page::paginate(items.clone(), Some("abc"), 9);
        assert_eq!(page.number, 1);
        let page = Page::paginate(items, Some("last"), 9);
        assert_eq!(page.items, vec![19, 20]);
        assert!(page.has_previous() && !page.has_next());
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = Page::<u32>::paginate(Vec::new(), Some("3"), 9);
        assert_eq!((page.number, page.total_pages, page.total_items), (1, 1, 0));
        assert!(!page.has_previous() && !page.has_next());
    }
}
