// pawhaven-web/src/query.rs
// ============================================================================
// Module: Query Strings
// Description: Raw query-string decoding for listing and filter parameters.
// Purpose: Support repeated keys such as `size` that typed extractors drop.
// Dependencies: url, pawhaven-core
// ============================================================================

//! ## Overview
//! The browse page accepts repeated `size` parameters, so it decodes the
//! raw query with `form_urlencoded` instead of a typed extractor. Page links
//! keep every filter and replace only `page`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use pawhaven_core::PetQuery;
use url::form_urlencoded;

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a raw query string into key/value pairs.
#[must_use]
pub fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|raw| form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Parses the browse parameters.
#[must_use]
pub fn pet_query(raw: Option<&str>) -> PetQuery {
    PetQuery::from_pairs(query_pairs(raw))
}

// ============================================================================
// SECTION: Links
// ============================================================================

/// Builds a `/pets` link for `page`, keeping every other parameter except
/// transient notices.
#[must_use]
pub fn page_link(pairs: &[(String, String)], page: usize) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        if name != "page" && name != "notice" {
            serializer.append_pair(name, value);
        }
    }
    serializer.append_pair("page", &page.to_string());
    format!("/pets?{}", serializer.finish())
}
