//! Predicate engine: free-text search and structured attribute matching.
//!
//! Both predicates are pure functions of `(item, request)`. An item must
//! satisfy both to appear in a filtered result.
//!
//! Attribute semantics: AND across categories, OR within a category. Each
//! category present in the filter with a non-empty value list must match one
//! of its requested values (case-insensitively); categories absent or with
//! an empty list impose no constraint. An earlier revision of this system
//! matched when any single category hit; that behavior was rejected in favor
//! of the conventional faceted-filter semantics above.

use crate::models::Nft;
use crate::schema::AttributeFilters;

/// Lowercase textual projection of an item: display names plus every
/// `category value` trait pair. The large/opaque fields (`image`, `dna`)
/// are excluded so they can never produce a match.
pub fn search_haystack(nft: &Nft) -> String {
    let mut haystack = String::new();
    haystack.push_str(&nft.name);
    haystack.push(' ');
    haystack.push_str(&nft.metadata.name);
    for (category, value) in &nft.metadata.attributes {
        haystack.push(' ');
        haystack.push_str(category);
        haystack.push(' ');
        haystack.push_str(value);
    }
    haystack.to_lowercase()
}

/// True iff the item's haystack contains the term, case-insensitively.
/// An empty term is vacuously true.
pub fn matches_search_term(nft: &Nft, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    search_haystack(nft).contains(&term.to_lowercase())
}

/// True iff the item satisfies every category constraint in `filters`.
///
/// An item missing a value for a requested category fails that category's
/// constraint. Unknown categories in the filter therefore match nothing
/// rather than erroring — schema validation happens upstream, when enabled.
pub fn matches_attributes(nft: &Nft, filters: &AttributeFilters) -> bool {
    filters.iter().all(|(category, values)| {
        if values.is_empty() {
            return true;
        }
        match nft.metadata.attributes.get(category) {
            Some(item_value) => values.iter().any(|v| v.eq_ignore_ascii_case(item_value)),
            None => false,
        }
    })
}
