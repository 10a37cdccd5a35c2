//! Core data models: collection items and the on-disk snapshot format.
//!
//! Snapshot files are written by the external ingestion job and read by the
//! [`crate::snapshot`] accessor. Two snapshot generations exist in the wild:
//! one stores item traits as an array of `{ "trait_type": ..., "value": ... }`
//! pairs, the other as a keyed `{ category: value }` object. Both are
//! normalized into a single canonical [`TraitMap`] at deserialization time so
//! the predicate engine only ever sees one representation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Canonical `category → value` trait mapping for one item.
pub type TraitMap = BTreeMap<String, String>;

/// One collection entry.
///
/// Only `token_id`, `name`, and `metadata` participate in query evaluation.
/// Every other descriptive field (`token_address`, `token_hash`,
/// `contract_type`, sync timestamps, ...) is carried through `extra`
/// untouched and survives a load→serialize round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nft {
    pub token_id: u64,
    #[serde(default)]
    pub name: String,
    pub metadata: NftMetadata,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Display metadata attached to an item.
///
/// `image` and `dna` are the designated large/opaque fields: the search
/// predicate never looks at them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dna: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, deserialize_with = "deserialize_traits")]
    pub attributes: TraitMap,
}

/// On-disk snapshot format produced by the ingestion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub updated_at: DateTime<Utc>,
    pub nfts: Vec<Nft>,
}

/// Trait representation as found in snapshot files, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTraits {
    /// `[{ "trait_type": "Background", "value": "Blue" }, ...]`
    Pairs(Vec<TraitPair>),
    /// `{ "Background": "Blue", ... }`
    Keyed(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitPair {
    pub trait_type: String,
    pub value: serde_json::Value,
}

/// Converts either historical trait representation into the canonical
/// `category → value` mapping.
///
/// Non-string values are rendered with their JSON text (`7` → `"7"`), null
/// values are dropped, and a category repeated in pair form keeps the last
/// occurrence.
pub fn normalize_traits(raw: RawTraits) -> TraitMap {
    let mut traits = TraitMap::new();
    match raw {
        RawTraits::Pairs(pairs) => {
            for pair in pairs {
                if let Some(value) = trait_value_to_string(pair.value) {
                    traits.insert(pair.trait_type, value);
                }
            }
        }
        RawTraits::Keyed(map) => {
            for (category, value) in map {
                if let Some(value) = trait_value_to_string(value) {
                    traits.insert(category, value);
                }
            }
        }
    }
    traits
}

fn trait_value_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn deserialize_traits<'de, D>(deserializer: D) -> Result<TraitMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawTraits::deserialize(deserializer)?;
    Ok(normalize_traits(raw))
}
