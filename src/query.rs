//! Query orchestrator: request → validate → load → filter → order → paginate.
//!
//! The pipeline is fixed and linear. Validation and snapshot loading are the
//! only stages that can fail; everything after them is a pure transform over
//! in-memory data, so a request either aborts with no result or runs to
//! completion. `totalCount` always reflects the filtered set before the
//! page slice.

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::error::{GalleryError, Result};
use crate::filter::{matches_attributes, matches_search_term};
use crate::models::Nft;
use crate::order::{order_nfts, OrderType};
use crate::page::paginate;
use crate::schema::{AttributeFilters, AttributeSchema};
use crate::snapshot::SnapshotStore;

/// Wire-shaped query parameters (`POST /api/nfts` body).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub contract_address: String,
    pub page_number: i64,
    pub limit_per_page: i64,
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub search_attributes: Option<AttributeFilters>,
    /// Pin this across page fetches to page through one stable shuffle.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

/// One page of results plus the filtered-set size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub nfts: Vec<Nft>,
    pub total_count: usize,
}

/// Snapshot health summary for one collection.
#[derive(Debug, Clone)]
pub struct CollectionStatus {
    pub items: usize,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Items carrying at least one trait the schema does not define.
    pub off_schema: usize,
}

/// Composes the schema, snapshot store, and the pure engines into the
/// request/response pipeline. Stateless across requests; safe to share.
pub struct QueryEngine {
    schema: AttributeSchema,
    store: SnapshotStore,
    options: QueryConfig,
}

impl QueryEngine {
    pub fn new(schema: AttributeSchema, store: SnapshotStore, options: QueryConfig) -> Self {
        Self {
            schema,
            store,
            options,
        }
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Runs the full query pipeline.
    pub fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        self.validate(request)?;

        let snapshot = self.store.load(&request.contract_address)?;
        let mut nfts: Vec<Nft> = snapshot.nfts.clone();

        if let Some(term) = request.search_term.as_deref() {
            if !term.is_empty() {
                nfts.retain(|nft| matches_search_term(nft, term));
            }
        }

        if let Some(filters) = request.search_attributes.as_ref() {
            let filters = prune_empty_categories(filters);
            if !filters.is_empty() {
                nfts.retain(|nft| matches_attributes(nft, &filters));
            }
        }

        let order = request.order_type.unwrap_or_default();
        let nfts = order_nfts(nfts, order, request.shuffle_seed);

        let page = paginate(nfts, request.page_number, request.limit_per_page)?;
        Ok(QueryResult {
            nfts: page.items,
            total_count: page.total_count,
        })
    }

    /// Fetches a single item by token id.
    pub fn get_by_token_id(&self, contract_address: &str, token_id: u64) -> Result<Nft> {
        self.check_collection(contract_address)?;
        let snapshot = self.store.load(contract_address)?;
        snapshot
            .nfts
            .iter()
            .find(|nft| nft.token_id == token_id)
            .cloned()
            .ok_or(GalleryError::TokenNotFound(token_id))
    }

    /// Category → values observed in the dataset, for filter-menu rendering.
    ///
    /// Categories come back in canonical (sorted) order; values keep their
    /// first-seen order within each category.
    pub fn attribute_summary(
        &self,
        contract_address: &str,
    ) -> Result<std::collections::BTreeMap<String, Vec<String>>> {
        self.check_collection(contract_address)?;
        let snapshot = self.store.load(contract_address)?;

        let mut summary = std::collections::BTreeMap::<String, Vec<String>>::new();
        for nft in &snapshot.nfts {
            for (category, value) in &nft.metadata.attributes {
                let values = summary.entry(category.clone()).or_default();
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        Ok(summary)
    }

    /// Snapshot health probe: item count, snapshot timestamp, and how many
    /// items carry traits outside the schema.
    pub fn collection_status(&self, contract_address: &str) -> Result<CollectionStatus> {
        self.check_collection(contract_address)?;
        let snapshot = self.store.load(contract_address)?;
        let off_schema = snapshot
            .nfts
            .iter()
            .filter(|nft| !self.schema.covers(&nft.metadata.attributes))
            .count();
        Ok(CollectionStatus {
            items: snapshot.nfts.len(),
            updated_at: snapshot.updated_at,
            off_schema,
        })
    }

    fn validate(&self, request: &QueryRequest) -> Result<()> {
        if request.page_number < 1 {
            return Err(GalleryError::InvalidPageNumber(request.page_number));
        }
        if request.limit_per_page < 1 {
            return Err(GalleryError::InvalidPageSize(request.limit_per_page));
        }
        if request.limit_per_page > self.options.max_limit {
            return Err(GalleryError::InvalidRequest(format!(
                "limitPerPage must be <= {}, got {}",
                self.options.max_limit, request.limit_per_page
            )));
        }
        self.check_collection(&request.contract_address)?;

        if self.options.enforce_schema {
            if let Some(filters) = request.search_attributes.as_ref() {
                self.schema.validate_filters(filters)?;
            }
        }
        Ok(())
    }

    fn check_collection(&self, contract_address: &str) -> Result<()> {
        if !self.store.contains(contract_address) {
            return Err(GalleryError::UnknownCollection(contract_address.to_string()));
        }
        Ok(())
    }
}

/// Drops categories whose value list is empty so they impose no constraint.
fn prune_empty_categories(filters: &AttributeFilters) -> AttributeFilters {
    filters
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(category, values)| (category.clone(), values.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionConfig;
    use std::path::PathBuf;

    const ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

    /// Five items, token ids 1–5. Items 2 and 4 have `Background = Blue`;
    /// items 1 and 4 have `Avatar = Zombie`. Trait form alternates between
    /// the pair and keyed snapshot generations.
    fn write_fixture(dir: &std::path::Path) -> PathBuf {
        let nfts: Vec<serde_json::Value> = (1u64..=5)
            .map(|id| {
                let background = if id == 2 || id == 4 { "Blue" } else { "Red" };
                let avatar = if id == 1 || id == 4 { "Zombie" } else { "Panda" };
                let attributes = if id % 2 == 0 {
                    serde_json::json!([
                        { "trait_type": "Background", "value": background },
                        { "trait_type": "Avatar", "value": avatar },
                    ])
                } else {
                    serde_json::json!({ "Background": background, "Avatar": avatar })
                };
                serde_json::json!({
                    "token_id": id,
                    "name": format!("ENS Maxis #{}", id),
                    "token_address": ADDRESS,
                    "metadata": {
                        "name": format!("ENS Maxis #{}", id),
                        "image": format!("ipfs://Qm{}", id),
                        "dna": "0a1b2c",
                        "attributes": attributes,
                    },
                })
            })
            .collect();
        let snapshot = serde_json::json!({ "updatedAt": "2023-01-14T00:00:00Z", "nfts": nfts });

        let path = dir.join("ethereum-fixture.json");
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        path
    }

    fn engine(dir: &std::path::Path, options: QueryConfig) -> QueryEngine {
        let snapshot = write_fixture(dir);
        let store = SnapshotStore::new(&[CollectionConfig {
            name: "ENS Maxis".to_string(),
            chain: "ethereum".to_string(),
            contract_address: ADDRESS.to_string(),
            snapshot,
        }]);
        let schema = AttributeSchema::from_categories([
            ("Background", vec!["Blue", "Red"]),
            ("Avatar", vec!["Zombie", "Panda"]),
        ]);
        QueryEngine::new(schema, store, options)
    }

    fn request(page_number: i64, limit_per_page: i64) -> QueryRequest {
        QueryRequest {
            contract_address: ADDRESS.to_string(),
            page_number,
            limit_per_page,
            search_term: None,
            order_type: None,
            search_attributes: None,
            shuffle_seed: None,
        }
    }

    fn attr(category: &str, values: &[&str]) -> AttributeFilters {
        let mut filters = AttributeFilters::new();
        filters.insert(
            category.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        filters
    }

    fn ids(result: &QueryResult) -> Vec<u64> {
        result.nfts.iter().map(|n| n.token_id).collect()
    }

    #[test]
    fn test_attribute_filter_first_page() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(1, 1);
        req.search_attributes = Some(attr("Background", &["Blue"]));
        req.order_type = Some(OrderType::Asc);

        let result = engine.query(&req).unwrap();
        assert_eq!(ids(&result), vec![2]);
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn test_descending_second_page() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(2, 2);
        req.order_type = Some(OrderType::Desc);

        let result = engine.query(&req).unwrap();
        assert_eq!(ids(&result), vec![3, 2]);
        assert_eq!(result.total_count, 5);
    }

    #[test]
    fn test_search_term_counts_trait_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(1, 10);
        req.search_term = Some("zombie".to_string());

        let result = engine.query(&req).unwrap();
        assert_eq!(result.total_count, 2);
        assert_eq!(ids(&result), vec![1, 4]);
    }

    #[test]
    fn test_search_and_attributes_combine() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(1, 10);
        req.search_term = Some("zombie".to_string());
        req.search_attributes = Some(attr("Background", &["Blue"]));

        let result = engine.query(&req).unwrap();
        assert_eq!(ids(&result), vec![4]);
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_empty_value_lists_are_pruned() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(1, 10);
        req.search_attributes = Some(attr("Background", &[]));

        let result = engine.query(&req).unwrap();
        assert_eq!(result.total_count, 5);
    }

    #[test]
    fn test_unknown_collection_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(1, 10);
        req.contract_address = "0x1234".to_string();
        assert!(matches!(
            engine.query(&req).unwrap_err(),
            GalleryError::UnknownCollection(_)
        ));
    }

    #[test]
    fn test_unknown_category_rejected_when_schema_enforced() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut req = request(1, 10);
        req.search_attributes = Some(attr("Socks", &["Wool"]));
        assert!(matches!(
            engine.query(&req).unwrap_err(),
            GalleryError::UnknownCategory(_)
        ));
    }

    #[test]
    fn test_unknown_category_matches_nothing_when_enforcement_off() {
        let tmp = tempfile::tempdir().unwrap();
        let options = QueryConfig {
            enforce_schema: false,
            ..QueryConfig::default()
        };
        let engine = engine(tmp.path(), options);

        let mut req = request(1, 10);
        req.search_attributes = Some(attr("Socks", &["Wool"]));

        let result = engine.query(&req).unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.nfts.is_empty());
    }

    #[test]
    fn test_limit_above_max_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let req = request(1, 1000);
        assert!(matches!(
            engine.query(&req).unwrap_err(),
            GalleryError::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_invalid_page_and_limit_rejected_before_load() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        assert!(matches!(
            engine.query(&request(0, 10)).unwrap_err(),
            GalleryError::InvalidPageNumber(0)
        ));
        assert!(matches!(
            engine.query(&request(1, 0)).unwrap_err(),
            GalleryError::InvalidPageSize(0)
        ));
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let result = engine.query(&request(4, 2)).unwrap();
        assert!(result.nfts.is_empty());
        assert_eq!(result.total_count, 5);
    }

    #[test]
    fn test_seeded_shuffle_pages_partition_the_set() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let mut seen = Vec::new();
        for page_number in 1..=3 {
            let mut req = request(page_number, 2);
            req.order_type = Some(OrderType::Shuffle);
            req.shuffle_seed = Some(42);
            let result = engine.query(&req).unwrap();
            assert_eq!(result.total_count, 5);
            seen.extend(ids(&result));
        }

        let mut sorted = seen.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_get_by_token_id() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let nft = engine.get_by_token_id(ADDRESS, 3).unwrap();
        assert_eq!(nft.name, "ENS Maxis #3");

        assert!(matches!(
            engine.get_by_token_id(ADDRESS, 99).unwrap_err(),
            GalleryError::TokenNotFound(99)
        ));
    }

    #[test]
    fn test_collection_status_reports_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let status = engine.collection_status(ADDRESS).unwrap();
        assert_eq!(status.items, 5);
        assert_eq!(status.off_schema, 0);
        assert_eq!(status.updated_at.timestamp(), 1_673_654_400);
    }

    #[test]
    fn test_attribute_summary_collects_observed_values() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine(tmp.path(), QueryConfig::default());

        let summary = engine.attribute_summary(ADDRESS).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary["Avatar"], vec!["Zombie", "Panda"]);
        let mut backgrounds = summary["Background"].clone();
        backgrounds.sort();
        assert_eq!(backgrounds, vec!["Blue", "Red"]);
    }
}
