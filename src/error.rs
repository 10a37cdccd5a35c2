//! Error types for the gallery query engine.
//!
//! Every engine function returns a [`GalleryError`] through the [`Result`]
//! alias rather than panicking. The HTTP server and the CLI are the only
//! places that map these errors onto status codes or exit codes; see
//! `server::classify_error`.

use thiserror::Error;

/// The main error type for gallery query operations.
///
/// Everything except [`GalleryError::DatasetUnavailable`] is a validation
/// failure: the caller can fix it by correcting the request. A missing or
/// corrupt snapshot is the one failure the caller can only retry.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Malformed request body or out-of-range field.
    #[error("failed to validate request: {0}")]
    InvalidRequest(String),

    /// Contract address not present in the configured collections.
    #[error("invalid contract address '{0}'; not a configured collection")]
    UnknownCollection(String),

    /// Attribute filter references a category the schema does not define.
    #[error("unknown attribute category '{0}'")]
    UnknownCategory(String),

    /// Attribute filter requests a value the schema does not allow.
    #[error("unknown value '{value}' for attribute category '{category}'")]
    UnknownValue { category: String, value: String },

    /// `pageNumber` must be 1-indexed and positive.
    #[error("pageNumber must be a positive integer, got {0}")]
    InvalidPageNumber(i64),

    /// `limitPerPage` must be positive.
    #[error("limitPerPage must be a positive integer, got {0}")]
    InvalidPageSize(i64),

    /// No item with the requested token id in the collection.
    #[error("no item found with token id '{0}'")]
    TokenNotFound(u64),

    /// Snapshot file missing, unreadable, or malformed.
    #[error("snapshot unavailable for '{collection}': {reason}")]
    DatasetUnavailable { collection: String, reason: String },
}

impl GalleryError {
    /// True for errors the caller can fix by correcting the request.
    pub fn is_validation(&self) -> bool {
        !matches!(self, GalleryError::DatasetUnavailable { .. })
    }

    /// Field-level detail carried in the wire response `info` payload.
    pub fn info(&self) -> Option<serde_json::Value> {
        match self {
            GalleryError::InvalidRequest(detail) => {
                Some(serde_json::json!({ "detail": detail }))
            }
            GalleryError::UnknownCollection(address) => {
                Some(serde_json::json!({ "field": "contractAddress", "received": address }))
            }
            GalleryError::UnknownCategory(category) => {
                Some(serde_json::json!({ "field": "searchAttributes", "category": category }))
            }
            GalleryError::UnknownValue { category, value } => Some(serde_json::json!({
                "field": "searchAttributes",
                "category": category,
                "value": value,
            })),
            GalleryError::InvalidPageNumber(n) => {
                Some(serde_json::json!({ "field": "pageNumber", "received": n }))
            }
            GalleryError::InvalidPageSize(n) => {
                Some(serde_json::json!({ "field": "limitPerPage", "received": n }))
            }
            GalleryError::TokenNotFound(id) => {
                Some(serde_json::json!({ "field": "tokenId", "received": id }))
            }
            GalleryError::DatasetUnavailable { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
