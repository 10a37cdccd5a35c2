//! # ENS Gallery
//!
//! Query backend for the ENS Maxis NFT collection gallery.
//!
//! The gallery frontend renders a paginated, filterable grid of collection
//! items. This crate is the engine behind it: it reads the immutable JSON
//! snapshot maintained by the external ingestion job and answers
//! filter/search/order/paginate queries over it, via an HTTP API and a CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────────────────────────────┐
//! │ Snapshot  │──▶│           Query engine             │
//! │ JSON file │   │ filter → order → paginate          │
//! └───────────┘   └────────────────┬──────────────────┘
//!                                  │
//!                     ┌────────────┤
//!                     ▼            ▼
//!                ┌─────────┐  ┌─────────┐
//!                │   CLI   │  │  HTTP   │
//!                │ (ensg)  │  │  (API)  │
//!                └─────────┘  └─────────┘
//! ```
//!
//! The snapshot is read-only from this crate's point of view; the ingestion
//! job replaces it atomically on its own schedule.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Collection items and the snapshot format |
//! | [`schema`] | Trait categories and allowed values |
//! | [`snapshot`] | Snapshot loading and caching |
//! | [`filter`] | Search-term and attribute predicates |
//! | [`order`] | Ascending/descending/seeded-shuffle ordering |
//! | [`page`] | Page slicing and total counts |
//! | [`query`] | Request validation and the query pipeline |
//! | [`server`] | JSON HTTP API |
//! | [`error`] | Engine error taxonomy |

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod order;
pub mod page;
pub mod query;
pub mod schema;
pub mod server;
pub mod snapshot;
