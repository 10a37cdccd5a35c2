//! # ENS Gallery CLI (`ensg`)
//!
//! The `ensg` binary runs the gallery API server and exercises the query
//! engine from the command line.
//!
//! ## Usage
//!
//! ```bash
//! ensg --config ./config/gallery.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ensg serve` | Start the gallery HTTP API server |
//! | `ensg query <contract>` | Filter/search/order/paginate from the CLI |
//! | `ensg get <contract> <token_id>` | Print a single item as JSON |
//! | `ensg attributes <contract>` | Print category → observed values |
//! | `ensg collections` | List configured collections and snapshot health |
//!
//! ## Examples
//!
//! ```bash
//! # Serve the API
//! ensg serve --config ./config/gallery.toml
//!
//! # Page 2 of the Blue-background zombies, newest first
//! ensg query 0xdead... --attr Background=Blue --search zombie --order desc --page 2
//!
//! # Stable shuffle: the same seed pages through one permutation
//! ensg query 0xdead... --order shuffle --seed 42 --page 1
//! ```

mod config;
mod error;
mod filter;
mod models;
mod order;
mod page;
mod query;
mod schema;
mod server;
mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{load_config, Config};
use crate::order::OrderType;
use crate::query::{QueryEngine, QueryRequest};
use crate::schema::{AttributeFilters, AttributeSchema};
use crate::snapshot::SnapshotStore;

/// ENS Gallery CLI — query backend for the ENS Maxis collection gallery.
#[derive(Parser)]
#[command(
    name = "ensg",
    about = "ENS Gallery — query backend for the ENS Maxis NFT collection gallery",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gallery.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the gallery HTTP API server.
    ///
    /// Binds to `[server].bind` and serves the query API with CORS open to
    /// the gallery frontend.
    Serve,

    /// Run a query against a collection and print the resulting page.
    Query {
        /// Collection contract address.
        contract_address: String,

        /// Free-text search term (matched against names and traits).
        #[arg(long)]
        search: Option<String>,

        /// Attribute filter as `Category=Value`; repeat for more values or
        /// categories. Values for the same category are OR'd, categories
        /// are AND'd.
        #[arg(long = "attr", value_parser = parse_key_val)]
        attrs: Vec<(String, String)>,

        /// Result order: `asc`, `desc`, or `shuffle`.
        #[arg(long, default_value = "asc")]
        order: String,

        /// Shuffle seed. Pin one seed to page through a stable shuffle.
        #[arg(long)]
        seed: Option<u64>,

        /// 1-indexed page number.
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Items per page. Defaults to `query.default_limit` from config.
        #[arg(long)]
        limit: Option<i64>,

        /// Print the full page as JSON instead of a summary listing.
        #[arg(long)]
        json: bool,
    },

    /// Print a single item as JSON.
    Get {
        /// Collection contract address.
        contract_address: String,
        /// Token id of the item.
        token_id: u64,
    },

    /// Print category → observed values for a collection's snapshot.
    Attributes {
        /// Collection contract address.
        contract_address: String,

        /// Print the built-in trait schema (all legal values) instead of
        /// the values observed in the snapshot.
        #[arg(long)]
        schema: bool,
    },

    /// List configured collections and snapshot health.
    Collections,
}

/// Parse a single `Category=Value` pair.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid Category=Value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn build_engine(config: &Config) -> QueryEngine {
    QueryEngine::new(
        AttributeSchema::ens_maxis(),
        SnapshotStore::new(&config.collections),
        config.query.clone(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Query {
            contract_address,
            search,
            attrs,
            order,
            seed,
            page,
            limit,
            json,
        } => {
            let engine = build_engine(&cfg);

            let mut filters = AttributeFilters::new();
            for (category, value) in attrs {
                filters.entry(category).or_default().push(value);
            }

            let request = QueryRequest {
                contract_address,
                page_number: page,
                limit_per_page: limit.unwrap_or(cfg.query.default_limit),
                search_term: search,
                order_type: Some(order.parse::<OrderType>()?),
                search_attributes: if filters.is_empty() {
                    None
                } else {
                    Some(filters)
                },
                shuffle_seed: seed,
            };

            let result = engine.query(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "page {} ({} per page), total matches: {}",
                    page, request.limit_per_page, result.total_count
                );
                for nft in &result.nfts {
                    println!("{:>6}  {}", nft.token_id, nft.name);
                }
            }
        }
        Commands::Get {
            contract_address,
            token_id,
        } => {
            let engine = build_engine(&cfg);
            let nft = engine.get_by_token_id(&contract_address, token_id)?;
            println!("{}", serde_json::to_string_pretty(&nft)?);
        }
        Commands::Attributes {
            contract_address,
            schema,
        } => {
            let engine = build_engine(&cfg);
            if schema {
                for category in engine.schema().categories() {
                    let values = engine.schema().values_for(category)?;
                    println!("{}: {}", category, values.join(", "));
                }
            } else {
                let summary = engine.attribute_summary(&contract_address)?;
                for (category, values) in summary {
                    println!("{}: {}", category, values.join(", "));
                }
            }
        }
        Commands::Collections => {
            let engine = build_engine(&cfg);
            println!(
                "{:<24} {:<10} {:<8} {:<6} UPDATED",
                "COLLECTION", "CHAIN", "STATUS", "ITEMS"
            );
            for collection in &cfg.collections {
                match engine.collection_status(&collection.contract_address) {
                    Ok(status) => {
                        let drift = if status.off_schema > 0 {
                            format!("  ({} items off-schema)", status.off_schema)
                        } else {
                            String::new()
                        };
                        println!(
                            "{:<24} {:<10} {:<8} {:<6} {}{}",
                            collection.name,
                            collection.chain,
                            "OK",
                            status.items,
                            status.updated_at,
                            drift
                        );
                    }
                    Err(e) => println!(
                        "{:<24} {:<10} {:<8} ({})",
                        collection.name, collection.chain, "ERROR", e
                    ),
                }
            }
        }
    }

    Ok(())
}
