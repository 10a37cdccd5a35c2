//! Ordering engine: ascending, descending, and seeded shuffle.
//!
//! `asc` and `desc` are stable with respect to `token_id`, so repeated calls
//! over unchanged data paginate identically. `shuffle` is a Fisher–Yates
//! permutation driven by a caller-supplied seed: a browsing session that
//! pins one seed sees one stable permutation across page fetches. Without a
//! seed each call draws fresh OS entropy, which is only safe for single-page
//! use — the old reshuffle-per-page behavior showed duplicate and missing
//! items across pages and is deliberately not reproduced here.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::GalleryError;
use crate::models::Nft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
    Shuffle,
}

impl std::str::FromStr for OrderType {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(OrderType::Asc),
            "desc" => Ok(OrderType::Desc),
            "shuffle" => Ok(OrderType::Shuffle),
            other => Err(GalleryError::InvalidRequest(format!(
                "orderType must be one of 'asc', 'desc', 'shuffle'; got '{}'",
                other
            ))),
        }
    }
}

/// Reorders `nfts` according to `order`. `seed` only affects `shuffle`.
pub fn order_nfts(mut nfts: Vec<Nft>, order: OrderType, seed: Option<u64>) -> Vec<Nft> {
    match order {
        OrderType::Asc => {
            nfts.sort_by_key(|n| n.token_id);
        }
        OrderType::Desc => {
            nfts.sort_by_key(|n| n.token_id);
            nfts.reverse();
        }
        OrderType::Shuffle => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            nfts.shuffle(&mut rng);
        }
    }
    nfts
}
