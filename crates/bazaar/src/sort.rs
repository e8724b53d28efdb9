//! Sort policy for listing reads.

use crate::error::{StoreError, StoreResult};
use crate::model::Listing;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Recognized orderings for listing reads.
///
/// Listings with equal price are ordered by ascending identity in both
/// directions, so the result sequence is fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "PRICE_ASC")]
    PriceAsc,
    #[serde(rename = "PRICE_DESC")]
    PriceDesc,
}

impl SortOrder {
    /// The accepted tokens, as reported in `InvalidSort` errors.
    pub const ALLOWED: &'static str = "PRICE_ASC, PRICE_DESC";

    /// Parse an optional token; `None` means "no ordering".
    pub fn parse_opt(token: Option<&str>) -> StoreResult<Option<Self>> {
        token.map(str::parse).transpose()
    }

    pub fn token(self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "PRICE_ASC",
            SortOrder::PriceDesc => "PRICE_DESC",
        }
    }

    /// ORDER BY clause body.
    pub fn order_by(self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price ASC, id ASC",
            SortOrder::PriceDesc => "price DESC, id ASC",
        }
    }

    /// In-memory equivalent of [`SortOrder::order_by`].
    pub fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        let by_price = match self {
            SortOrder::PriceAsc => a.price.total_cmp(&b.price),
            SortOrder::PriceDesc => b.price.total_cmp(&a.price),
        };
        by_price.then(a.id.cmp(&b.id))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRICE_ASC" => Ok(SortOrder::PriceAsc),
            "PRICE_DESC" => Ok(SortOrder::PriceDesc),
            other => Err(StoreError::InvalidSort {
                token: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}
