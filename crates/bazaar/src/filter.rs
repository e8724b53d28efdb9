//! Filter criteria for listing reads.

use crate::error::StoreResult;
use crate::predicate::Expr;
use crate::schema::ListingColumn;
use crate::sort::SortOrder;
use serde::{Deserialize, Serialize};

/// Transient, fully optional constraints for a listing read.
///
/// Absent fields impose no constraint. Numeric bounds are expected to be
/// parsed and sanity-checked by the calling layer; an inverted range simply
/// matches nothing, and a NaN bound is treated as absent.
///
/// # Example
/// ```ignore
/// let filter = ListingFilter::new()
///     .category("Other")
///     .max_price(150.0)
///     .sort(SortOrder::PriceAsc);
/// let listings = store.read_listings(&filter).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive substring of the title; trimmed before matching.
    pub title: Option<String>,
    /// Exact, case-sensitive category.
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// A listing matches when it carries at least one of these tags.
    #[serde(default)]
    pub tags: Vec<String>,
    pub sort: Option<SortOrder>,
}

impl ListingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Inclusive lower price bound. NaN imposes no constraint.
    pub fn min_price(mut self, min: f64) -> Self {
        self.min_price = Some(min);
        self
    }

    /// Inclusive upper price bound. NaN imposes no constraint.
    pub fn max_price(mut self, max: f64) -> Self {
        self.max_price = Some(max);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    /// Set the ordering from a raw token (`PRICE_ASC` / `PRICE_DESC`).
    ///
    /// `None` clears the ordering; any other token is `InvalidSort`.
    pub fn sort_token(mut self, token: Option<&str>) -> StoreResult<Self> {
        self.sort = SortOrder::parse_opt(token)?;
        Ok(self)
    }

    /// Compose the restriction for this filter.
    ///
    /// The baseline `available = TRUE` is always present; every supplied field
    /// adds one conjunct, and the tag set contributes a single OR group.
    pub fn predicate(&self) -> Expr<ListingColumn> {
        let mut clauses = vec![Expr::eq(ListingColumn::Available, true)];

        if let Some(title) = self.title.as_deref().map(str::trim)
            && !title.is_empty()
        {
            clauses.push(Expr::contains_ignore_case(ListingColumn::Title, title));
        }

        if let Some(category) = &self.category {
            clauses.push(Expr::eq(ListingColumn::Category, category.as_str()));
        }

        // PostgreSQL sorts NaN above every float8, so a NaN bound would
        // match differently than the in-memory comparison; drop it.
        if let Some(min) = self.min_price.filter(|v| !v.is_nan()) {
            clauses.push(Expr::gte(ListingColumn::Price, min));
        }

        if let Some(max) = self.max_price.filter(|v| !v.is_nan()) {
            clauses.push(Expr::lte(ListingColumn::Price, max));
        }

        if !self.tags.is_empty() {
            let any_tag = self
                .tags
                .iter()
                .map(|tag| Expr::has_element(ListingColumn::Tags, tag.as_str()))
                .collect();
            clauses.push(Expr::or(any_tag));
        }

        Expr::and(clauses)
    }
}
