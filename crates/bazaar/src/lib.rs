//! # bazaar
//!
//! Dynamic query and partial-update engine for a campus marketplace.
//!
//! ## Features
//!
//! - **Structured filters**: [`ListingFilter`] compiles to an [`Expr`] tree, never to
//!   SQL spliced from caller text
//! - **Deterministic sorting**: closed set of [`SortOrder`] tokens, ties broken by identity
//! - **Sparse updates**: [`ListingPatch`] / [`UserPatch`] write only the fields they carry
//! - **Two interchangeable stores**: [`PgStore`] (PostgreSQL) and [`MemoryStore`]
//!   implement [`MarketStore`] with the same observable behavior
//!
//! ## Example
//!
//! ```ignore
//! use bazaar::{ListingFilter, ListingPatch, MarketStore, PgStore, SortOrder, StoreConfig};
//!
//! let store = PgStore::connect(&StoreConfig::from_env()?)?;
//! store.ensure_schema().await?;
//!
//! let cheap = store
//!     .read_listings(
//!         &ListingFilter::new()
//!             .category("Other")
//!             .max_price(150.0)
//!             .sort(SortOrder::PriceAsc),
//!     )
//!     .await?;
//!
//! store
//!     .update_listing(cheap[0].id, &ListingPatch::new().title("Mountain Bike"))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod monitor;
pub mod patch;
pub mod pool;
pub mod predicate;
pub mod query;
pub mod row;
pub mod schema;
pub mod sort;
pub mod store;
pub mod value;

pub use client::GenericClient;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use filter::ListingFilter;
pub use model::{Institution, Listing, ListingId, NewListing, User};
pub use patch::{ListingPatch, Mutation, UserPatch};
pub use pool::create_pool;
pub use predicate::{CmpOp, Expr, Predicate};
pub use query::{CompiledSql, compile_listing_query, select_records};
pub use row::{FromRow, RowExt};
pub use schema::{Column, ListingColumn, Record, UserColumn, ensure_schema};
pub use sort::SortOrder;
pub use store::{MarketStore, MemoryStore, PgStore};
pub use value::{FieldRef, ParamList, Value};
