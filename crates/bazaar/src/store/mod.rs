//! Storage gateway.
//!
//! [`MarketStore`] is the one boundary the request layer talks to. Two
//! implementations satisfy it with identical observable behavior:
//! - [`PgStore`]: PostgreSQL through a `deadpool-postgres` pool
//! - [`MemoryStore`]: a process-local map for tests and local runs
//!
//! Both share the predicate, sort and patch compilers, and both are exercised
//! by the same contract suite under `tests/`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::{StoreError, StoreResult};
use crate::filter::ListingFilter;
use crate::model::{Listing, ListingId, NewListing, User};
use crate::patch::{ListingPatch, UserPatch};
use std::future::Future;

/// Listing and user persistence.
///
/// Outcome conventions:
/// - optional reads return `Ok(None)` for absence
/// - `update_*` return `Ok(false)` when the target does not exist and
///   `Err(NoFieldsToUpdate)` for an empty patch, without touching the store
/// - `delete_listing` returns `Ok(false)` for an unknown identity
/// - transport failures are `Err(StoreUnavailable)`, never a missing row
pub trait MarketStore: Send + Sync {
    /// Insert a listing and return its fresh, never-reused identity.
    fn create_listing(
        &self,
        listing: NewListing,
    ) -> impl Future<Output = StoreResult<ListingId>> + Send;

    /// Insert a user; a second user with the same external id is
    /// `DuplicateIdentity`. Returns the external id.
    fn create_user(&self, user: User) -> impl Future<Output = StoreResult<String>> + Send;

    /// Available listings matching `filter`, in the filter's sort order.
    ///
    /// Without a sort the order is unspecified.
    fn read_listings(
        &self,
        filter: &ListingFilter,
    ) -> impl Future<Output = StoreResult<Vec<Listing>>> + Send;

    fn read_listing_by_id(
        &self,
        id: ListingId,
    ) -> impl Future<Output = StoreResult<Option<Listing>>> + Send;

    /// Every listing of one seller, available or not, ordered by identity.
    fn read_listings_by_owner(
        &self,
        seller_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<Listing>>> + Send;

    fn read_user(
        &self,
        external_id: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    fn update_listing(
        &self,
        id: ListingId,
        patch: &ListingPatch,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    fn update_user(
        &self,
        external_id: &str,
        patch: &UserPatch,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    fn delete_listing(&self, id: ListingId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Read a listing that is expected to exist.
    ///
    /// Returns `StoreError::NotFound` if it does not.
    fn listing(&self, id: ListingId) -> impl Future<Output = StoreResult<Listing>> + Send {
        async move {
            self.read_listing_by_id(id)
                .await?
                .ok_or_else(|| StoreError::not_found(format!("listing {id}")))
        }
    }
}
