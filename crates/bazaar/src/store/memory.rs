use super::MarketStore;
use crate::error::{StoreError, StoreResult};
use crate::filter::ListingFilter;
use crate::model::{Listing, ListingId, NewListing, User};
use crate::patch::{ListingPatch, Mutation, UserPatch};
use crate::predicate::Expr;
use crate::schema::{ListingColumn, Record};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct State {
    listings: HashMap<ListingId, Listing>,
    users: HashMap<String, User>,
    next_listing_id: ListingId,
}

impl Default for State {
    fn default() -> Self {
        Self {
            listings: HashMap::new(),
            users: HashMap::new(),
            next_listing_id: 1,
        }
    }
}

/// In-process store.
///
/// One lock guards the whole state: writers are serialized and every read
/// sees a consistent snapshot. Filters and patches are evaluated through the
/// same [`Expr`] and [`Mutation`] values the PostgreSQL store renders to SQL.
///
/// Listings are kept in a hash map, so an unsorted read returns them in an
/// arbitrary order that can change between calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }

    fn select(&self, restriction: &Expr<ListingColumn>) -> StoreResult<Vec<Listing>> {
        let state = self.read()?;
        Ok(state
            .listings
            .values()
            .filter(|listing| restriction.matches(*listing))
            .cloned()
            .collect())
    }
}

/// Apply `mutation` to a copy of `record` and swap it in only if every
/// assignment succeeded.
fn apply_atomically<R: Record>(record: &mut R, mutation: &Mutation<R::Column>) -> StoreResult<()> {
    let mut updated = record.clone();
    mutation.apply_to(&mut updated)?;
    *record = updated;
    Ok(())
}

impl MarketStore for MemoryStore {
    async fn create_listing(&self, listing: NewListing) -> StoreResult<ListingId> {
        listing.validate()?;
        let mut state = self.write()?;
        let id = state.next_listing_id;
        state.next_listing_id += 1;
        state.listings.insert(id, listing.into_listing(id));
        Ok(id)
    }

    async fn create_user(&self, user: User) -> StoreResult<String> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.external_id) {
            return Err(StoreError::DuplicateIdentity(format!(
                "user '{}'",
                user.external_id
            )));
        }
        let id = user.external_id.clone();
        state.users.insert(id.clone(), user);
        Ok(id)
    }

    async fn read_listings(&self, filter: &ListingFilter) -> StoreResult<Vec<Listing>> {
        let mut listings = self.select(&filter.predicate())?;
        if let Some(order) = filter.sort {
            listings.sort_by(|a, b| order.compare(a, b));
        }
        Ok(listings)
    }

    async fn read_listing_by_id(&self, id: ListingId) -> StoreResult<Option<Listing>> {
        Ok(self.read()?.listings.get(&id).cloned())
    }

    async fn read_listings_by_owner(&self, seller_id: &str) -> StoreResult<Vec<Listing>> {
        let mut listings = self.select(&Expr::eq(ListingColumn::SellerId, seller_id))?;
        listings.sort_by_key(|listing| listing.id);
        Ok(listings)
    }

    async fn read_user(&self, external_id: &str) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(external_id).cloned())
    }

    async fn update_listing(&self, id: ListingId, patch: &ListingPatch) -> StoreResult<bool> {
        let mutation = patch.compile(id)?;
        let mut state = self.write()?;
        match state.listings.get_mut(&id) {
            Some(listing) => apply_atomically(listing, &mutation).map(|()| true),
            None => Ok(false),
        }
    }

    async fn update_user(&self, external_id: &str, patch: &UserPatch) -> StoreResult<bool> {
        let mutation = patch.compile(external_id)?;
        let mut state = self.write()?;
        match state.users.get_mut(external_id) {
            Some(user) => apply_atomically(user, &mutation).map(|()| true),
            None => Ok(false),
        }
    }

    async fn delete_listing(&self, id: ListingId) -> StoreResult<bool> {
        Ok(self.write()?.listings.remove(&id).is_some())
    }
}
