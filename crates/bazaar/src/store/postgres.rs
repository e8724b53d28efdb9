use super::MarketStore;
use crate::client::GenericClient;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::filter::ListingFilter;
use crate::model::{Listing, ListingId, NewListing, User};
use crate::monitor;
use crate::patch::{ListingPatch, UserPatch};
use crate::pool::create_pool;
use crate::predicate::Expr;
use crate::query::{self, CompiledSql, compile_listing_query, select_records};
use crate::row::{FromRow, RowExt};
use crate::schema::{self, LISTINGS_TABLE, ListingColumn, USERS_TABLE, UserColumn};
use crate::value::Value;
use deadpool_postgres::Pool;
use std::future::Future;
use std::time::Duration;

/// PostgreSQL-backed store.
///
/// Each call checks out one pooled connection and issues a single statement.
/// With a statement timeout configured, checkout plus execution is bounded
/// and an elapsed call is reported as `StoreUnavailable`. Failed calls are
/// never retried here.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
    statement_timeout: Option<Duration>,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            statement_timeout: None,
        }
    }

    /// Build a pool from `config` and wrap it.
    ///
    /// No connection is opened until the first call.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = create_pool(config)?;
        Ok(Self {
            pool,
            statement_timeout: config.statement_timeout,
        })
    }

    /// Bound every call by `timeout`.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Create the marketplace tables if they are missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.bounded("ensure_schema", async {
            let client = self.pool.get().await?;
            schema::ensure_schema(&client).await
        })
        .await
    }

    /// Run one call under the configured timeout, logging any failure.
    async fn bounded<T>(
        &self,
        tag: &'static str,
        call: impl Future<Output = StoreResult<T>> + Send,
    ) -> StoreResult<T> {
        let result = match self.statement_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::unavailable(format!(
                    "{tag} timed out after {limit:?}"
                ))),
            },
            None => call.await,
        };
        if let Err(err) = &result {
            monitor::failure(tag, err);
        }
        result
    }

    async fn fetch_all<T: FromRow>(&self, tag: &'static str, stmt: CompiledSql) -> StoreResult<Vec<T>> {
        self.bounded(tag, async {
            let client = self.pool.get().await?;
            monitor::statement(tag, stmt.sql(), stmt.params().len());
            let rows = client.query(stmt.sql(), &stmt.params_ref()).await?;
            rows.iter().map(T::from_row).collect::<StoreResult<Vec<T>>>()
        })
        .await
    }

    async fn fetch_opt<T: FromRow>(
        &self,
        tag: &'static str,
        stmt: CompiledSql,
    ) -> StoreResult<Option<T>> {
        self.bounded(tag, async {
            let client = self.pool.get().await?;
            monitor::statement(tag, stmt.sql(), stmt.params().len());
            let row = client.query_opt(stmt.sql(), &stmt.params_ref()).await?;
            row.as_ref().map(T::from_row).transpose()
        })
        .await
    }

    async fn execute(&self, tag: &'static str, stmt: CompiledSql) -> StoreResult<u64> {
        self.bounded(tag, async {
            let client = self.pool.get().await?;
            monitor::statement(tag, stmt.sql(), stmt.params().len());
            client.execute(stmt.sql(), &stmt.params_ref()).await
        })
        .await
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool", &self.pool.status())
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl MarketStore for PgStore {
    async fn create_listing(&self, listing: NewListing) -> StoreResult<ListingId> {
        listing.validate()?;
        let stmt = query::insert(
            LISTINGS_TABLE,
            vec![
                (ListingColumn::SellerId, Value::from(listing.seller_id)),
                (ListingColumn::Title, Value::from(listing.title)),
                (ListingColumn::Description, Value::from(listing.description)),
                (ListingColumn::Price, Value::from(listing.price)),
                (ListingColumn::Category, Value::from(listing.category)),
                (ListingColumn::Condition, Value::from(listing.condition)),
                (ListingColumn::ImageUrl, Value::from(listing.image_url)),
                (ListingColumn::Tags, Value::from(listing.tags)),
                (ListingColumn::Available, Value::from(listing.available)),
            ],
            &[ListingColumn::Id],
        );

        self.bounded("create_listing", async {
            let client = self.pool.get().await?;
            monitor::statement("create_listing", stmt.sql(), stmt.params().len());
            let row = client.query_one(stmt.sql(), &stmt.params_ref()).await?;
            row.try_get_column::<ListingId>(ListingColumn::Id)
        })
        .await
    }

    async fn create_user(&self, user: User) -> StoreResult<String> {
        let external_id = user.external_id.clone();
        let stmt = query::insert(
            USERS_TABLE,
            vec![
                (UserColumn::ExternalId, Value::from(user.external_id)),
                (UserColumn::Email, Value::from(user.email)),
                (UserColumn::DisplayName, Value::from(user.display_name)),
                (UserColumn::PhoneNumber, Value::from(user.phone_number)),
                (UserColumn::Institution, Value::from(user.institution.as_str())),
            ],
            &[],
        );

        match self.execute("create_user", stmt).await {
            Ok(_) => Ok(external_id),
            Err(StoreError::DuplicateIdentity(_)) => {
                Err(StoreError::DuplicateIdentity(format!("user '{external_id}'")))
            }
            Err(err) => Err(err),
        }
    }

    async fn read_listings(&self, filter: &ListingFilter) -> StoreResult<Vec<Listing>> {
        self.fetch_all("read_listings", compile_listing_query(filter))
            .await
    }

    async fn read_listing_by_id(&self, id: ListingId) -> StoreResult<Option<Listing>> {
        let stmt = select_records::<Listing>(&Expr::eq(ListingColumn::Id, id), None);
        let listing = self.fetch_opt("read_listing_by_id", stmt).await?;
        if listing.is_none() {
            monitor::not_found("read_listing_by_id", &id);
        }
        Ok(listing)
    }

    async fn read_listings_by_owner(&self, seller_id: &str) -> StoreResult<Vec<Listing>> {
        let stmt =
            select_records::<Listing>(&Expr::eq(ListingColumn::SellerId, seller_id), Some("id ASC"));
        self.fetch_all("read_listings_by_owner", stmt).await
    }

    async fn read_user(&self, external_id: &str) -> StoreResult<Option<User>> {
        let stmt = select_records::<User>(&Expr::eq(UserColumn::ExternalId, external_id), None);
        let user = self.fetch_opt("read_user", stmt).await?;
        if user.is_none() {
            monitor::not_found("read_user", &external_id);
        }
        Ok(user)
    }

    async fn update_listing(&self, id: ListingId, patch: &ListingPatch) -> StoreResult<bool> {
        let stmt = patch
            .compile(id)
            .and_then(|mutation| mutation.to_sql())
            .inspect_err(|err| {
                if err.is_no_op() {
                    monitor::nothing_to_update("update_listing");
                }
            })?;
        let affected = self.execute("update_listing", stmt).await?;
        if affected == 0 {
            monitor::not_found("update_listing", &id);
        }
        Ok(affected > 0)
    }

    async fn update_user(&self, external_id: &str, patch: &UserPatch) -> StoreResult<bool> {
        let stmt = patch
            .compile(external_id)
            .and_then(|mutation| mutation.to_sql())
            .inspect_err(|err| {
                if err.is_no_op() {
                    monitor::nothing_to_update("update_user");
                }
            })?;
        let affected = self.execute("update_user", stmt).await?;
        if affected == 0 {
            monitor::not_found("update_user", &external_id);
        }
        Ok(affected > 0)
    }

    async fn delete_listing(&self, id: ListingId) -> StoreResult<bool> {
        let stmt = query::delete(LISTINGS_TABLE, &Expr::eq(ListingColumn::Id, id));
        let affected = self.execute("delete_listing", stmt).await?;
        if affected == 0 {
            monitor::not_found("delete_listing", &id);
        }
        Ok(affected > 0)
    }
}
