//! Table metadata: column identifiers, record access, and bootstrap DDL.
//!
//! Every identifier that appears in generated SQL comes from the column enums in
//! this module. Caller input only ever reaches a statement as a bound [`Value`].

use crate::client::GenericClient;
use crate::error::StoreResult;
use crate::value::{FieldRef, Value};
use std::fmt::Debug;

/// A column of one of the marketplace tables.
pub trait Column: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// SQL identifier of the column.
    fn name(self) -> &'static str;
}

/// A stored entity whose fields can be read and assigned by column.
///
/// The in-memory store evaluates predicates and applies compiled mutations
/// through this trait, so it interprets exactly the same column/value pairs
/// the PostgreSQL store binds.
pub trait Record: Clone + Send + Sync {
    type Column: Column;

    /// Table the record is stored in.
    const TABLE: &'static str;

    /// Columns in canonical order (used for SELECT lists).
    fn columns() -> &'static [Self::Column];

    /// Borrow the value of a column.
    fn field(&self, column: Self::Column) -> FieldRef<'_>;

    /// Overwrite a column with a value of the matching kind.
    fn assign(&mut self, column: Self::Column, value: Value) -> StoreResult<()>;
}

pub const LISTINGS_TABLE: &str = "listings";
pub const USERS_TABLE: &str = "users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingColumn {
    Id,
    SellerId,
    Title,
    Description,
    Price,
    Category,
    Condition,
    ImageUrl,
    Tags,
    Available,
}

impl ListingColumn {
    pub const ALL: [ListingColumn; 10] = [
        ListingColumn::Id,
        ListingColumn::SellerId,
        ListingColumn::Title,
        ListingColumn::Description,
        ListingColumn::Price,
        ListingColumn::Category,
        ListingColumn::Condition,
        ListingColumn::ImageUrl,
        ListingColumn::Tags,
        ListingColumn::Available,
    ];
}

impl Column for ListingColumn {
    fn name(self) -> &'static str {
        match self {
            ListingColumn::Id => "id",
            ListingColumn::SellerId => "seller_id",
            ListingColumn::Title => "title",
            ListingColumn::Description => "description",
            ListingColumn::Price => "price",
            ListingColumn::Category => "category",
            ListingColumn::Condition => "condition",
            ListingColumn::ImageUrl => "image_url",
            ListingColumn::Tags => "tags",
            ListingColumn::Available => "available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserColumn {
    ExternalId,
    Email,
    DisplayName,
    PhoneNumber,
    Institution,
}

impl UserColumn {
    pub const ALL: [UserColumn; 5] = [
        UserColumn::ExternalId,
        UserColumn::Email,
        UserColumn::DisplayName,
        UserColumn::PhoneNumber,
        UserColumn::Institution,
    ];
}

impl Column for UserColumn {
    fn name(self) -> &'static str {
        match self {
            UserColumn::ExternalId => "external_id",
            UserColumn::Email => "email",
            UserColumn::DisplayName => "display_name",
            UserColumn::PhoneNumber => "phone_number",
            UserColumn::Institution => "institution",
        }
    }
}

/// Comma-separated column list for a SELECT.
pub(crate) fn column_list<C: Column>(columns: &[C]) -> String {
    columns
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// Title searches fold case under `COLLATE "C"`, independent of the database
// default collation.
const CREATE_LISTINGS: &str = "CREATE TABLE IF NOT EXISTS listings (
    id BIGSERIAL PRIMARY KEY,
    seller_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
    category TEXT NOT NULL,
    condition TEXT NOT NULL,
    image_url TEXT NOT NULL,
    tags TEXT[] NOT NULL DEFAULT '{}',
    available BOOLEAN NOT NULL DEFAULT TRUE
);
CREATE INDEX IF NOT EXISTS listings_seller_id_idx ON listings (seller_id);";

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    external_id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    display_name TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    institution TEXT NOT NULL
);";

/// Create the marketplace tables if they do not exist yet.
///
/// Idempotent; this only bootstraps an empty database and never alters an
/// existing table.
pub async fn ensure_schema(client: &impl GenericClient) -> StoreResult<()> {
    client.batch_execute(CREATE_LISTINGS).await?;
    client.batch_execute(CREATE_USERS).await
}
