//! Row mapping traits and utilities

use crate::error::{StoreError, StoreResult};
use crate::model::{Institution, Listing, User};
use crate::schema::{Column, ListingColumn, UserColumn};
use tokio_postgres::Row;

/// Trait for types that can be constructed from a database row
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> StoreResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning StoreError::Decode on failure
    fn try_get_column<T>(&self, column: impl Column) -> StoreResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: impl Column) -> StoreResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column.name())
            .map_err(|e| StoreError::decode(column.name(), e.to_string()))
    }
}

impl FromRow for Listing {
    fn from_row(row: &Row) -> StoreResult<Self> {
        let tags: Option<Vec<String>> = row.try_get_column(ListingColumn::Tags)?;
        Ok(Listing {
            id: row.try_get_column(ListingColumn::Id)?,
            seller_id: row.try_get_column(ListingColumn::SellerId)?,
            title: row.try_get_column(ListingColumn::Title)?,
            description: row.try_get_column(ListingColumn::Description)?,
            price: row.try_get_column(ListingColumn::Price)?,
            category: row.try_get_column(ListingColumn::Category)?,
            condition: row.try_get_column(ListingColumn::Condition)?,
            image_url: row.try_get_column(ListingColumn::ImageUrl)?,
            tags: tags.unwrap_or_default(),
            available: row.try_get_column(ListingColumn::Available)?,
        })
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> StoreResult<Self> {
        let institution: String = row.try_get_column(UserColumn::Institution)?;
        let institution = institution.parse::<Institution>().map_err(|e| {
            StoreError::decode(UserColumn::Institution.name(), e.to_string())
        })?;
        Ok(User {
            external_id: row.try_get_column(UserColumn::ExternalId)?,
            email: row.try_get_column(UserColumn::Email)?,
            display_name: row.try_get_column(UserColumn::DisplayName)?,
            phone_number: row.try_get_column(UserColumn::PhoneNumber)?,
            institution,
        })
    }
}
