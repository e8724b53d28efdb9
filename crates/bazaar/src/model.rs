//! Marketplace entities.

use crate::error::{StoreError, StoreResult};
use crate::schema::{LISTINGS_TABLE, ListingColumn, Record, USERS_TABLE, UserColumn};
use crate::value::{FieldRef, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned listing identity. Unique within a store, never reused.
pub type ListingId = i64;

/// A listing as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    /// Opaque identifier of the seller (a [`User::external_id`]).
    pub seller_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub condition: String,
    pub image_url: String,
    /// Never null; no tags is an empty sequence.
    pub tags: Vec<String>,
    pub available: bool,
}

/// Fields for creating a listing. The identity is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub seller_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub condition: String,
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub available: bool,
}

impl NewListing {
    /// Re-check the constraints the store relies on.
    pub fn validate(&self) -> StoreResult<()> {
        validate_price(self.price)?;
        validate_tags(&self.tags)
    }

    /// Materialize the listing under the identity the store assigned.
    pub fn into_listing(self, id: ListingId) -> Listing {
        Listing {
            id,
            seller_id: self.seller_id,
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            condition: self.condition,
            image_url: self.image_url,
            tags: self.tags,
            available: self.available,
        }
    }
}

pub(crate) fn validate_price(price: f64) -> StoreResult<()> {
    if !price.is_finite() {
        return Err(StoreError::invalid_value("price", "must be a finite number"));
    }
    if price < 0.0 {
        return Err(StoreError::invalid_value("price", "cannot be negative"));
    }
    Ok(())
}

pub(crate) fn validate_tags(tags: &[String]) -> StoreResult<()> {
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(StoreError::invalid_value("tags", "tags cannot be empty"));
    }
    Ok(())
}

impl Record for Listing {
    type Column = ListingColumn;

    const TABLE: &'static str = LISTINGS_TABLE;

    fn columns() -> &'static [ListingColumn] {
        &ListingColumn::ALL
    }

    fn field(&self, column: ListingColumn) -> FieldRef<'_> {
        match column {
            ListingColumn::Id => FieldRef::Int(self.id),
            ListingColumn::SellerId => FieldRef::Text(&self.seller_id),
            ListingColumn::Title => FieldRef::Text(&self.title),
            ListingColumn::Description => FieldRef::Text(&self.description),
            ListingColumn::Price => FieldRef::Float(self.price),
            ListingColumn::Category => FieldRef::Text(&self.category),
            ListingColumn::Condition => FieldRef::Text(&self.condition),
            ListingColumn::ImageUrl => FieldRef::Text(&self.image_url),
            ListingColumn::Tags => FieldRef::TextArray(&self.tags),
            ListingColumn::Available => FieldRef::Bool(self.available),
        }
    }

    fn assign(&mut self, column: ListingColumn, value: Value) -> StoreResult<()> {
        match (column, value) {
            (ListingColumn::SellerId, Value::Text(v)) => self.seller_id = v,
            (ListingColumn::Title, Value::Text(v)) => self.title = v,
            (ListingColumn::Description, Value::Text(v)) => self.description = v,
            (ListingColumn::Price, Value::Float(v)) => {
                validate_price(v)?;
                self.price = v;
            }
            (ListingColumn::Category, Value::Text(v)) => self.category = v,
            (ListingColumn::Condition, Value::Text(v)) => self.condition = v,
            (ListingColumn::ImageUrl, Value::Text(v)) => self.image_url = v,
            (ListingColumn::Tags, Value::TextArray(v)) => self.tags = v,
            (ListingColumn::Available, Value::Bool(v)) => self.available = v,
            (ListingColumn::Id, _) => {
                return Err(StoreError::invalid_value("id", "listing identity is immutable"));
            }
            (column, value) => return Err(kind_mismatch(column, &value)),
        }
        Ok(())
    }
}

/// Closed set of institutions a user can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Institution {
    #[serde(rename = "Brown")]
    Brown,
    #[serde(rename = "RISD")]
    Risd,
}

impl Institution {
    pub const ALLOWED: &'static str = "Brown, RISD";

    pub fn as_str(self) -> &'static str {
        match self {
            Institution::Brown => "Brown",
            Institution::Risd => "RISD",
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Institution {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("brown") {
            Ok(Institution::Brown)
        } else if s.eq_ignore_ascii_case("risd") {
            Ok(Institution::Risd)
        } else {
            Err(StoreError::invalid_value(
                "institution",
                format!("'{s}' is not one of {}", Institution::ALLOWED),
            ))
        }
    }
}

/// A marketplace user. The identity is assigned by the caller, not the store.
///
/// Email format and domain are validated by the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub phone_number: String,
    pub institution: Institution,
}

impl Record for User {
    type Column = UserColumn;

    const TABLE: &'static str = USERS_TABLE;

    fn columns() -> &'static [UserColumn] {
        &UserColumn::ALL
    }

    fn field(&self, column: UserColumn) -> FieldRef<'_> {
        match column {
            UserColumn::ExternalId => FieldRef::Text(&self.external_id),
            UserColumn::Email => FieldRef::Text(&self.email),
            UserColumn::DisplayName => FieldRef::Text(&self.display_name),
            UserColumn::PhoneNumber => FieldRef::Text(&self.phone_number),
            UserColumn::Institution => FieldRef::Text(self.institution.as_str()),
        }
    }

    fn assign(&mut self, column: UserColumn, value: Value) -> StoreResult<()> {
        match (column, value) {
            (UserColumn::Email, Value::Text(v)) => self.email = v,
            (UserColumn::DisplayName, Value::Text(v)) => self.display_name = v,
            (UserColumn::PhoneNumber, Value::Text(v)) => self.phone_number = v,
            (UserColumn::Institution, Value::Text(v)) => self.institution = v.parse()?,
            (UserColumn::ExternalId, _) => {
                return Err(StoreError::invalid_value(
                    "external_id",
                    "user identity is immutable",
                ));
            }
            (column, value) => return Err(kind_mismatch(column, &value)),
        }
        Ok(())
    }
}

fn kind_mismatch<C: crate::schema::Column>(column: C, value: &Value) -> StoreError {
    StoreError::invalid_value(
        column.name(),
        format!("cannot assign a {} value", value.kind()),
    )
}
