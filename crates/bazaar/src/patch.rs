//! Partial updates.
//!
//! A patch is a sparse record: every field is `Option`, and only `Some` fields
//! are written. Compiling a patch yields a [`Mutation`], the store-agnostic
//! form of `UPDATE ... SET ... WHERE key = ...` that the PostgreSQL store
//! renders and the in-memory store applies directly.

use crate::error::{StoreError, StoreResult};
use crate::model::{Institution, ListingId, validate_price, validate_tags};
use crate::predicate::Expr;
use crate::query::CompiledSql;
use crate::schema::{Column, LISTINGS_TABLE, ListingColumn, Record, USERS_TABLE, UserColumn};
use crate::value::{ParamList, Value};
use serde::{Deserialize, Serialize};

/// A compiled partial update: assignments restricted by identity equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<C> {
    table: &'static str,
    assignments: Vec<(C, Value)>,
    key: (C, Value),
}

impl<C: Column> Mutation<C> {
    /// Start a mutation of the row whose `key_column` equals `key`.
    pub fn new(table: &'static str, key_column: C, key: impl Into<Value>) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            key: (key_column, key.into()),
        }
    }

    /// Assign a column.
    pub fn set(mut self, column: C, value: impl Into<Value>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Assign a column if a value is present (None => skip).
    pub fn set_opt<T: Into<Value>>(self, column: C, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Assignments in compile order.
    pub fn assignments(&self) -> &[(C, Value)] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The identity restriction this mutation targets.
    pub fn restriction(&self) -> Expr<C> {
        Expr::eq(self.key.0, self.key.1.clone())
    }

    /// Render as `UPDATE <table> SET a = $1, ... WHERE key = $n`.
    ///
    /// Returns `NoFieldsToUpdate` for an empty mutation rather than emitting a
    /// statement with no SET list.
    pub fn to_sql(&self) -> StoreResult<CompiledSql> {
        if self.assignments.is_empty() {
            return Err(StoreError::NoFieldsToUpdate);
        }

        let mut params = ParamList::new();
        let set_parts: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| format!("{} = ${}", column.name(), params.push(value.clone())))
            .collect();
        let where_sql = self.restriction().render(&mut params);

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            set_parts.join(", "),
            where_sql
        );
        Ok(CompiledSql::new(sql, params))
    }

    /// Apply every assignment to `record` in order.
    ///
    /// Stops at the first rejected assignment; callers that need atomicity
    /// apply to a copy and swap it in on success.
    pub fn apply_to<R: Record<Column = C>>(&self, record: &mut R) -> StoreResult<()> {
        for (column, value) in &self.assignments {
            record.assign(*column, value.clone())?;
        }
        Ok(())
    }
}

/// Sparse update of a listing.
///
/// Field order in the compiled mutation is fixed: title, description, price,
/// category, condition, image_url, available, tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    /// Replaces the whole tag sequence; there is no merge.
    pub tags: Option<Vec<String>>,
}

impl ListingPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that always writes `available`, like the historic update path
    /// where an omitted flag meant `false`.
    ///
    /// Use [`ListingPatch::new`] for a truly sparse update.
    pub fn legacy(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compile into a mutation of listing `id`.
    ///
    /// Price and tags are re-validated here even if the caller already did.
    pub fn compile(&self, id: ListingId) -> StoreResult<Mutation<ListingColumn>> {
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }

        let mutation = Mutation::new(LISTINGS_TABLE, ListingColumn::Id, id)
            .set_opt(ListingColumn::Title, self.title.clone())
            .set_opt(ListingColumn::Description, self.description.clone())
            .set_opt(ListingColumn::Price, self.price)
            .set_opt(ListingColumn::Category, self.category.clone())
            .set_opt(ListingColumn::Condition, self.condition.clone())
            .set_opt(ListingColumn::ImageUrl, self.image_url.clone())
            .set_opt(ListingColumn::Available, self.available)
            .set_opt(ListingColumn::Tags, self.tags.clone());

        if mutation.is_empty() {
            return Err(StoreError::NoFieldsToUpdate);
        }
        Ok(mutation)
    }
}

/// Sparse update of a user's profile.
///
/// The external identifier is the key and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub institution: Option<Institution>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn institution(mut self, institution: Institution) -> Self {
        self.institution = Some(institution);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn compile(&self, external_id: &str) -> StoreResult<Mutation<UserColumn>> {
        let mutation = Mutation::new(USERS_TABLE, UserColumn::ExternalId, external_id)
            .set_opt(UserColumn::Email, self.email.clone())
            .set_opt(UserColumn::DisplayName, self.display_name.clone())
            .set_opt(UserColumn::PhoneNumber, self.phone_number.clone())
            .set_opt(UserColumn::Institution, self.institution.map(Institution::as_str));

        if mutation.is_empty() {
            return Err(StoreError::NoFieldsToUpdate);
        }
        Ok(mutation)
    }
}
