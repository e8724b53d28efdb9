//! Statement compilation.
//!
//! Every statement the PostgreSQL store executes is produced here as a
//! [`CompiledSql`]: fixed SQL text with `$n` placeholders plus the values bound
//! to them.

use crate::filter::ListingFilter;
use crate::predicate::Expr;
use crate::model::Listing;
use crate::schema::{Column, Record, column_list};
use crate::value::{ParamList, Value};
use tokio_postgres::types::ToSql;

/// A statement ready to be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    sql: String,
    params: ParamList,
}

impl CompiledSql {
    pub(crate) fn new(sql: String, params: ParamList) -> Self {
        Self { sql, params }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        self.params.values()
    }

    /// Parameters in the form tokio-postgres expects.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.as_refs()
    }
}

/// `SELECT <columns> FROM <table> WHERE <restriction> [ORDER BY ...]`
pub fn select<C: Column>(
    table: &str,
    columns: &[C],
    restriction: &Expr<C>,
    order_by: Option<&str>,
) -> CompiledSql {
    let mut params = ParamList::new();
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        column_list(columns),
        table,
        restriction.render(&mut params)
    );
    if let Some(order_by) = order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }
    CompiledSql::new(sql, params)
}

/// Read whole records of type `R` from their table.
pub fn select_records<R: Record>(restriction: &Expr<R::Column>, order_by: Option<&str>) -> CompiledSql {
    select(R::TABLE, R::columns(), restriction, order_by)
}

/// `INSERT INTO <table> (<columns>) VALUES ($1, ...) [RETURNING ...]`
pub fn insert<C: Column>(
    table: &str,
    values: Vec<(C, Value)>,
    returning: &[C],
) -> CompiledSql {
    let mut params = ParamList::new();
    let mut columns = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (column, value) in values {
        columns.push(column);
        placeholders.push(format!("${}", params.push(value)));
    }

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        column_list(&columns),
        placeholders.join(", ")
    );
    if !returning.is_empty() {
        sql.push_str(" RETURNING ");
        sql.push_str(&column_list(returning));
    }
    CompiledSql::new(sql, params)
}

/// `DELETE FROM <table> WHERE <restriction>`
pub fn delete<C: Column>(table: &str, restriction: &Expr<C>) -> CompiledSql {
    let mut params = ParamList::new();
    let sql = format!("DELETE FROM {} WHERE {}", table, restriction.render(&mut params));
    CompiledSql::new(sql, params)
}

/// Compile a listing read for `filter`.
///
/// Sort tokens are already validated by the time a [`ListingFilter`] holds a
/// [`SortOrder`](crate::SortOrder), so this cannot fail.
pub fn compile_listing_query(filter: &ListingFilter) -> CompiledSql {
    select_records::<Listing>(&filter.predicate(), filter.sort.map(|order| order.order_by()))
}
