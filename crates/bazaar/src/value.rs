//! Bound parameter values.
//!
//! [`Value`] is the only way caller data enters a statement. It is rendered as a
//! positional `$n` placeholder for PostgreSQL and compared directly by the
//! in-memory store, so both backends see exactly the same operands.

use bytes::BytesMut;
use std::cmp::Ordering;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    TextArray(Vec<String>),
}

impl Value {
    /// Borrow this value as a field reference for comparisons.
    pub fn as_field(&self) -> FieldRef<'_> {
        match self {
            Value::Int(v) => FieldRef::Int(*v),
            Value::Float(v) => FieldRef::Float(*v),
            Value::Text(v) => FieldRef::Text(v),
            Value::Bool(v) => FieldRef::Bool(*v),
            Value::TextArray(v) => FieldRef::TextArray(v),
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        self.as_field().kind()
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::TextArray(v)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Int(v) => v.to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::TextArray(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <i64 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <bool as ToSql>::accepts(ty)
            || <Vec<String> as ToSql>::accepts(ty)
    }

    // Type checking is delegated per variant so a Text value bound to a
    // bigint placeholder still fails with a WrongType error.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Int(v) => v.to_sql_checked(ty, out),
            Value::Float(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::TextArray(v) => v.to_sql_checked(ty, out),
        }
    }
}

/// A borrowed view of a stored field, used by the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
    Bool(bool),
    TextArray(&'a [String]),
}

impl FieldRef<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldRef::Int(_) => "integer",
            FieldRef::Float(_) => "float",
            FieldRef::Text(_) => "text",
            FieldRef::Bool(_) => "boolean",
            FieldRef::TextArray(_) => "text[]",
        }
    }

    /// Compare a stored field against a parameter value.
    ///
    /// Returns `None` when the two are not comparable (mismatched kinds, NaN),
    /// which every caller treats as "predicate not satisfied".
    pub fn compare(&self, value: &Value) -> Option<Ordering> {
        match (*self, value.as_field()) {
            (FieldRef::Int(a), FieldRef::Int(b)) => Some(a.cmp(&b)),
            (FieldRef::Float(a), FieldRef::Float(b)) => a.partial_cmp(&b),
            (FieldRef::Int(a), FieldRef::Float(b)) => (a as f64).partial_cmp(&b),
            (FieldRef::Float(a), FieldRef::Int(b)) => a.partial_cmp(&(b as f64)),
            (FieldRef::Text(a), FieldRef::Text(b)) => Some(a.cmp(b)),
            (FieldRef::Bool(a), FieldRef::Bool(b)) => Some(a.cmp(&b)),
            (FieldRef::TextArray(a), FieldRef::TextArray(b)) => (a == b).then_some(Ordering::Equal),
            _ => None,
        }
    }
}

/// An ordered collection of bound parameters.
///
/// Placeholder `$n` always refers to the n-th value pushed (1-based).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamList {
    values: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The bound values, in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}
