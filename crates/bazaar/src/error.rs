//! Error types for bazaar

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error kinds surfaced by the query engine and the storage gateways.
///
/// `NotFound` and `NoFieldsToUpdate` describe ordinary outcomes rather than faults;
/// `StoreUnavailable` is the only kind a caller may reasonably retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unrecognized sort token
    #[error("Invalid sort '{token}': expected one of {allowed}")]
    InvalidSort {
        token: String,
        allowed: &'static str,
    },

    /// A value failed a constraint re-checked at this layer
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// A record with the same caller-assigned identity already exists
    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    /// Read/update/delete target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A partial update carried zero assignments
    #[error("No fields to update")]
    NoFieldsToUpdate,

    /// The backing store could not be reached or timed out
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The server rejected a statement for a reason not covered above
    #[error("Query error: {0}")]
    Query(tokio_postgres::Error),
}

impl StoreError {
    /// Create an invalid value error for a specific field
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a store unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is the "nothing to update" outcome
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::NoFieldsToUpdate)
    }

    /// Check if the backing store was unreachable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Whether a caller may retry the failed operation.
    ///
    /// Only transport failures qualify; the store itself never retries.
    pub fn is_retryable(&self) -> bool {
        self.is_unavailable()
    }

    /// Parse a tokio_postgres error into a more specific StoreError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let Some(db_err) = err.as_db_error() else {
            if is_transport_failure(&err) {
                return Self::StoreUnavailable(err.to_string());
            }
            return Self::Query(err);
        };

        let constraint = db_err.constraint().unwrap_or("unknown");
        let message = db_err.message();
        let code = db_err.code().code();

        match code {
            "23505" => Self::DuplicateIdentity(format!("{constraint}: {message}")),
            "23514" => Self::invalid_value(constraint, message),
            // connection_exception class, admin/crash shutdown, too_many_connections
            _ if code.starts_with("08") => Self::StoreUnavailable(message.to_string()),
            "57P01" | "57P02" | "57P03" | "53300" => Self::StoreUnavailable(message.to_string()),
            _ => Self::Query(err),
        }
    }
}

fn is_transport_failure(err: &tokio_postgres::Error) -> bool {
    if err.is_closed() {
        return true;
    }
    std::error::Error::source(err).is_some_and(|source| source.is::<std::io::Error>())
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
