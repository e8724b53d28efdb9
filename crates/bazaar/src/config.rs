//! Store configuration.

use crate::error::{StoreError, StoreResult};
use std::time::Duration;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "BAZAAR_MAX_CONNECTIONS";
pub const STATEMENT_TIMEOUT_VAR: &str = "BAZAAR_STATEMENT_TIMEOUT_MS";
pub const SCHEMA_VAR: &str = "BAZAAR_SCHEMA";

/// Configuration for [`PgStore`](crate::PgStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: usize,
    /// Per-call bound on a store round trip (pool checkout included).
    pub statement_timeout: Option<Duration>,
    /// Schema the store's tables live in; `None` keeps the server default.
    pub search_path: Option<String>,
}

impl StoreConfig {
    pub const DEFAULT_MAX_CONNECTIONS: usize = 16;

    /// Create a configuration with defaults for everything but the URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            statement_timeout: None,
            search_path: None,
        }
    }

    /// Set the pool size.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Bound every store call by `timeout`.
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Pin the schema the store works in.
    pub fn search_path(mut self, schema: impl Into<String>) -> Self {
        self.search_path = Some(schema.into());
        self
    }

    /// Load from the process environment, reading a `.env` file first if one
    /// exists.
    ///
    /// `DATABASE_URL` is required; `BAZAAR_MAX_CONNECTIONS`,
    /// `BAZAAR_STATEMENT_TIMEOUT_MS` and `BAZAAR_SCHEMA` are optional.
    pub fn from_env() -> StoreResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StoreError::invalid_value(DATABASE_URL_VAR, "is not set"))?;

        let mut config = Self::new(database_url);

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max = parse_number(MAX_CONNECTIONS_VAR, &raw)?;
            config = config.max_connections(max as usize);
        }

        if let Some(raw) = lookup(STATEMENT_TIMEOUT_VAR) {
            let millis = parse_number(STATEMENT_TIMEOUT_VAR, &raw)?;
            config = config.statement_timeout(Duration::from_millis(millis));
        }

        if let Some(schema) = lookup(SCHEMA_VAR) {
            config = config.search_path(schema.trim());
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings that would otherwise fail late, at connect time.
    pub fn validate(&self) -> StoreResult<()> {
        if self.max_connections == 0 {
            return Err(StoreError::invalid_value(
                "max_connections",
                "must be at least 1",
            ));
        }
        if self.statement_timeout == Some(Duration::ZERO) {
            return Err(StoreError::invalid_value(
                "statement_timeout",
                "must be greater than zero",
            ));
        }
        if let Some(schema) = &self.search_path
            && !is_identifier(schema)
        {
            return Err(StoreError::invalid_value(
                "search_path",
                format!("'{schema}' is not a plain identifier"),
            ));
        }
        Ok(())
    }
}

fn parse_number(key: &str, raw: &str) -> StoreResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| StoreError::invalid_value(key, format!("'{raw}': {e}")))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
