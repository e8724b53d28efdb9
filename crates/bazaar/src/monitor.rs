//! `tracing` events for statements issued by the PostgreSQL store.
//!
//! Events go to the `bazaar.sql` target. Bound values are never recorded, only
//! how many there are.

use crate::error::StoreError;

/// Tracing target for every event in this module.
pub const SQL_TARGET: &str = "bazaar.sql";

/// Longest SQL text (in bytes) included in an event.
pub const MAX_SQL_LENGTH: usize = 200;

/// Truncate SQL to at most `max_bytes` without splitting a UTF-8 character.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn display_sql(sql: &str) -> String {
    if sql.len() > MAX_SQL_LENGTH {
        format!("{}...", truncate_sql_bytes(sql, MAX_SQL_LENGTH))
    } else {
        sql.to_string()
    }
}

/// Emit the statement about to be executed.
pub(crate) fn statement(tag: &'static str, sql: &str, param_count: usize) {
    tracing::debug!(
        target: SQL_TARGET,
        tag,
        param_count,
        sql = %display_sql(sql),
    );
}

/// Record an ordinary "nothing there" outcome.
pub(crate) fn not_found(tag: &'static str, key: &dyn std::fmt::Display) {
    tracing::debug!(target: SQL_TARGET, tag, %key, "target not found");
}

/// Record a patch that carried no fields; nothing was sent.
pub(crate) fn nothing_to_update(tag: &'static str) {
    tracing::debug!(target: SQL_TARGET, tag, "no fields to update");
}

/// Record a failed call. The error is still returned to the caller.
pub(crate) fn failure(tag: &'static str, err: &StoreError) {
    if err.is_unavailable() {
        tracing::warn!(target: SQL_TARGET, tag, error = %err, "store unavailable");
    } else {
        tracing::debug!(target: SQL_TARGET, tag, error = %err, "statement failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let sql = "SELECT 'é'";
        // 'é' spans bytes 8..10; cutting at 9 must back off to 8.
        assert_eq!(truncate_sql_bytes(sql, 9), "SELECT '");
        assert_eq!(truncate_sql_bytes(sql, 100), sql);
    }

    #[test]
    fn long_sql_is_elided() {
        let sql = "x".repeat(MAX_SQL_LENGTH + 50);
        let shown = display_sql(&sql);
        assert_eq!(shown.len(), MAX_SQL_LENGTH + 3);
        assert!(shown.ends_with("..."));
    }
}
