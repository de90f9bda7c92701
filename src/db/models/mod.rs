//! This module contains all the sqlx structs for the database tables.

/// sqlx structs for book table.
pub mod book;
/// sqlx structs for publication table.
pub mod publication;

use crate::db::error::{StoreError, StoreResult};

/// Reject an empty required text field.
pub(crate) fn require_non_empty(table: &str, field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Constraint(format!(
            "{table}.{field} must not be empty"
        )));
    }
    Ok(())
}

/// Reject a text field longer than the column allows. sqlite ignores
/// varchar lengths, so the limit has to hold here for both engines.
pub(crate) fn require_max_len(
    table: &str,
    field: &str,
    value: &str,
    max: usize,
) -> StoreResult<()> {
    if value.chars().count() > max {
        return Err(StoreError::Constraint(format!(
            "{table}.{field} exceeds {max} characters"
        )));
    }
    Ok(())
}
