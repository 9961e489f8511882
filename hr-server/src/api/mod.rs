//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`companies`] - company management
//! - [`departments`] - departments scoped under a company
//! - [`positions`] - positions scoped under a department
//! - [`employees`] - employee management and identity resolution
//! - [`import`] - bulk spreadsheet import
//! - [`surveys`] - survey templates, campaigns and responses

pub mod health;

pub mod companies;
pub mod departments;
pub mod employees;
pub mod positions;

pub mod import;
pub mod surveys;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use surrealdb::RecordId;

use crate::utils::AppError;

/// Resolve a path id into a record reference of the given table.
///
/// Accepts both the bare key ("abc123") and the full "table:key" form; a
/// full form naming a different table is rejected.
pub(crate) fn record_ref(table: &str, id: &str) -> Result<RecordId, AppError> {
    match id.split_once(':') {
        Some((t, key)) if t == table => Ok(RecordId::from_table_key(t, key)),
        Some((t, _)) => Err(AppError::invalid(format!(
            "Expected a {} id, got '{}'",
            table, t
        ))),
        None => Ok(RecordId::from_table_key(table, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ref_accepts_both_forms() {
        assert_eq!(
            record_ref("company", "c1").unwrap(),
            RecordId::from_table_key("company", "c1")
        );
        assert_eq!(
            record_ref("company", "company:c1").unwrap(),
            RecordId::from_table_key("company", "c1")
        );
        assert!(record_ref("company", "department:d1").is_err());
    }
}
