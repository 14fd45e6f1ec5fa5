//! Row types for the project tables and their conversion into domain types.

pub mod milestone;
pub mod project;
pub mod task;

use managix_core::error::CoreError;

/// A stored value the domain cannot represent. Only reachable if the
/// database was written outside this crate.
pub(crate) fn corrupt_row(table: &str, err: CoreError) -> CoreError {
    CoreError::Internal(format!("Corrupt row in {table}: {err}"))
}
