//! CSV import/export of the tabular assignment and history layouts.
//!
//! # Responsibility
//! - Bootstrap schedule state from tables kept outside the database.
//! - Export the database back to the same wide layouts.
//!
//! # Invariants
//! - `Employee` is the identity column of every table.
//! - Missing source files surface as `StoreError::SourceNotFound`.

pub mod assignment_table;
pub mod history_table;

use crate::repo::schedule_repo::{StoreError, StoreResult};
use std::fs::File;
use std::path::Path;

/// Identity column shared by both tables.
pub const EMPLOYEE_COLUMN: &str = "Employee";

fn open_source(path: &Path) -> StoreResult<File> {
    if !path.exists() {
        return Err(StoreError::SourceNotFound(path.to_path_buf()));
    }
    Ok(File::open(path)?)
}
