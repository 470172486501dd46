//! Core logic for the chore wheel.
//! This crate owns every rotation and fairness invariant; front ends only
//! load state, call the scheduler and save the result.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod table;

pub use config::{ConfigError, SchedulerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{CatalogEntry, CatalogError, ChoreCatalog, MonthlyCatalog};
pub use model::history::{HistoryLedger, LedgerError};
pub use model::period::{Assignments, PeriodKind, PeriodLog, PeriodLogError, PeriodRecord};
pub use model::roster::{Person, Roster, RosterError};
pub use model::state::ScheduleState;
pub use repo::schedule_repo::{
    open_existing_db, ScheduleStore, SqliteScheduleStore, StoreError, StoreResult,
};
pub use service::allocator::{Allocation, AllocationInput, Allocator, ChoreFill, FallbackPolicy};
pub use service::scheduler::{
    MonthlyOutcome, MonthlyPlan, PeriodPlan, PeriodScheduler, RunReport, ScheduleError,
};
pub use service::shuffle::{PreserveOrder, RandShuffler, Shuffler};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
