//! Domain model for roster rotation.
//!
//! # Responsibility
//! - Define the roster, chore catalogs, period log and history ledger.
//! - Keep every invariant checkable without storage.
//!
//! # Invariants
//! - People are identified by their trimmed name.
//! - Period records and ledger counts only ever grow.

pub mod catalog;
pub mod history;
pub mod period;
pub mod roster;
pub mod state;
