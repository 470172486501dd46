//! Persistence adapters for schedule state.
//!
//! # Responsibility
//! - Define the load/save contract used by callers around a scheduling run.
//! - Keep SQLite details out of the model and service layers.
//!
//! # Invariants
//! - A save is all-or-nothing.
//! - Adapters surface `SourceNotFound` instead of creating missing sources
//!   on load.

pub mod schedule_repo;
