//! Cumulative per-person, per-chore assignment counts.
//!
//! # Responsibility
//! - Answer "how many times has this person done this chore".
//! - Apply one period's assignments as +1 increments.
//!
//! # Invariants
//! - Counts never decrease through `record_assignments`.
//! - A missing person row or chore column reads as 0.
//! - A failed batch leaves the ledger untouched.

use crate::model::period::Assignments;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ledger update failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    CountOverflow { person: String, chore: String },
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountOverflow { person, chore } => {
                write!(f, "history count overflow for `{person}` on `{chore}`")
            }
        }
    }
}

impl Error for LedgerError {}

/// Person → chore → count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    rows: BTreeMap<String, BTreeMap<String, u32>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored count, or 0 when the row or column is absent.
    pub fn count(&self, person: &str, chore: &str) -> u32 {
        self.rows
            .get(person)
            .and_then(|row| row.get(chore))
            .copied()
            .unwrap_or(0)
    }

    /// Adds one to every `(person, chore)` pair in `assignments`.
    ///
    /// Rows and columns are created lazily with a 0 baseline.
    ///
    /// # Errors
    /// - `CountOverflow` when any cell is already at `u32::MAX`; nothing is
    ///   written in that case.
    pub fn record_assignments(&mut self, assignments: &Assignments) -> Result<(), LedgerError> {
        for (person, chore) in assignments {
            if self.count(person, chore) == u32::MAX {
                return Err(LedgerError::CountOverflow {
                    person: person.clone(),
                    chore: chore.clone(),
                });
            }
        }

        for (person, chore) in assignments {
            let cell = self
                .rows
                .entry(person.clone())
                .or_default()
                .entry(chore.clone())
                .or_insert(0);
            *cell += 1;
        }
        Ok(())
    }

    /// Overwrites one cell. Used when loading persisted or imported ledgers.
    pub fn set_count(&mut self, person: impl Into<String>, chore: impl Into<String>, count: u32) {
        self.rows
            .entry(person.into())
            .or_default()
            .insert(chore.into(), count);
    }

    /// People with a ledger row, sorted by name.
    pub fn people(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Every chore column seen in any row, sorted by name.
    pub fn chores(&self) -> Vec<String> {
        self.rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All `(person, chore, count)` cells, sorted by person then chore.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.rows.iter().flat_map(|(person, row)| {
            row.iter()
                .map(move |(chore, count)| (person.as_str(), chore.as_str(), *count))
        })
    }

    /// Total number of chores a person has done.
    pub fn total_for(&self, person: &str) -> u64 {
        self.rows
            .get(person)
            .map(|row| row.values().map(|count| u64::from(*count)).sum())
            .unwrap_or(0)
    }
}
