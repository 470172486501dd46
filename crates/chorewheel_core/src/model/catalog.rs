//! Chore catalog model.
//!
//! # Responsibility
//! - Describe which chores run in one slate and how many people each needs.
//! - Key monthly slates by their month-cycle index.
//!
//! # Invariants
//! - Catalog order is allocation order.
//! - Chore names are stored trimmed, so slates compare names exactly.
//! - A validated catalog has non-blank names, positive headcounts and no
//!   chore listed twice.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One chore and its required headcount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub chore: String,
    pub headcount: u32,
}

impl CatalogEntry {
    pub fn new(chore: impl Into<String>, headcount: u32) -> Self {
        Self {
            chore: chore.into().trim().to_string(),
            headcount,
        }
    }
}

/// Catalog validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyChoreName,
    ZeroHeadcount(String),
    /// Same chore listed twice in one slate.
    DuplicateChore(String),
    /// Chore appears in the weekly slate and in the monthly slate at `cycle`.
    ChoreInBothSlates { chore: String, cycle: u32 },
    ZeroCycleLength,
    /// Monthly slate key can never be selected with the configured cycle.
    MonthlyKeyOutOfRange { key: u32, cycle_len: u32 },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyChoreName => write!(f, "chore name must not be blank"),
            Self::ZeroHeadcount(chore) => {
                write!(f, "chore `{chore}` must require at least one person")
            }
            Self::DuplicateChore(chore) => write!(f, "chore `{chore}` is listed twice"),
            Self::ChoreInBothSlates { chore, cycle } => write!(
                f,
                "chore `{chore}` is in the weekly slate and the monthly slate {cycle}"
            ),
            Self::ZeroCycleLength => write!(f, "monthly cycle length must be positive"),
            Self::MonthlyKeyOutOfRange { key, cycle_len } => write!(
                f,
                "monthly slate {key} is unreachable with cycle length {cycle_len}"
            ),
        }
    }
}

impl Error for CatalogError {}

/// Ordered chore → headcount mapping for one slate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoreCatalog {
    entries: Vec<CatalogEntry>,
}

impl ChoreCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| CatalogEntry::new(entry.chore, entry.headcount))
            .collect();
        Self { entries }
    }

    /// Builds a catalog from `(chore, headcount)` pairs, keeping order.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(chore, headcount)| CatalogEntry::new(chore, headcount))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, chore: &str) -> bool {
        let chore = chore.trim();
        self.entries.iter().any(|entry| entry.chore == chore)
    }

    /// Sum of all headcounts.
    pub fn total_headcount(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.headcount))
            .sum()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            let chore = entry.chore.trim();
            if chore.is_empty() {
                return Err(CatalogError::EmptyChoreName);
            }
            if entry.headcount == 0 {
                return Err(CatalogError::ZeroHeadcount(chore.to_string()));
            }
            if !seen.insert(chore) {
                return Err(CatalogError::DuplicateChore(chore.to_string()));
            }
        }
        Ok(())
    }
}

/// Monthly slates keyed by month-cycle index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyCatalog {
    slates: BTreeMap<u32, ChoreCatalog>,
}

impl MonthlyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the slate at `cycle`.
    pub fn insert(&mut self, cycle: u32, catalog: ChoreCatalog) {
        self.slates.insert(cycle, catalog);
    }

    /// Returns the slate active at `cycle`, ignoring empty slates.
    pub fn get(&self, cycle: u32) -> Option<&ChoreCatalog> {
        self.slates.get(&cycle).filter(|catalog| !catalog.is_empty())
    }

    pub fn slates(&self) -> impl Iterator<Item = (u32, &ChoreCatalog)> {
        self.slates.iter().map(|(cycle, catalog)| (*cycle, catalog))
    }

}

#[cfg(test)]
mod tests {
    use super::{CatalogError, ChoreCatalog, MonthlyCatalog};

    #[test]
    fn validate_flags_duplicate_and_zero_headcount() {
        let duplicate = ChoreCatalog::from_pairs([("Sweep", 1), ("Mop", 2), ("Sweep", 1)]);
        assert_eq!(
            duplicate.validate().unwrap_err(),
            CatalogError::DuplicateChore("Sweep".to_string())
        );

        let zero = ChoreCatalog::from_pairs([("Sweep", 0)]);
        assert_eq!(
            zero.validate().unwrap_err(),
            CatalogError::ZeroHeadcount("Sweep".to_string())
        );
    }

    #[test]
    fn chore_names_are_trimmed_on_construction() {
        let catalog = ChoreCatalog::from_pairs([(" Sweep ", 1)]);
        assert!(catalog.contains("Sweep"));
        assert!(catalog.contains("Sweep "));
        assert_eq!(catalog.entries()[0].chore, "Sweep");

        let padded = ChoreCatalog::from_pairs([("Sweep", 1), ("Sweep ", 2)]);
        assert_eq!(
            padded.validate().unwrap_err(),
            CatalogError::DuplicateChore("Sweep".to_string())
        );
    }

    #[test]
    fn total_headcount_sums_entries() {
        let catalog = ChoreCatalog::from_pairs([("X", 2), ("Y", 1)]);
        assert_eq!(catalog.total_headcount(), 3);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn monthly_get_skips_empty_slates() {
        let mut monthly = MonthlyCatalog::new();
        monthly.insert(0, ChoreCatalog::from_pairs([("Fridges", 3)]));
        monthly.insert(1, ChoreCatalog::default());

        assert!(monthly.get(0).is_some());
        assert!(monthly.get(1).is_none());
        assert!(monthly.get(2).is_none());
    }
}
