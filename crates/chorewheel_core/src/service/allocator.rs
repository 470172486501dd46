//! Greedy fairness allocator for one slate.
//!
//! # Responsibility
//! - Pick, for each chore in catalog order, the least-burdened eligible people.
//! - Avoid giving anyone the chore they had in the previous period.
//! - Fill shortfalls through a configurable fallback relaxation.
//!
//! # Invariants
//! - Every person appears at most once in the result.
//! - A catalog entry never receives more than its headcount.
//! - Inputs are read-only; allocation is pure apart from the shuffler.

use crate::model::catalog::ChoreCatalog;
use crate::model::history::HistoryLedger;
use crate::model::period::Assignments;
use crate::service::shuffle::Shuffler;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How remaining slots are filled when too few eligible people exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Drop both the repeat rule and history ordering; remaining people are
    /// re-shuffled and taken in that order.
    #[default]
    RelaxAll,
    /// Drop only the repeat rule; remaining people are still ranked by history.
    RelaxRepeatOnly,
}

/// Borrowed inputs for one allocation pass.
#[derive(Debug, Clone, Copy)]
pub struct AllocationInput<'a> {
    /// Available people this period, before exclusions.
    pub pool: &'a [String],
    pub catalog: &'a ChoreCatalog,
    /// People already committed by an earlier pass of the same run.
    pub excluded: &'a BTreeSet<String>,
    /// Assignments of the most recent period.
    pub last_assignment: &'a Assignments,
    pub history: &'a HistoryLedger,
}

/// How one catalog entry was filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreFill {
    pub chore: String,
    pub required: u32,
    pub filled: u32,
    /// Slots filled through the fallback relaxation.
    pub relaxed: u32,
}

impl ChoreFill {
    pub fn unfilled(&self) -> u32 {
        self.required.saturating_sub(self.filled)
    }
}

/// Result of one allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub assignments: Assignments,
    /// One entry per catalog entry, in catalog order.
    pub fills: Vec<ChoreFill>,
}

impl Allocation {
    /// Slots left empty because the pool ran out.
    pub fn unfilled_slots(&self) -> u32 {
        self.fills.iter().map(ChoreFill::unfilled).sum()
    }

    /// Slots filled by relaxing the repeat/history rules.
    pub fn relaxed_slots(&self) -> u32 {
        self.fills.iter().map(|fill| fill.relaxed).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.unfilled_slots() == 0
    }

    /// People assigned to `chore`, sorted by name.
    pub fn people_for(&self, chore: &str) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|(_, assigned)| assigned.as_str() == chore)
            .map(|(person, _)| person.as_str())
            .collect()
    }
}

/// Greedy allocator configured with a fallback policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allocator {
    policy: FallbackPolicy,
}

impl Allocator {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    /// Allocates one chore per person for the given slate.
    ///
    /// An empty pool yields an empty allocation whose fills report every slot
    /// as unfilled.
    pub fn allocate(&self, input: &AllocationInput<'_>, shuffler: &mut dyn Shuffler) -> Allocation {
        let mut base = Vec::with_capacity(input.pool.len());
        let mut seen = BTreeSet::new();
        for person in input.pool {
            if !input.excluded.contains(person) && seen.insert(person.as_str()) {
                base.push(person.clone());
            }
        }
        shuffler.permute(&mut base);

        let mut used = BTreeSet::<String>::new();
        let mut allocation = Allocation::default();

        for entry in input.catalog.entries() {
            let chore = entry.chore.as_str();
            let needed = usize::try_from(entry.headcount).unwrap_or(usize::MAX);

            let mut eligible: Vec<(&String, u32)> = base
                .iter()
                .filter(|person| !used.contains(*person))
                .filter(|person| input.last_assignment.get(*person).map(String::as_str) != Some(chore))
                .map(|person| (person, input.history.count(person, chore)))
                .collect();
            eligible.sort_by_key(|(_, count)| *count);
            let eligible_len = eligible.len();

            let mut selected: Vec<String> = eligible
                .into_iter()
                .take(needed)
                .map(|(person, _)| person.clone())
                .collect();
            used.extend(selected.iter().cloned());

            let mut relaxed = 0usize;
            if selected.len() < needed {
                let mut fallback: Vec<String> = base
                    .iter()
                    .filter(|person| !used.contains(*person))
                    .cloned()
                    .collect();
                match self.policy {
                    FallbackPolicy::RelaxAll => shuffler.permute(&mut fallback),
                    FallbackPolicy::RelaxRepeatOnly => {
                        fallback.sort_by_key(|person| input.history.count(person, chore));
                    }
                }
                for person in fallback.into_iter().take(needed - selected.len()) {
                    used.insert(person.clone());
                    selected.push(person);
                    relaxed += 1;
                }
            }

            let fill = ChoreFill {
                chore: chore.to_string(),
                required: entry.headcount,
                filled: len_to_u32(selected.len()),
                relaxed: len_to_u32(relaxed),
            };
            if fill.relaxed > 0 || fill.unfilled() > 0 {
                warn!(
                    "event=allocate_shortfall module=allocator chore={} required={} eligible={} relaxed={} unfilled={}",
                    chore,
                    fill.required,
                    eligible_len,
                    fill.relaxed,
                    fill.unfilled()
                );
            }

            for person in selected {
                allocation.assignments.insert(person, chore.to_string());
            }
            allocation.fills.push(fill);
        }

        debug!(
            "event=allocate module=allocator status=ok pool={} assigned={} unfilled={}",
            base.len(),
            allocation.assignments.len(),
            allocation.unfilled_slots()
        );
        allocation
    }
}

fn len_to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
