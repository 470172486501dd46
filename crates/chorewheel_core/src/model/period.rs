//! Period records and the chronological period log.
//!
//! # Responsibility
//! - Record who did which chore in every past weekly/monthly period.
//! - Answer "what was the most recent assignment" as a direct lookup.
//!
//! # Invariants
//! - Records are appended in chronological order and never rewritten.
//! - Per-kind numbers start at 1 and increase by exactly 1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Person → chore mapping for one period.
pub type Assignments = BTreeMap<String, String>;

/// Period cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Weekly,
    Monthly,
}

impl PeriodKind {
    /// Column label prefix used by the tabular assignment layout.
    pub fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Week",
            Self::Monthly => "Month",
        }
    }

    /// Stable storage code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// One weekly or monthly period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub kind: PeriodKind,
    /// 1-based sequence number within `kind`.
    pub number: u32,
    pub assignments: Assignments,
    /// Scheduling run that produced this record. `None` for imported history.
    pub run_id: Option<Uuid>,
}

impl PeriodRecord {
    pub fn new(kind: PeriodKind, number: u32, assignments: Assignments) -> Self {
        Self {
            kind,
            number,
            assignments,
            run_id: None,
        }
    }

    /// Header label, e.g. `Week 3`.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind.label(), self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodLogError {
    OutOfSequence {
        kind: PeriodKind,
        expected: u32,
        actual: u32,
    },
}

impl Display for PeriodLogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfSequence {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{} period out of sequence: expected {expected}, got {actual}",
                kind.as_str()
            ),
        }
    }
}

impl Error for PeriodLogError {}

/// Chronological list of period records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodLog {
    records: Vec<PeriodRecord>,
}

impl PeriodLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record after checking its per-kind number.
    pub fn append(&mut self, record: PeriodRecord) -> Result<(), PeriodLogError> {
        let expected = self.next_number(record.kind);
        if record.number != expected {
            return Err(PeriodLogError::OutOfSequence {
                kind: record.kind,
                expected,
                actual: record.number,
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Number the next record of `kind` must carry.
    pub fn next_number(&self, kind: PeriodKind) -> u32 {
        self.count(kind).saturating_add(1)
    }

    pub fn count(&self, kind: PeriodKind) -> u32 {
        let count = self
            .records
            .iter()
            .filter(|record| record.kind == kind)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn weekly_count(&self) -> u32 {
        self.count(PeriodKind::Weekly)
    }

    pub fn monthly_count(&self) -> u32 {
        self.count(PeriodKind::Monthly)
    }

    /// Most recently appended record of either kind.
    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// Assignments of the most recent record, empty when the log is empty.
    pub fn last_assignments(&self) -> Assignments {
        self.last()
            .map(|record| record.assignments.clone())
            .unwrap_or_default()
    }

    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignments, PeriodKind, PeriodLog, PeriodLogError, PeriodRecord};

    fn record(kind: PeriodKind, number: u32, person: &str, chore: &str) -> PeriodRecord {
        let mut assignments = Assignments::new();
        assignments.insert(person.to_string(), chore.to_string());
        PeriodRecord::new(kind, number, assignments)
    }

    #[test]
    fn last_is_chronological_across_kinds() {
        let mut log = PeriodLog::new();
        log.append(record(PeriodKind::Weekly, 1, "Ada", "Sweep"))
            .unwrap();
        log.append(record(PeriodKind::Monthly, 1, "Ada", "Fridges"))
            .unwrap();

        assert_eq!(log.last_assignments()["Ada"], "Fridges");
        assert_eq!(log.weekly_count(), 1);
        assert_eq!(log.monthly_count(), 1);
        assert_eq!(log.last().unwrap().label(), "Month 1");
    }

    #[test]
    fn append_rejects_gaps() {
        let mut log = PeriodLog::new();
        let err = log
            .append(record(PeriodKind::Weekly, 2, "Ada", "Sweep"))
            .unwrap_err();
        assert_eq!(
            err,
            PeriodLogError::OutOfSequence {
                kind: PeriodKind::Weekly,
                expected: 1,
                actual: 2,
            }
        );
        assert!(log.is_empty());
    }
}
