//! In-memory snapshot that one scheduling run transforms.

use crate::model::history::HistoryLedger;
use crate::model::period::PeriodLog;
use crate::model::roster::Roster;
use serde::{Deserialize, Serialize};

/// Roster, period log and history ledger loaded together.
///
/// Adapters load one of these, the scheduler advances it, and the adapter
/// writes it back wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub roster: Roster,
    pub periods: PeriodLog,
    pub history: HistoryLedger,
}

impl ScheduleState {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }
}
