//! Period scheduler: one run advances the rotation by one week.
//!
//! # Responsibility
//! - Derive the next week number and the most recent assignment.
//! - Decide whether a monthly slate applies and allocate it first.
//! - Allocate the weekly slate around monthly awardees and merge both.
//! - Record both passes in the history ledger and the period log.
//!
//! # Invariants
//! - A monthly awardee never receives a weekly chore in the same run.
//! - Ledger increments are applied once per pass, never for the merged map.
//! - The caller's state is replaced only after the whole run succeeded.

use crate::config::SchedulerConfig;
use crate::model::catalog::{CatalogError, ChoreCatalog};
use crate::model::history::LedgerError;
use crate::model::period::{Assignments, PeriodKind, PeriodLogError, PeriodRecord};
use crate::model::state::ScheduleState;
use crate::service::allocator::{Allocation, AllocationInput, Allocator};
use crate::service::shuffle::Shuffler;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Scheduler construction and run failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    Catalog(CatalogError),
    PeriodLog(PeriodLogError),
    Ledger(LedgerError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::PeriodLog(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::PeriodLog(err) => Some(err),
            Self::Ledger(err) => Some(err),
        }
    }
}

impl From<CatalogError> for ScheduleError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<PeriodLogError> for ScheduleError {
    fn from(value: PeriodLogError) -> Self {
        Self::PeriodLog(value)
    }
}

impl From<LedgerError> for ScheduleError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

/// What the next run would do, without allocating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPlan {
    pub week_number: u32,
    /// Monthly slate key and the number the monthly record would get.
    pub monthly: Option<MonthlyPlan>,
    pub available_people: usize,
    pub weekly_slots: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPlan {
    pub cycle: u32,
    pub month_number: u32,
    pub slots: u64,
}

/// Monthly pass of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyOutcome {
    pub month_number: u32,
    pub cycle: u32,
    pub allocation: Allocation,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub week_number: u32,
    pub monthly: Option<MonthlyOutcome>,
    pub weekly: Allocation,
    /// Content of the new weekly record: monthly and weekly assignments.
    pub merged: Assignments,
}

impl RunReport {
    pub fn unfilled_slots(&self) -> u32 {
        let monthly = self
            .monthly
            .as_ref()
            .map_or(0, |outcome| outcome.allocation.unfilled_slots());
        monthly.saturating_add(self.weekly.unfilled_slots())
    }
}

/// Drives allocation passes over a `ScheduleState`.
#[derive(Debug, Clone)]
pub struct PeriodScheduler {
    config: SchedulerConfig,
    allocator: Allocator,
}

impl PeriodScheduler {
    /// Builds a scheduler after validating the configuration.
    pub fn new(config: SchedulerConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        let allocator = Allocator::new(config.fallback);
        Ok(Self { config, allocator })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Monthly slate active for `week_number`, with its cycle key.
    pub fn monthly_slate(&self, week_number: u32) -> Option<(u32, &ChoreCatalog)> {
        if week_number < self.config.monthly_start_week {
            return None;
        }
        let key = (u64::from(week_number) + 1) % u64::from(self.config.monthly_cycle_len);
        let cycle = u32::try_from(key).ok()?;
        self.config
            .monthly
            .get(cycle)
            .map(|catalog| (cycle, catalog))
    }

    /// Describes the upcoming run.
    pub fn preview(&self, state: &ScheduleState) -> PeriodPlan {
        let week_number = state.periods.next_number(PeriodKind::Weekly);
        let monthly = self
            .monthly_slate(week_number)
            .map(|(cycle, catalog)| MonthlyPlan {
                cycle,
                month_number: state.periods.next_number(PeriodKind::Monthly),
                slots: catalog.total_headcount(),
            });

        PeriodPlan {
            week_number,
            monthly,
            available_people: state.roster.available_people().len(),
            weekly_slots: self.config.weekly.total_headcount(),
        }
    }

    /// Runs one period: optional monthly pass, weekly pass, merge, ledger update.
    ///
    /// # Errors
    /// - `Ledger` when a history count would overflow.
    /// - `PeriodLog` when the period log is inconsistent.
    ///
    /// `state` is left unchanged on error.
    pub fn advance(
        &self,
        state: &mut ScheduleState,
        shuffler: &mut dyn Shuffler,
    ) -> Result<RunReport, ScheduleError> {
        let mut next = state.clone();
        let run_id = Uuid::new_v4();
        let week_number = next.periods.next_number(PeriodKind::Weekly);
        let last_assignment = next.periods.last_assignments();
        let pool = next.roster.available_people();
        let mut excluded = BTreeSet::new();

        let monthly = match self.monthly_slate(week_number) {
            Some((cycle, catalog)) => {
                let allocation = self.allocator.allocate(
                    &AllocationInput {
                        pool: &pool,
                        catalog,
                        excluded: &excluded,
                        last_assignment: &last_assignment,
                        history: &next.history,
                    },
                    shuffler,
                );
                excluded.extend(allocation.assignments.keys().cloned());
                next.history.record_assignments(&allocation.assignments)?;

                let month_number = next.periods.next_number(PeriodKind::Monthly);
                let mut record = PeriodRecord::new(
                    PeriodKind::Monthly,
                    month_number,
                    allocation.assignments.clone(),
                );
                record.run_id = Some(run_id);
                next.periods.append(record)?;

                Some(MonthlyOutcome {
                    month_number,
                    cycle,
                    allocation,
                })
            }
            None => None,
        };

        let weekly = self.allocator.allocate(
            &AllocationInput {
                pool: &pool,
                catalog: &self.config.weekly,
                excluded: &excluded,
                last_assignment: &last_assignment,
                history: &next.history,
            },
            shuffler,
        );

        let mut merged = monthly
            .as_ref()
            .map(|outcome| outcome.allocation.assignments.clone())
            .unwrap_or_default();
        merged.extend(
            weekly
                .assignments
                .iter()
                .map(|(person, chore)| (person.clone(), chore.clone())),
        );
        next.history.record_assignments(&weekly.assignments)?;

        let mut record = PeriodRecord::new(PeriodKind::Weekly, week_number, merged.clone());
        record.run_id = Some(run_id);
        next.periods.append(record)?;

        *state = next;

        let report = RunReport {
            run_id,
            week_number,
            monthly,
            weekly,
            merged,
        };
        info!(
            "event=schedule_run module=scheduler status=ok run_id={} week={} month={} assigned={} unfilled={}",
            report.run_id,
            report.week_number,
            report
                .monthly
                .as_ref()
                .map_or_else(|| "none".to_string(), |outcome| outcome.month_number.to_string()),
            report.merged.len(),
            report.unfilled_slots()
        );
        Ok(report)
    }
}
