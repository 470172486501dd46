//! Wide assignment table: roster columns (`Employee`, `Out`, anything else),
//! then `Week n` / `Month m` columns.
//!
//! # Responsibility
//! - Bootstrap a `ScheduleState` from an existing tabular export.
//! - Render the roster and period log back into the same layout.
//!
//! # Invariants
//! - Period columns are read in column order, which is chronological order.
//! - Per-kind period numbers in headers must run 1, 2, 3, ... without gaps.
//! - Other columns are kept as person attributes and written back in their
//!   original order, ahead of the period columns.

use crate::model::history::HistoryLedger;
use crate::model::period::{Assignments, PeriodKind, PeriodLog, PeriodRecord};
use crate::model::roster::{Person, Roster};
use crate::model::state::ScheduleState;
use crate::repo::schedule_repo::{StoreError, StoreResult};
use crate::table::{open_source, EMPLOYEE_COLUMN};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Read, Write};
use std::path::Path;

/// Availability column name.
pub const OUT_COLUMN: &str = "Out";

static PERIOD_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Week|Month)\s+(\d+)$").expect("valid period header regex"));

/// Parses `Week 3` / `Month 1` style headers.
pub fn parse_period_header(header: &str) -> Option<(PeriodKind, u32)> {
    let caps = PERIOD_HEADER_RE.captures(header.trim())?;
    let kind = match caps.get(1)?.as_str() {
        "Week" => PeriodKind::Weekly,
        _ => PeriodKind::Monthly,
    };
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some((kind, number))
}

/// Reads a wide assignment table into roster + period log.
///
/// The returned state has an empty history ledger.
///
/// # Errors
/// - `SchemaError` when no `Employee` column exists, a name repeats, or
///   period headers are out of sequence.
pub fn read_assignment_table<R: Read>(reader: R) -> StoreResult<ScheduleState> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let employee_index = headers
        .iter()
        .position(|header| header == EMPLOYEE_COLUMN)
        .ok_or_else(|| {
            StoreError::SchemaError(format!("no `{EMPLOYEE_COLUMN}` column found"))
        })?;
    let out_index = headers.iter().position(|header| header == OUT_COLUMN);
    let mut period_columns: Vec<(usize, PeriodKind, u32)> = Vec::new();
    let mut attribute_columns: Vec<(usize, &str)> = Vec::new();
    let mut layout = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some((kind, number)) = parse_period_header(header) {
            period_columns.push((index, kind, number));
            continue;
        }
        if header.is_empty() {
            continue;
        }
        if index != employee_index && Some(index) != out_index {
            attribute_columns.push((index, header));
        }
        layout.push(header.to_string());
    }

    let mut roster = Roster::new();
    roster
        .set_columns(layout)
        .map_err(|err| StoreError::SchemaError(err.to_string()))?;
    let mut columns = vec![Assignments::new(); period_columns.len()];
    for record in csv_reader.records() {
        let record = record?;
        let name = record.get(employee_index).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let is_out = out_index
            .and_then(|index| record.get(index))
            .is_some_and(is_truthy);
        let mut person = Person::with_availability(name, !is_out);
        for (index, column) in &attribute_columns {
            if let Some(value) = record.get(*index).filter(|value| !value.is_empty()) {
                person.attributes.insert(column.to_string(), value.to_string());
            }
        }
        roster
            .add_person(person)
            .map_err(|err| StoreError::SchemaError(err.to_string()))?;

        for ((index, _, _), column) in period_columns.iter().zip(columns.iter_mut()) {
            if let Some(chore) = record.get(*index).filter(|chore| !chore.is_empty()) {
                column.insert(name.to_string(), chore.to_string());
            }
        }
    }

    let mut periods = PeriodLog::new();
    for ((_, kind, number), assignments) in period_columns.into_iter().zip(columns) {
        periods
            .append(PeriodRecord::new(kind, number, assignments))
            .map_err(|err| StoreError::SchemaError(err.to_string()))?;
    }

    Ok(ScheduleState {
        roster,
        periods,
        history: HistoryLedger::new(),
    })
}

/// Reads a wide assignment table file.
///
/// # Errors
/// - `SourceNotFound` when `path` does not exist.
/// - Everything `read_assignment_table` returns.
pub fn import_assignment_table(path: impl AsRef<Path>) -> StoreResult<ScheduleState> {
    read_assignment_table(open_source(path.as_ref())?)
}

/// Writes the roster columns, then every period oldest first.
///
/// An `Out` column is added after `Employee` when the imported layout had none.
pub fn write_assignment_table<W: Write>(state: &ScheduleState, writer: W) -> StoreResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let records = state.periods.records();
    let layout = roster_layout(state.roster.columns());

    let mut header = layout.clone();
    header.extend(records.iter().map(PeriodRecord::label));
    csv_writer.write_record(&header)?;

    for person in state.roster.people() {
        let mut row = Vec::with_capacity(header.len());
        for column in &layout {
            let cell = match column.as_str() {
                EMPLOYEE_COLUMN => person.name.as_str(),
                OUT_COLUMN if person.available => "",
                OUT_COLUMN => "TRUE",
                other => person.attributes.get(other).map(String::as_str).unwrap_or_default(),
            };
            row.push(cell);
        }
        for record in records {
            row.push(
                record
                    .assignments
                    .get(&person.name)
                    .map(String::as_str)
                    .unwrap_or_default(),
            );
        }
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn roster_layout(columns: &[String]) -> Vec<String> {
    let mut layout: Vec<String> = if columns.iter().any(|column| column == EMPLOYEE_COLUMN) {
        columns.to_vec()
    } else {
        vec![EMPLOYEE_COLUMN.to_string()]
    };
    if !layout.iter().any(|column| column == OUT_COLUMN) {
        let at = layout
            .iter()
            .position(|column| column == EMPLOYEE_COLUMN)
            .map_or(0, |index| index + 1);
        layout.insert(at, OUT_COLUMN.to_string());
    }
    layout
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "x" | "out"
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_period_header, read_assignment_table, write_assignment_table};
    use crate::model::period::PeriodKind;
    use crate::repo::schedule_repo::StoreError;

    #[test]
    fn period_headers_parse_kind_and_number() {
        assert_eq!(parse_period_header("Week 12"), Some((PeriodKind::Weekly, 12)));
        assert_eq!(parse_period_header(" Month 1 "), Some((PeriodKind::Monthly, 1)));
        assert_eq!(parse_period_header("Weekly 1"), None);
        assert_eq!(parse_period_header("Notes"), None);
    }

    #[test]
    fn reads_roster_out_flag_and_periods_in_column_order() {
        let csv = "Employee,Out,Team,Week 1,Week 2,Month 1,Week 3\n\
                   Ada,,A,Sweep,Mop,,Dishes\n\
                   Bo,TRUE,B,Mop,,Fridges,Fridges\n\
                   ,,,,,,\n";
        let state = read_assignment_table(csv.as_bytes()).unwrap();

        assert_eq!(state.roster.len(), 2);
        assert!(!state.roster.get("Bo").unwrap().available);
        let labels: Vec<String> = state.periods.records().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Week 1", "Week 2", "Month 1", "Week 3"]);
        assert_eq!(state.periods.records()[1].assignments.len(), 1);
        assert_eq!(state.periods.last_assignments()["Ada"], "Dishes");
        assert_eq!(state.roster.columns(), ["Employee", "Out", "Team"]);
        assert_eq!(state.roster.get("Bo").unwrap().attributes["Team"], "B");
    }

    #[test]
    fn missing_employee_column_is_schema_error() {
        let err = read_assignment_table("Name,Week 1\nAda,Sweep\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::SchemaError(_)));
    }

    #[test]
    fn out_of_sequence_headers_are_schema_error() {
        let err = read_assignment_table("Employee,Week 2\nAda,Sweep\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::SchemaError(ref message) if message.contains("expected 1")));
    }

    #[test]
    fn write_then_read_keeps_layout() {
        let csv = "Employee,Out,Week 1,Month 1,Week 2\nAda,,Sweep,Fridges,Fridges\nBo,TRUE,Mop,,Sweep\n";
        let state = read_assignment_table(csv.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write_assignment_table(&state, &mut buffer).unwrap();
        let rendered = String::from_utf8(buffer).unwrap();

        assert_eq!(rendered, csv);
    }

    #[test]
    fn extra_columns_keep_their_position_and_values() {
        let csv = "Team,Employee,Shift,Out,Week 1\nA,Ada,Early,,Sweep\nB,Bo,,TRUE,Mop\n";
        let state = read_assignment_table(csv.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write_assignment_table(&state, &mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), csv);
        assert!(!state.roster.get("Bo").unwrap().attributes.contains_key("Shift"));
    }

    #[test]
    fn missing_out_column_is_added_after_employee() {
        let csv = "Employee,Team\nAda,A\n";
        let mut state = read_assignment_table(csv.as_bytes()).unwrap();
        state.roster.set_available("Ada", false).unwrap();

        let mut buffer = Vec::new();
        write_assignment_table(&state, &mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "Employee,Out,Team\nAda,TRUE,A\n");
    }

    #[test]
    fn repeated_column_name_is_schema_error() {
        let err = read_assignment_table("Employee,Team,Team\nAda,A,B\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::SchemaError(ref message) if message.contains("Team")));
    }
}
