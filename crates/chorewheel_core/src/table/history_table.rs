//! History ledger table: `Employee` plus one count column per chore.

use crate::model::history::HistoryLedger;
use crate::model::roster::Roster;
use crate::repo::schedule_repo::{StoreError, StoreResult};
use crate::table::{open_source, EMPLOYEE_COLUMN};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

/// Reads a history table. Empty cells and zeros are not stored.
///
/// # Errors
/// - `SchemaError` when no `Employee` column exists.
/// - `InvalidData` for negative, fractional or non-numeric counts.
pub fn read_history_table<R: Read>(reader: R) -> StoreResult<HistoryLedger> {
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

    let mut history = HistoryLedger::new();
    for record in csv_reader.records() {
        let record = record?;
        let person = record.get(employee_index).unwrap_or_default();
        if person.is_empty() {
            continue;
        }
        for (index, chore) in headers.iter().enumerate() {
            if index == employee_index || chore.is_empty() {
                continue;
            }
            let cell = record.get(index).unwrap_or_default();
            let count = parse_count(cell).ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "invalid count `{cell}` for `{person}` / `{chore}`"
                ))
            })?;
            if count > 0 {
                history.set_count(person, chore, count);
            }
        }
    }
    Ok(history)
}

/// Reads a history table file.
pub fn import_history_table(path: impl AsRef<Path>) -> StoreResult<HistoryLedger> {
    read_history_table(open_source(path.as_ref())?)
}

/// Writes one row per roster person, then ledger-only people by name.
pub fn write_history_table<W: Write>(
    history: &HistoryLedger,
    roster: &Roster,
    writer: W,
) -> StoreResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let chores = history.chores();

    let mut header = vec![EMPLOYEE_COLUMN.to_string()];
    header.extend(chores.iter().cloned());
    csv_writer.write_record(&header)?;

    let on_roster: BTreeSet<&str> = roster
        .people()
        .iter()
        .map(|person| person.name.as_str())
        .collect();
    let people = roster
        .people()
        .iter()
        .map(|person| person.name.as_str())
        .chain(history.people().filter(|person| !on_roster.contains(person)));

    for person in people {
        let mut row = Vec::with_capacity(header.len());
        row.push(person.to_string());
        row.extend(
            chores
                .iter()
                .map(|chore| history.count(person, chore).to_string()),
        );
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn parse_count(cell: &str) -> Option<u32> {
    if cell.is_empty() {
        return Some(0);
    }
    if let Ok(count) = cell.parse::<u32>() {
        return Some(count);
    }
    // Spreadsheet exports often render integer counts as `3.0`.
    let value = cell.parse::<f64>().ok()?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::{read_history_table, write_history_table};
    use crate::model::roster::{Person, Roster};
    use crate::repo::schedule_repo::StoreError;

    #[test]
    fn reads_counts_and_accepts_float_cells() {
        let csv = "Employee,Sweep,Mop\nAda,3.0,\nBo,0,2\n";
        let history = read_history_table(csv.as_bytes()).unwrap();

        assert_eq!(history.count("Ada", "Sweep"), 3);
        assert_eq!(history.count("Ada", "Mop"), 0);
        assert_eq!(history.count("Bo", "Mop"), 2);
        assert_eq!(history.chores(), vec!["Mop", "Sweep"]);
    }

    #[test]
    fn rejects_negative_counts() {
        let err = read_history_table("Employee,Sweep\nAda,-1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(ref message) if message.contains("Ada")));
    }

    #[test]
    fn writes_roster_people_first_then_ledger_only_people() {
        let csv = "Employee,Sweep\nZed,4\nAda,1\n";
        let history = read_history_table(csv.as_bytes()).unwrap();
        let roster = Roster::from_people([Person::new("Bo"), Person::new("Ada")]).unwrap();

        let mut buffer = Vec::new();
        write_history_table(&history, &roster, &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Employee,Sweep\nBo,0\nAda,1\nZed,4\n"
        );
    }
}
