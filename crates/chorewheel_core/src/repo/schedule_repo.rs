//! Schedule store contract and SQLite implementation.
//!
//! # Responsibility
//! - Load the roster, period log and history ledger as one `ScheduleState`.
//! - Write a whole state back inside one transaction.
//!
//! # Invariants
//! - Stored periods are append-only: `save` inserts only records beyond the
//!   stored prefix and refuses a state whose log is shorter than storage.
//! - Stored history counts never decrease.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{open_db, DbError};
use crate::model::history::HistoryLedger;
use crate::model::period::{Assignments, PeriodKind, PeriodLog, PeriodRecord};
use crate::model::roster::{Person, Roster};
use crate::model::state::ScheduleState;
use log::info;
use rusqlite::{params, Connection, Transaction};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence adapter errors.
#[derive(Debug)]
pub enum StoreError {
    /// Required database or table file does not exist.
    SourceNotFound(PathBuf),
    /// No identity column (or an unusable layout) in a table being imported.
    SchemaError(String),
    Db(DbError),
    Csv(csv::Error),
    Io(std::io::Error),
    InvalidData(String),
    /// Storage holds more periods than the state being saved.
    StaleState { stored: usize, in_memory: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound(path) => write!(f, "{} does not exist", path.display()),
            Self::SchemaError(message) => write!(f, "schema error: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored schedule data: {message}"),
            Self::StaleState { stored, in_memory } => write!(
                f,
                "stored period log has {stored} periods but the state to save has {in_memory}; reload before saving"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Load/save contract for schedule state.
pub trait ScheduleStore {
    fn load(&self) -> StoreResult<ScheduleState>;
    fn save(&mut self, state: &ScheduleState) -> StoreResult<()>;
}

/// Opens an existing database file.
///
/// # Errors
/// - `SourceNotFound` when `path` does not exist; nothing is created.
pub fn open_existing_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StoreError::SourceNotFound(path.to_path_buf()));
    }
    Ok(open_db(path)?)
}

/// SQLite-backed schedule store.
pub struct SqliteScheduleStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteScheduleStore<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    fn load_roster(&self) -> StoreResult<Roster> {
        let mut attributes: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut attr_stmt = self
            .conn
            .prepare("SELECT person, column_name, value FROM person_attributes;")?;
        let mut attr_rows = attr_stmt.query([])?;
        while let Some(row) = attr_rows.next()? {
            attributes
                .entry(row.get("person")?)
                .or_default()
                .insert(row.get("column_name")?, row.get("value")?);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT name, is_out FROM people ORDER BY roster_order ASC, name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut roster = Roster::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            let is_out = int_to_bool(row.get("is_out")?, "people.is_out")?;
            let mut person = Person::with_availability(name, !is_out);
            person.attributes = attributes.remove(&person.name).unwrap_or_default();
            roster
                .add_person(person)
                .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        }

        let columns = self
            .conn
            .prepare("SELECT name FROM roster_columns ORDER BY position ASC;")?
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        roster
            .set_columns(columns)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        Ok(roster)
    }

    fn load_history(&self) -> StoreResult<HistoryLedger> {
        let mut stmt = self
            .conn
            .prepare("SELECT person, chore, count FROM chore_history;")?;
        let mut rows = stmt.query([])?;
        let mut history = HistoryLedger::new();
        while let Some(row) = rows.next()? {
            let person: String = row.get("person")?;
            let chore: String = row.get("chore")?;
            let raw: i64 = row.get("count")?;
            let count = u32::try_from(raw).map_err(|_| {
                StoreError::InvalidData(format!(
                    "invalid count `{raw}` for `{person}` / `{chore}` in chore_history.count"
                ))
            })?;
            history.set_count(person, chore, count);
        }
        Ok(history)
    }
}

impl ScheduleStore for SqliteScheduleStore<'_> {
    fn load(&self) -> StoreResult<ScheduleState> {
        let started_at = Instant::now();
        let state = ScheduleState {
            roster: self.load_roster()?,
            periods: read_period_log(&*self.conn)?,
            history: self.load_history()?,
        };
        info!(
            "event=store_load module=repo status=ok people={} periods={} duration_ms={}",
            state.roster.len(),
            state.periods.len(),
            started_at.elapsed().as_millis()
        );
        Ok(state)
    }

    fn save(&mut self, state: &ScheduleState) -> StoreResult<()> {
        let started_at = Instant::now();
        let tx = self.conn.transaction()?;

        save_roster(&tx, &state.roster)?;
        let appended = save_periods(&tx, &state.periods)?;
        save_history(&tx, &state.history)?;

        tx.commit()?;
        info!(
            "event=store_save module=repo status=ok people={} appended_periods={} duration_ms={}",
            state.roster.len(),
            appended,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn save_roster(tx: &Transaction<'_>, roster: &Roster) -> StoreResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO people (name, is_out, roster_order) VALUES (?1, ?2, ?3)
         ON CONFLICT (name) DO UPDATE SET
            is_out = excluded.is_out,
            roster_order = excluded.roster_order;",
    )?;
    for (index, person) in roster.people().iter().enumerate() {
        stmt.execute(params![
            person.name.as_str(),
            bool_to_int(!person.available),
            index_to_i64(index)?,
        ])?;
    }

    // Layout and attributes mirror the saved roster exactly.
    tx.execute_batch("DELETE FROM roster_columns; DELETE FROM person_attributes;")?;
    let mut column_stmt = tx.prepare("INSERT INTO roster_columns (position, name) VALUES (?1, ?2);")?;
    for (index, column) in roster.columns().iter().enumerate() {
        column_stmt.execute(params![index_to_i64(index)?, column.as_str()])?;
    }
    let mut attr_stmt = tx.prepare(
        "INSERT INTO person_attributes (person, column_name, value) VALUES (?1, ?2, ?3);",
    )?;
    for person in roster.people() {
        for (column, value) in &person.attributes {
            attr_stmt.execute(params![person.name.as_str(), column.as_str(), value.as_str()])?;
        }
    }
    Ok(())
}

fn save_periods(tx: &Transaction<'_>, periods: &PeriodLog) -> StoreResult<usize> {
    let stored_log = read_period_log(tx)?;
    let stored = stored_log.len();
    if stored > periods.len() {
        return Err(StoreError::StaleState {
            stored,
            in_memory: periods.len(),
        });
    }

    // Two runs advanced from one snapshot share numbering but not run ids or rows.
    for (index, (stored_record, record)) in stored_log
        .records()
        .iter()
        .zip(periods.records())
        .enumerate()
    {
        if stored_record != record {
            return Err(StoreError::InvalidData(format!(
                "stored period {} (`{}`) differs from `{}` in the state to save",
                index + 1,
                stored_record.label(),
                record.label()
            )));
        }
    }

    let mut period_stmt =
        tx.prepare("INSERT INTO periods (seq, kind, number, run_id) VALUES (?1, ?2, ?3, ?4);")?;
    let mut assignment_stmt = tx.prepare(
        "INSERT INTO period_assignments (period_seq, person, chore) VALUES (?1, ?2, ?3);",
    )?;
    for (index, record) in periods.records().iter().enumerate().skip(stored) {
        let seq = index_to_i64(index + 1)?;
        period_stmt.execute(params![
            seq,
            record.kind.as_str(),
            record.number,
            record.run_id.map(|id| id.to_string()),
        ])?;
        for (person, chore) in &record.assignments {
            assignment_stmt.execute(params![seq, person.as_str(), chore.as_str()])?;
        }
    }

    Ok(periods.len() - stored)
}

fn save_history(tx: &Transaction<'_>, history: &HistoryLedger) -> StoreResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO chore_history (person, chore, count) VALUES (?1, ?2, ?3)
         ON CONFLICT (person, chore) DO UPDATE SET count = excluded.count
         WHERE excluded.count >= chore_history.count;",
    )?;
    for (person, chore, count) in history.cells() {
        stmt.execute(params![person, chore, count])?;
    }
    Ok(())
}

fn read_period_log(conn: &Connection) -> StoreResult<PeriodLog> {
    let mut period_stmt = conn
        .prepare("SELECT seq, kind, number, run_id FROM periods ORDER BY seq ASC;")?;
    let mut assignment_stmt = conn.prepare(
        "SELECT person, chore FROM period_assignments WHERE period_seq = ?1 ORDER BY person ASC;",
    )?;

    let mut log = PeriodLog::new();
    let mut rows = period_stmt.query([])?;
    while let Some(row) = rows.next()? {
        let seq: i64 = row.get("seq")?;
        if usize::try_from(seq).ok() != Some(log.len() + 1) {
            return Err(StoreError::InvalidData(format!(
                "period sequence gap at periods.seq {seq}"
            )));
        }

        let kind_text: String = row.get("kind")?;
        let kind = PeriodKind::parse(&kind_text).ok_or_else(|| {
            StoreError::InvalidData(format!("invalid period kind `{kind_text}` in periods.kind"))
        })?;
        let number: u32 = row.get("number")?;
        let run_id = match row.get::<_, Option<String>>("run_id")? {
            Some(text) => Some(Uuid::parse_str(&text).map_err(|_| {
                StoreError::InvalidData(format!("invalid run id `{text}` in periods.run_id"))
            })?),
            None => None,
        };

        let assignments: Assignments = assignment_stmt
            .query_map([seq], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<_, _>>()?;

        let mut record = PeriodRecord::new(kind, number, assignments);
        record.run_id = run_id;
        log.append(record)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
    }
    Ok(log)
}

fn index_to_i64(index: usize) -> StoreResult<i64> {
    i64::try_from(index).map_err(|_| StoreError::InvalidData(format!("index {index} overflows")))
}

fn int_to_bool(value: i64, column: &str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
