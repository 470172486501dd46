use chorewheel_core::db::open_db;
use chorewheel_core::table::assignment_table::{
    import_assignment_table, write_assignment_table,
};
use chorewheel_core::table::history_table::{import_history_table, write_history_table};
use chorewheel_core::{
    ChoreCatalog, PeriodScheduler, PreserveOrder, ScheduleStore, SchedulerConfig,
    SqliteScheduleStore, StoreError,
};
use std::fs;

#[test]
fn missing_table_file_is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = import_assignment_table(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, StoreError::SourceNotFound(_)));

    let err = import_history_table(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, StoreError::SourceNotFound(_)));
}

#[test]
fn sheet_without_identity_column_is_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staff.csv");
    fs::write(&path, "Name,Team\nAda,A\n").unwrap();

    let err = import_assignment_table(&path).unwrap_err();
    assert!(matches!(err, StoreError::SchemaError(ref message) if message.contains("Employee")));
}

#[test]
fn imported_table_continues_rotation_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("assignments.csv");
    let history_path = dir.path().join("history.csv");
    fs::write(
        &table_path,
        "Employee,Out,Week 1,Week 2\nAda,,Sweep,Dishes\nBo,,Dishes,Sweep\nCy,,,\nDee,TRUE,Sweep,\n",
    )
    .unwrap();
    fs::write(&history_path, "Employee,Sweep,Dishes\nAda,1,1\nBo,1,1\nDee,1,0\n").unwrap();

    let mut state = import_assignment_table(&table_path).unwrap();
    state.history = import_history_table(&history_path).unwrap();

    let mut conn = open_db(dir.path().join("chores.sqlite3")).unwrap();
    let mut store = SqliteScheduleStore::new(&mut conn);
    store.save(&state).unwrap();

    let scheduler = PeriodScheduler::new(SchedulerConfig::weekly_only(
        ChoreCatalog::from_pairs([("Sweep", 1), ("Dishes", 1)]),
    ))
    .unwrap();
    let mut loaded = store.load().unwrap();
    let report = scheduler.advance(&mut loaded, &mut PreserveOrder).unwrap();
    store.save(&loaded).unwrap();

    assert_eq!(report.week_number, 3);
    assert!(!report.merged.contains_key("Dee"));
    // Bo swept last week; Ada and Cy are eligible and Cy has no sweeping history.
    assert_eq!(report.merged.get("Cy").map(String::as_str), Some("Sweep"));
    assert_eq!(report.merged.get("Bo").map(String::as_str), Some("Dishes"));

    let mut table = Vec::new();
    write_assignment_table(&loaded, &mut table).unwrap();
    let table = String::from_utf8(table).unwrap();
    assert!(table.starts_with("Employee,Out,Week 1,Week 2,Week 3\n"));
    assert!(table.contains("Dee,TRUE,Sweep,,\n"));

    let mut history = Vec::new();
    write_history_table(&loaded.history, &loaded.roster, &mut history).unwrap();
    let history = String::from_utf8(history).unwrap();
    assert!(history.starts_with("Employee,Dishes,Sweep\n"));
    assert!(history.contains("Cy,0,1\n"));
}

#[test]
fn extra_sheet_columns_survive_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("staff.csv");
    fs::write(&table_path, "Employee,Team,Out,Week 1\nAda,Blue,,Sweep\nBo,,TRUE,\n").unwrap();

    let state = import_assignment_table(&table_path).unwrap();
    let mut conn = open_db(dir.path().join("chores.sqlite3")).unwrap();
    let mut store = SqliteScheduleStore::new(&mut conn);
    store.save(&state).unwrap();

    let mut table = Vec::new();
    write_assignment_table(&store.load().unwrap(), &mut table).unwrap();
    assert_eq!(
        String::from_utf8(table).unwrap(),
        "Employee,Team,Out,Week 1\nAda,Blue,,Sweep\nBo,,TRUE,\n"
    );
}
