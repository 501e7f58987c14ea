use blt::cli::{self, CliError};
use blt::{EntryKind, FsStore, Journal, Scope};
use chrono::NaiveDate;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn journal() -> (TempDir, Journal<FsStore>) {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    (dir, Journal::new(store))
}

fn run_list(journal: &Journal<FsStore>, scope: Scope, json: bool) -> String {
    let mut out = Vec::new();
    cli::handle_list(journal, scope, Some(day(2024, 1, 1)), None, None, None, json, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn add_then_list_shows_day_indexes() {
    let (_dir, journal) = journal();
    let mut out = Vec::new();
    cli::handle_add(&journal, Some("Buy milk".into()), None, EntryKind::Task, Some(day(2024, 1, 1)), Some("home, #Errand".into()), &mut out).unwrap();
    cli::handle_add(&journal, None, Some("Remember the lid".into()), EntryKind::Task, Some(day(2024, 1, 1)), None, &mut out).unwrap();
    let id = String::from_utf8(out).unwrap();
    assert_eq!(id.lines().count(), 2);

    assert_eq!(
        run_list(&journal, Scope::Day, false),
        "0. • Buy milk  [#home #errand]\n1. – Remember the lid\n"
    );
}

#[test]
fn migrate_reports_and_lists_the_clone_on_the_next_day() {
    let (_dir, journal) = journal();
    journal.add(day(2024, 1, 1), EntryKind::Task, "Buy milk", Vec::<String>::new()).unwrap();

    let mut out = Vec::new();
    cli::handle_migrate(&journal, 0, day(2024, 1, 1), &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Moved 2024-01-01 index 0 to 2024-01-02\n"
    );

    assert_eq!(
        run_list(&journal, Scope::Week, false),
        "2024-01-01 0. » Buy milk\n2024-01-02 0. • Buy milk\n"
    );
}

#[test]
fn json_listing_carries_ids_and_types() {
    let (_dir, journal) = journal();
    let id = journal.add(day(2024, 1, 1), EntryKind::Event, "Standup", ["work"]).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&run_list(&journal, Scope::Day, true)).unwrap();
    let first = &parsed[0];
    assert_eq!(first["date"], "2024-01-01");
    assert_eq!(first["index"], 0);
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["type"], "event");
    assert_eq!(first["tags"][0], "work");
}

#[test]
fn empty_text_is_rejected_without_writing() {
    let (_dir, journal) = journal();
    let mut out = Vec::new();
    let err = cli::handle_add(&journal, Some("   ".into()), None, EntryKind::Task, Some(day(2024, 1, 1)), None, &mut out);
    assert!(matches!(err, Err(CliError::MissingText)));

    journal.add(day(2024, 1, 1), EntryKind::Task, "keep", Vec::<String>::new()).unwrap();
    let err = cli::handle_edit(&journal, 0, day(2024, 1, 1), " ".into(), &mut out);
    assert!(matches!(err, Err(CliError::MissingText)));
    assert_eq!(journal.day_listing(day(2024, 1, 1)).unwrap()[0].text, "keep");
}

#[test]
fn out_of_range_index_changes_nothing() {
    let (_dir, journal) = journal();
    let mut out = Vec::new();
    cli::handle_delete(&journal, 3, day(2024, 1, 1), &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Nothing changed at 2024-01-01 index 3\n"
    );
}
