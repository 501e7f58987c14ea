use blt::{DayStore, Entry, EntryKind, FsStore};
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn days_live_under_year_and_month() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    store.append(day(2024, 3, 9), Entry::new(EntryKind::Task, "water plants")).unwrap();
    assert!(dir.path().join("2024").join("03").join("09.jsonl").is_file());
}

#[test]
fn missing_day_reads_empty_without_creating_directories() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    assert!(store.load_day(day(1999, 12, 31)).unwrap().is_empty());
    assert!(!dir.path().join("1999").exists());
}

#[test]
fn appended_entries_keep_order_and_get_ids() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    let date = day(2024, 1, 1);
    let first = store.append(date, Entry::new(EntryKind::Task, "one")).unwrap();
    let second = store.append(date, Entry::new(EntryKind::Event, "two")).unwrap();
    assert_ne!(first, second);

    let entries = store.load_day(date).unwrap();
    let texts: Vec<_> = entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["one", "two"]);
    assert_eq!(entries[0].id, first);
    assert!(entries[1].created_at.is_some());
}

#[test]
fn update_and_delete_report_matches() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    let date = day(2024, 1, 1);
    let id = store.append(date, Entry::new(EntryKind::Task, "draft")).unwrap();

    let mut entry = store.load_day(date).unwrap().remove(0);
    entry.text = "final".to_string();
    assert!(store.update(date, &entry).unwrap());

    let mut stranger = Entry::new(EntryKind::Task, "ghost");
    stranger.id = "missing".to_string();
    assert!(!store.update(date, &stranger).unwrap());
    assert!(!store.delete(date, "missing").unwrap());

    assert_eq!(store.load_day(date).unwrap()[0].text, "final");
    assert!(store.delete(date, &id).unwrap());
    assert!(store.load_day(date).unwrap().is_empty());
}

#[test]
fn saving_nothing_leaves_an_empty_day_and_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    let date = day(2024, 5, 20);
    store.append(date, Entry::new(EntryKind::Note, "gone soon")).unwrap();
    store.save_day(date, &[]).unwrap();

    let path = store.day_path(date);
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    let date = day(2024, 2, 2);
    let path = store.day_path(date);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "{\"id\":\"a\",\"type\":\"task\",\"text\":\"kept\"}\r\n\nnot json\n{\"id\":\"b\",\"type\":\"note\",\"text\":\"also kept\"}\n",
    )
    .unwrap();

    let entries = store.load_day(date).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "kept");
    assert_eq!(entries[1].kind, EntryKind::Note);
}
