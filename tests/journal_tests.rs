use blt::{DayStore, EntryKind, FsStore, IndexTarget, Journal, Scope, Session, Transition};
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

#[test]
fn migrating_buy_milk_forwards_it_to_the_next_day() {
    let (_dir, journal) = journal();
    let date = day(2024, 1, 1);
    journal.add(date, EntryKind::Task, "Buy milk", ["errand"]).unwrap();

    let result = journal.toggle_migrate(IndexTarget::Day(date), 0).unwrap();
    assert_eq!(result, Transition::Forwarded { target: day(2024, 1, 2) });

    let anchor = &journal.day_listing(date).unwrap()[0];
    assert_eq!(anchor.kind, EntryKind::Migrated);
    assert_eq!(anchor.scheduled_for, Some(day(2024, 1, 2)));

    let next = journal.day_listing(day(2024, 1, 2)).unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].kind, EntryKind::Task);
    assert_eq!(next[0].text, "Buy milk");
    assert_eq!(next[0].tags, vec!["errand".to_string()]);
    assert_ne!(next[0].id, anchor.id);
}

#[test]
fn visible_index_follows_the_filtered_window() {
    let (_dir, journal) = journal();
    journal.add(day(2024, 3, 11), EntryKind::Note, "monday note", Vec::<String>::new()).unwrap();
    journal.add(day(2024, 3, 13), EntryKind::Task, "wednesday task", Vec::<String>::new()).unwrap();
    journal.add(day(2024, 3, 14), EntryKind::Task, "thursday task", Vec::<String>::new()).unwrap();

    let mut session = Session::new(day(2024, 3, 14));
    session.set_scope(Scope::Week);
    session.set_kind_filter([EntryKind::Task]);

    // Visible index 0 is Wednesday's task, not Monday's note
    journal.toggle_complete(IndexTarget::Visible(&session), 0).unwrap();
    assert_eq!(journal.day_listing(day(2024, 3, 13)).unwrap()[0].kind, EntryKind::Done);
    assert_eq!(journal.day_listing(day(2024, 3, 11)).unwrap()[0].kind, EntryKind::Note);

    assert_eq!(
        journal.delete(IndexTarget::Visible(&session), 5).unwrap(),
        Transition::Unchanged
    );
}

#[test]
fn retype_and_tags_are_persisted() {
    let (_dir, journal) = journal();
    let date = day(2024, 8, 8);
    journal.add(date, EntryKind::Task, "  sketch logo  ", Vec::<String>::new()).unwrap();
    assert_eq!(journal.day_listing(date).unwrap()[0].text, "sketch logo");

    journal.retype(IndexTarget::Day(date), 0, EntryKind::Inspiration).unwrap();
    journal
        .replace_tags(IndexTarget::Day(date), 0, ["#Design", "design", " art "])
        .unwrap();

    let entry = &journal.store().load_day(date).unwrap()[0];
    assert_eq!(entry.kind, EntryKind::Inspiration);
    assert_eq!(entry.tags, vec!["design".to_string(), "art".to_string()]);
}

#[test]
fn completing_twice_reopens_the_task() {
    let (_dir, journal) = journal();
    let date = day(2024, 8, 8);
    journal.add(date, EntryKind::Task, "ship", Vec::<String>::new()).unwrap();

    journal.toggle_complete(IndexTarget::Day(date), 0).unwrap();
    let done = &journal.day_listing(date).unwrap()[0];
    assert_eq!(done.kind, EntryKind::Done);
    assert!(done.completed_at.is_some());

    journal.toggle_complete(IndexTarget::Day(date), 0).unwrap();
    let reopened = &journal.day_listing(date).unwrap()[0];
    assert_eq!(reopened.kind, EntryKind::Task);
    assert!(reopened.completed_at.is_none());
}
