//! Entry lifecycle: completion, retyping and the cross-day forward protocol.
//!
//! Migrating or scheduling forks an entry. The anchor stays on its day,
//! marked `Migrated`/`Scheduled` with `scheduled_for` pointing at the target
//! day, and a fresh clone carrying the text and tags is appended to the
//! target day. The two records are independent; undo finds the clone again
//! by matching text and kind on the target day.
//!
//! Undo picks the *first* Task/Event on the target day whose text matches
//! case-insensitively. With two same-text entries on that day it may pick
//! the wrong one.

use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info};

use crate::models::{Entry, EntryKind};
use crate::store::{DayStore, StoreResult};

/// Outcome of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing matched or the operation does not apply to this entry.
    Unchanged,
    /// The entry was rewritten in place.
    Updated,
    /// The entry was removed from its day.
    Removed,
    /// The anchor was marked and a clone appended to `target`.
    Forwarded { target: NaiveDate },
    /// The anchor was restored; `clone_removed` is false when no clone matched.
    Restored { target: NaiveDate, clone_removed: bool },
}

impl Transition {
    pub fn changed(self) -> bool {
        self != Transition::Unchanged
    }
}

/// Task becomes Done, Done becomes Task. Any other kind is left alone.
pub fn toggle_complete(entry: &mut Entry, now: DateTime<Local>) -> bool {
    match entry.kind {
        EntryKind::Task => {
            entry.kind = EntryKind::Done;
            entry.completed_at = Some(now);
            true
        }
        EntryKind::Done => {
            entry.kind = EntryKind::Task;
            entry.completed_at = None;
            true
        }
        _ => false,
    }
}

/// Assign `kind` directly, keeping `completed_at` and `scheduled_for` consistent with it.
pub fn retype(entry: &mut Entry, kind: EntryKind, now: DateTime<Local>) {
    entry.kind = kind;
    entry.completed_at = if kind == EntryKind::Done { Some(now) } else { None };
    if kind != EntryKind::Scheduled {
        entry.scheduled_for = None;
    }
}

/// Mark the anchor as forwarded to `target`.
pub fn mark_forwarded(entry: &mut Entry, kind: EntryKind, target: NaiveDate) {
    entry.kind = kind;
    entry.scheduled_for = Some(target);
    entry.completed_at = None;
}

/// Put the anchor back to `kind` and drop the forwarding fields.
pub fn restore_from_forward(entry: &mut Entry, kind: EntryKind) {
    entry.kind = kind;
    entry.scheduled_for = None;
    entry.completed_at = None;
}

/// Fresh copy of `entry` for the target day: new identity, same kind, text, tags and highlight.
pub fn forward_clone(entry: &Entry) -> Entry {
    Entry {
        id: String::new(),
        kind: entry.kind,
        text: entry.text.clone(),
        tags: entry.tags.clone(),
        created_at: None,
        scheduled_for: None,
        completed_at: None,
        highlight: entry.highlight.clone(),
    }
}

/// First Task/Event in stored order whose text equals `text` ignoring case.
pub fn find_clone<'a>(entries: &'a [Entry], text: &str) -> Option<&'a Entry> {
    let wanted = text.to_lowercase();
    entries
        .iter()
        .find(|e| e.kind.is_actionable() && e.text.to_lowercase() == wanted)
}

/// Toggle the complete state of `entry` on `date` and persist it.
pub fn complete<S: DayStore>(
    store: &S,
    date: NaiveDate,
    mut entry: Entry,
    now: DateTime<Local>,
) -> StoreResult<Transition> {
    if !toggle_complete(&mut entry, now) {
        return Ok(Transition::Unchanged);
    }
    store.update(date, &entry)?;
    Ok(Transition::Updated)
}

/// Migrate a Task/Event to the next day, or undo a previous migration.
pub fn toggle_migrate<S: DayStore>(store: &S, date: NaiveDate, entry: Entry) -> StoreResult<Transition> {
    match entry.kind {
        EntryKind::Migrated => {
            let target = entry.scheduled_for.unwrap_or_else(|| next_day(date));
            undo_forward(store, date, entry, target)
        }
        kind if kind.is_actionable() => forward(store, date, entry, EntryKind::Migrated, next_day(date)),
        _ => Ok(Transition::Unchanged),
    }
}

/// Schedule a Task/Event onto `target`, or undo a previous scheduling.
///
/// On a `Scheduled` anchor `target` is ignored and the scheduling is undone.
pub fn toggle_schedule<S: DayStore>(
    store: &S,
    date: NaiveDate,
    entry: Entry,
    target: NaiveDate,
) -> StoreResult<Transition> {
    match entry.kind {
        EntryKind::Scheduled => match entry.scheduled_for {
            Some(recorded) => undo_forward(store, date, entry, recorded),
            None => Ok(Transition::Unchanged),
        },
        kind if kind.is_actionable() => forward(store, date, entry, EntryKind::Scheduled, target),
        _ => Ok(Transition::Unchanged),
    }
}

fn forward<S: DayStore>(
    store: &S,
    date: NaiveDate,
    entry: Entry,
    marker: EntryKind,
    target: NaiveDate,
) -> StoreResult<Transition> {
    let clone = forward_clone(&entry);
    let mut anchor = entry;
    mark_forwarded(&mut anchor, marker, target);
    store.update(date, &anchor)?;
    let clone_id = store.append(target, clone)?;
    info!(
        "event=entry_forwarded module=lifecycle status=ok kind={} from={} to={} anchor={} clone={}",
        marker, date, target, anchor.id, clone_id
    );
    Ok(Transition::Forwarded { target })
}

fn undo_forward<S: DayStore>(
    store: &S,
    date: NaiveDate,
    entry: Entry,
    target: NaiveDate,
) -> StoreResult<Transition> {
    let target_entries = store.load_day(target)?;
    let clone = find_clone(&target_entries, &entry.text);
    let restored_kind = clone.map(|c| c.kind).unwrap_or(EntryKind::Task);
    let clone_id = clone.map(|c| c.id.clone());

    let mut anchor = entry;
    restore_from_forward(&mut anchor, restored_kind);
    store.update(date, &anchor)?;

    let clone_removed = match clone_id {
        Some(id) => store.delete(target, &id)?,
        None => {
            debug!(
                "event=clone_missing module=lifecycle status=ok date={} target={} anchor={}",
                date, target, anchor.id
            );
            false
        }
    };
    info!(
        "event=forward_undone module=lifecycle status=ok date={} target={} restored={} clone_removed={}",
        date, target, restored_kind, clone_removed
    );
    Ok(Transition::Restored { target, clone_removed })
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Local> {
        Local::now()
    }

    #[test]
    fn complete_toggles_task_and_done_only() {
        let mut entry = Entry::new(EntryKind::Task, "write report");
        assert!(toggle_complete(&mut entry, now()));
        assert_eq!(entry.kind, EntryKind::Done);
        assert!(entry.completed_at.is_some());

        assert!(toggle_complete(&mut entry, now()));
        assert_eq!(entry.kind, EntryKind::Task);
        assert!(entry.completed_at.is_none());

        for kind in [EntryKind::Note, EntryKind::Migrated, EntryKind::Scheduled, EntryKind::Event] {
            let mut other = Entry::new(kind, "x");
            assert!(!toggle_complete(&mut other, now()));
            assert_eq!(other.kind, kind);
            assert!(other.completed_at.is_none());
        }
    }

    #[test]
    fn only_unchanged_reports_no_change() {
        let target = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(!Transition::Unchanged.changed());
        assert!(Transition::Updated.changed());
        assert!(Transition::Removed.changed());
        assert!(Transition::Forwarded { target }.changed());
        assert!(Transition::Restored { target, clone_removed: false }.changed());
    }

    #[test]
    fn retype_normalizes_related_fields() {
        let mut entry = Entry::new(EntryKind::Task, "x");
        entry.scheduled_for = NaiveDate::from_ymd_opt(2024, 1, 5);

        retype(&mut entry, EntryKind::Done, now());
        assert!(entry.completed_at.is_some());
        assert!(entry.scheduled_for.is_none());

        entry.scheduled_for = NaiveDate::from_ymd_opt(2024, 1, 5);
        retype(&mut entry, EntryKind::Scheduled, now());
        assert!(entry.completed_at.is_none());
        assert_eq!(entry.scheduled_for, NaiveDate::from_ymd_opt(2024, 1, 5));

        retype(&mut entry, EntryKind::Note, now());
        assert!(entry.scheduled_for.is_none());
    }

    #[test]
    fn find_clone_takes_first_actionable_case_insensitive_match() {
        let mut done = Entry::new(EntryKind::Done, "Buy milk");
        done.id = "done".into();
        let mut note = Entry::new(EntryKind::Note, "buy milk");
        note.id = "note".into();
        let mut event = Entry::new(EntryKind::Event, "BUY MILK");
        event.id = "event".into();
        let mut task = Entry::new(EntryKind::Task, "buy milk");
        task.id = "task".into();
        let entries = vec![done, note, event, task];

        let found = find_clone(&entries, "Buy Milk").unwrap();
        assert_eq!(found.id, "event");
        assert!(find_clone(&entries, "buy bread").is_none());
    }

    #[test]
    fn forward_clone_gets_fresh_identity() {
        let mut entry = Entry::new(EntryKind::Event, "dentist").with_tags(["health"]);
        entry.id = "abc".into();
        entry.created_at = Some(now());
        entry.highlight = Some("cyan".into());
        let clone = forward_clone(&entry);
        assert!(clone.id.is_empty());
        assert!(clone.created_at.is_none());
        assert_eq!(clone.kind, EntryKind::Event);
        assert_eq!(clone.tags, vec!["health".to_string()]);
        assert_eq!(clone.highlight.as_deref(), Some("cyan"));
    }
}
