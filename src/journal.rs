//! Command surface shared by the CLI and the TUI.
//!
//! Every by-index operation resolves its index against a fresh read of the
//! store. The CLI addresses entries by their position in one unfiltered
//! day; the TUI addresses them by their position in the filtered window it
//! is showing. An index that no longer points at anything is a no-op.

use chrono::{Local, NaiveDate};
use log::info;

use crate::lifecycle::{self, Transition};
use crate::models::{DatedEntry, Entry, EntryKind, Scope, normalize_tags};
use crate::session::Session;
use crate::store::{DayStore, StoreResult};
use crate::view::{self, Filters};

/// How a caller-supplied index is interpreted.
#[derive(Debug, Clone, Copy)]
pub enum IndexTarget<'a> {
    /// Position in the unfiltered listing of one day.
    Day(NaiveDate),
    /// Position in the session's windowed, filtered listing.
    Visible(&'a Session),
}

pub struct Journal<S: DayStore> {
    store: S,
}

impl<S: DayStore> Journal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_window(&self, scope: Scope, date: NaiveDate, filters: &Filters) -> StoreResult<Vec<DatedEntry>> {
        view::visible(&self.store, scope, date, filters)
    }

    pub fn day_listing(&self, date: NaiveDate) -> StoreResult<Vec<Entry>> {
        self.store.load_day(date)
    }

    /// Append a new entry to `date` and return its id.
    pub fn add<I, T>(&self, date: NaiveDate, kind: EntryKind, text: &str, tags: I) -> StoreResult<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let entry = Entry::new(kind, text.trim()).with_tags(tags);
        let id = self.store.append(date, entry)?;
        info!(
            "event=entry_added module=journal status=ok date={} kind={} id={}",
            date, kind, id
        );
        Ok(id)
    }

    /// The entry `index` points at, with its owning day.
    pub fn resolve(&self, target: IndexTarget<'_>, index: usize) -> StoreResult<Option<DatedEntry>> {
        match target {
            IndexTarget::Day(date) => Ok(self
                .store
                .load_day(date)?
                .into_iter()
                .nth(index)
                .map(|entry| DatedEntry { date, entry })),
            IndexTarget::Visible(session) => Ok(view::visible(
                &self.store,
                session.scope,
                session.anchor,
                &session.filters,
            )?
            .into_iter()
            .nth(index)),
        }
    }

    pub fn delete(&self, target: IndexTarget<'_>, index: usize) -> StoreResult<Transition> {
        let Some(DatedEntry { date, entry }) = self.resolve(target, index)? else {
            return Ok(Transition::Unchanged);
        };
        if !self.store.delete(date, &entry.id)? {
            return Ok(Transition::Unchanged);
        }
        info!(
            "event=entry_deleted module=journal status=ok date={} id={}",
            date, entry.id
        );
        Ok(Transition::Removed)
    }

    pub fn edit_text(&self, target: IndexTarget<'_>, index: usize, text: &str) -> StoreResult<Transition> {
        let text = text.trim().to_string();
        self.rewrite(target, index, |entry| {
            entry.text = text;
            true
        })
    }

    pub fn toggle_complete(&self, target: IndexTarget<'_>, index: usize) -> StoreResult<Transition> {
        let now = Local::now();
        self.rewrite(target, index, |entry| lifecycle::toggle_complete(entry, now))
    }

    pub fn toggle_migrate(&self, target: IndexTarget<'_>, index: usize) -> StoreResult<Transition> {
        let Some(DatedEntry { date, entry }) = self.resolve(target, index)? else {
            return Ok(Transition::Unchanged);
        };
        lifecycle::toggle_migrate(&self.store, date, entry)
    }

    pub fn toggle_schedule(
        &self,
        target: IndexTarget<'_>,
        index: usize,
        to: NaiveDate,
    ) -> StoreResult<Transition> {
        let Some(DatedEntry { date, entry }) = self.resolve(target, index)? else {
            return Ok(Transition::Unchanged);
        };
        lifecycle::toggle_schedule(&self.store, date, entry, to)
    }

    pub fn retype(&self, target: IndexTarget<'_>, index: usize, kind: EntryKind) -> StoreResult<Transition> {
        let now = Local::now();
        self.rewrite(target, index, |entry| {
            lifecycle::retype(entry, kind, now);
            true
        })
    }

    /// Replace the tag list; tags are stored lowercase without a leading `#`.
    pub fn replace_tags<I, T>(&self, target: IndexTarget<'_>, index: usize, tags: I) -> StoreResult<Transition>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let tags = normalize_tags(tags);
        self.rewrite(target, index, |entry| {
            entry.tags = tags;
            true
        })
    }

    fn rewrite<F>(&self, target: IndexTarget<'_>, index: usize, apply: F) -> StoreResult<Transition>
    where
        F: FnOnce(&mut Entry) -> bool,
    {
        let Some(DatedEntry { date, mut entry }) = self.resolve(target, index)? else {
            return Ok(Transition::Unchanged);
        };
        if !apply(&mut entry) {
            return Ok(Transition::Unchanged);
        }
        if !self.store.update(date, &entry)? {
            return Ok(Transition::Unchanged);
        }
        Ok(Transition::Updated)
    }
}
