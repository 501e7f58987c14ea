//! Windowing and filtering over day records.
//!
//! Nothing here caches: every call re-reads the store so an index taken from
//! `visible` always refers to the sequence as it is right now.

use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::BTreeSet;

use crate::models::{
    DateWindow, DatedEntry, Entry, EntryKind, Scope, format_tags, month_start, normalize_tag,
    normalize_tags,
};
use crate::store::{DayStore, StoreResult};

/// Inclusive window for `scope` around `anchor`. Weeks start on Monday.
pub fn date_window(scope: Scope, anchor: NaiveDate) -> DateWindow {
    match scope {
        Scope::Day => DateWindow::single(anchor),
        Scope::Week => {
            let offset = u64::from(anchor.weekday().num_days_from_monday());
            let start = anchor.checked_sub_days(Days::new(offset)).unwrap_or(anchor);
            let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
            DateWindow { start, end }
        }
        Scope::Month => {
            let start = month_start(anchor);
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(anchor);
            DateWindow { start, end }
        }
    }
}

/// Move `anchor` by `delta` periods of `scope`. Month steps clamp the day to the target month.
pub fn shift_anchor(scope: Scope, anchor: NaiveDate, delta: i32) -> NaiveDate {
    let magnitude = delta.unsigned_abs();
    let shifted = match scope {
        Scope::Day | Scope::Week => {
            let step = if scope == Scope::Week { 7 } else { 1 };
            let days = Days::new(u64::from(magnitude) * step);
            if delta >= 0 {
                anchor.checked_add_days(days)
            } else {
                anchor.checked_sub_days(days)
            }
        }
        Scope::Month => {
            let months = Months::new(magnitude);
            if delta >= 0 {
                anchor.checked_add_months(months)
            } else {
                anchor.checked_sub_months(months)
            }
        }
    };
    shifted.unwrap_or(anchor)
}

/// Every entry in `window`, day by day, each day in stored order.
pub fn collect<S: DayStore>(store: &S, window: DateWindow) -> StoreResult<Vec<DatedEntry>> {
    let mut out = Vec::new();
    for date in window.days() {
        out.extend(
            store
                .load_day(date)?
                .into_iter()
                .map(|entry| DatedEntry { date, entry }),
        );
    }
    Ok(out)
}

/// Text, kind and tag predicates. Empty parts match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub text: String,
    pub kinds: BTreeSet<EntryKind>,
    pub tags: BTreeSet<String>,
}

impl Filters {
    pub fn set_text(&mut self, text: &str) {
        self.text = text.trim().to_string();
    }

    pub fn set_kinds<I: IntoIterator<Item = EntryKind>>(&mut self, kinds: I) {
        self.kinds = kinds.into_iter().collect();
    }

    pub fn set_tags<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.tags = normalize_tags(tags).into_iter().collect();
    }

    pub fn clear(&mut self) {
        *self = Filters::default();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.kinds.is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_text(entry) && self.matches_kind(entry) && self.matches_tags(entry)
    }

    fn matches_text(&self, entry: &Entry) -> bool {
        self.text.is_empty() || entry.text.to_lowercase().contains(&self.text.to_lowercase())
    }

    fn matches_kind(&self, entry: &Entry) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&entry.kind)
    }

    fn matches_tags(&self, entry: &Entry) -> bool {
        self.tags.is_empty()
            || entry
                .tags
                .iter()
                .any(|tag| self.tags.contains(&normalize_tag(tag)))
    }

    /// `/text  :task,event  #work #home`, empty when no filter is set.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.text.is_empty() {
            parts.push(format!("/{}", self.text));
        }
        if !self.kinds.is_empty() {
            let names: Vec<_> = self.kinds.iter().map(|k| k.name()).collect();
            parts.push(format!(":{}", names.join(",")));
        }
        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().cloned().collect();
            parts.push(format_tags(&tags));
        }
        parts.join("  ")
    }
}

pub fn filter(collected: Vec<DatedEntry>, filters: &Filters) -> Vec<DatedEntry> {
    if filters.is_empty() {
        return collected;
    }
    collected
        .into_iter()
        .filter(|dated| filters.matches(&dated.entry))
        .collect()
}

/// The sequence a caller indexes into: windowed, then filtered.
pub fn visible<S: DayStore>(
    store: &S,
    scope: Scope,
    anchor: NaiveDate,
    filters: &Filters,
) -> StoreResult<Vec<DatedEntry>> {
    let collected = collect(store, date_window(scope, anchor))?;
    Ok(filter(collected, filters))
}

/// Share of Done among Task and Done entries, rounded down.
pub fn completion_percent<'a, I>(entries: I) -> Option<u8>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let (done, total) = entries.into_iter().fold((0usize, 0usize), |(done, total), e| match e.kind {
        EntryKind::Done => (done + 1, total + 1),
        EntryKind::Task => (done, total + 1),
        _ => (done, total),
    });
    if total == 0 {
        return None;
    }
    u8::try_from(done * 100 / total).ok()
}

pub fn window_label(scope: Scope, anchor: NaiveDate) -> String {
    let window = date_window(scope, anchor);
    match scope {
        Scope::Day => window.start.format("%Y-%m-%d").to_string(),
        _ => format!(
            "{} → {}",
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn windows_for_a_thursday() {
        let anchor = day(2024, 3, 14);
        assert_eq!(date_window(Scope::Day, anchor), DateWindow::single(anchor));
        assert_eq!(
            date_window(Scope::Week, anchor),
            DateWindow {
                start: day(2024, 3, 11),
                end: day(2024, 3, 17)
            }
        );
        assert_eq!(
            date_window(Scope::Month, anchor),
            DateWindow {
                start: day(2024, 3, 1),
                end: day(2024, 3, 31)
            }
        );
    }

    #[test]
    fn week_window_on_sunday_and_monday() {
        let sunday = date_window(Scope::Week, day(2024, 3, 17));
        assert_eq!(sunday.start, day(2024, 3, 11));
        let monday = date_window(Scope::Week, day(2024, 3, 18));
        assert_eq!(monday.start, day(2024, 3, 18));
        assert_eq!(monday.end, day(2024, 3, 24));
    }

    #[test]
    fn february_window_in_leap_year() {
        let window = date_window(Scope::Month, day(2024, 2, 10));
        assert_eq!(window.end, day(2024, 2, 29));
        assert_eq!(window.len_days(), 29);
    }

    #[test]
    fn shift_anchor_clamps_months() {
        assert_eq!(shift_anchor(Scope::Month, day(2024, 1, 31), 1), day(2024, 2, 29));
        assert_eq!(shift_anchor(Scope::Month, day(2024, 3, 31), -1), day(2024, 2, 29));
        assert_eq!(shift_anchor(Scope::Week, day(2024, 3, 14), -1), day(2024, 3, 7));
        assert_eq!(shift_anchor(Scope::Day, day(2024, 12, 31), 1), day(2025, 1, 1));
    }

    #[test]
    fn tag_filter_ignores_case_and_marker() {
        let mut filters = Filters::default();
        filters.set_tags(["#Work"]);
        let mut entry = Entry::new(EntryKind::Task, "report");
        entry.tags = vec!["WORK".to_string()];
        assert!(filters.matches(&entry));
        entry.tags = vec!["home".to_string()];
        assert!(!filters.matches(&entry));
    }

    #[test]
    fn predicates_are_anded() {
        let mut filters = Filters::default();
        filters.set_text("  Milk ");
        filters.set_kinds([EntryKind::Task, EntryKind::Event]);
        assert_eq!(filters.text, "Milk");

        assert!(filters.matches(&Entry::new(EntryKind::Task, "buy milk")));
        assert!(!filters.matches(&Entry::new(EntryKind::Note, "buy milk")));
        assert!(!filters.matches(&Entry::new(EntryKind::Task, "buy bread")));
    }

    #[test]
    fn summary_lists_active_filters() {
        let mut filters = Filters::default();
        assert_eq!(filters.summary(), "");
        filters.set_text("milk");
        filters.set_kinds([EntryKind::Event, EntryKind::Task]);
        filters.set_tags(["home"]);
        assert_eq!(filters.summary(), "/milk  :task,event  #home");
    }

    #[test]
    fn completion_counts_tasks_and_done_only() {
        let entries = vec![
            Entry::new(EntryKind::Done, "a"),
            Entry::new(EntryKind::Task, "b"),
            Entry::new(EntryKind::Task, "c"),
            Entry::new(EntryKind::Note, "d"),
        ];
        assert_eq!(completion_percent(&entries), Some(33));
        assert_eq!(completion_percent(&[Entry::new(EntryKind::Note, "x")]), None);
    }

    #[test]
    fn labels() {
        assert_eq!(window_label(Scope::Day, day(2024, 3, 14)), "2024-03-14");
        assert_eq!(
            window_label(Scope::Week, day(2024, 3, 14)),
            "2024-03-11 → 2024-03-17"
        );
    }
}
