use chrono::NaiveDate;

use crate::models::{DateWindow, EntryKind, Scope};
use crate::preferences::Preferences;
use crate::view::{self, Filters};

/// The view context an interactive caller works in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub scope: Scope,
    pub anchor: NaiveDate,
    pub filters: Filters,
    pub display_width: u16,
}

impl Session {
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            scope: Scope::Day,
            anchor,
            filters: Filters::default(),
            display_width: 0,
        }
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    pub fn next_period(&mut self) {
        self.anchor = view::shift_anchor(self.scope, self.anchor, 1);
    }

    pub fn prev_period(&mut self) {
        self.anchor = view::shift_anchor(self.scope, self.anchor, -1);
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.anchor = date;
    }

    pub fn set_text_filter(&mut self, text: &str) {
        self.filters.set_text(text);
    }

    pub fn set_kind_filter<I: IntoIterator<Item = EntryKind>>(&mut self, kinds: I) {
        self.filters.set_kinds(kinds);
    }

    pub fn set_tag_filter<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.filters.set_tags(tags);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn window(&self) -> DateWindow {
        view::date_window(self.scope, self.anchor)
    }

    pub fn label(&self) -> String {
        view::window_label(self.scope, self.anchor)
    }

    pub fn snapshot(&self) -> Preferences {
        Preferences {
            scope: self.scope,
            text_filter: self.filters.text.clone(),
            kinds: self.filters.kinds.iter().copied().collect(),
            tags: self.filters.tags.iter().cloned().collect(),
            last_date: self.anchor.format("%Y-%m-%d").to_string(),
            display_width: self.display_width,
        }
    }

    /// Apply saved preferences. A missing or unparsable date keeps the current
    /// anchor and a zero width keeps the current width.
    pub fn restore(&mut self, prefs: &Preferences) {
        self.scope = prefs.scope;
        self.filters.set_text(&prefs.text_filter);
        self.filters.set_kinds(prefs.kinds.iter().copied());
        self.filters.set_tags(&prefs.tags);
        if let Ok(date) = NaiveDate::parse_from_str(prefs.last_date.trim(), "%Y-%m-%d") {
            self.anchor = date;
        }
        if prefs.display_width > 0 {
            self.display_width = prefs.display_width;
        }
    }
}
