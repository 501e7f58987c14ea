use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of a bullet. Closed set; serialized as snake_case strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Task,
    Done,
    Migrated,
    Scheduled,
    Event,
    Note,
    #[serde(rename = "highlight_important")]
    Important,
    #[serde(rename = "highlight_inspiration")]
    Inspiration,
}

impl EntryKind {
    pub const ALL: [EntryKind; 8] = [
        EntryKind::Task,
        EntryKind::Done,
        EntryKind::Migrated,
        EntryKind::Scheduled,
        EntryKind::Event,
        EntryKind::Note,
        EntryKind::Important,
        EntryKind::Inspiration,
    ];

    /// Kinds a user may assign directly; the rest are reached through transitions.
    pub const PICKABLE: [EntryKind; 5] = [
        EntryKind::Task,
        EntryKind::Event,
        EntryKind::Note,
        EntryKind::Important,
        EntryKind::Inspiration,
    ];

    /// Task and Event are the only kinds that can be migrated or scheduled.
    pub fn is_actionable(self) -> bool {
        matches!(self, EntryKind::Task | EntryKind::Event)
    }

    pub fn is_forwarded(self) -> bool {
        matches!(self, EntryKind::Migrated | EntryKind::Scheduled)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            EntryKind::Task => "•",
            EntryKind::Done => "✓",
            EntryKind::Migrated => "»",
            EntryKind::Scheduled => "⧗",
            EntryKind::Event => "◇",
            EntryKind::Note => "–",
            EntryKind::Important => "!",
            EntryKind::Inspiration => "★",
        }
    }

    /// Short name used on the command line and in filter summaries.
    pub fn name(self) -> &'static str {
        match self {
            EntryKind::Task => "task",
            EntryKind::Done => "done",
            EntryKind::Migrated => "migrated",
            EntryKind::Scheduled => "scheduled",
            EntryKind::Event => "event",
            EntryKind::Note => "note",
            EntryKind::Important => "important",
            EntryKind::Inspiration => "inspiration",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Task => "Task",
            EntryKind::Done => "Done",
            EntryKind::Migrated => "Migrated",
            EntryKind::Scheduled => "Scheduled",
            EntryKind::Event => "Event",
            EntryKind::Note => "Note",
            EntryKind::Important => "Important",
            EntryKind::Inspiration => "Inspiration",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entry kind `{0}`; expected task|event|note|important|inspiration|done|migrated|scheduled")]
pub struct ParseKindError(pub String);

impl FromStr for EntryKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" => Ok(EntryKind::Task),
            "done" | "completed" => Ok(EntryKind::Done),
            "migrated" => Ok(EntryKind::Migrated),
            "scheduled" => Ok(EntryKind::Scheduled),
            "event" => Ok(EntryKind::Event),
            "note" => Ok(EntryKind::Note),
            "important" | "highlight_important" => Ok(EntryKind::Important),
            "inspiration" | "highlight_inspiration" => Ok(EntryKind::Inspiration),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

/// A single bullet as persisted in a day record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, with = "created_at_format")]
    pub created_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "date_format")]
    pub scheduled_for: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
    /// Display color name kept from older records; carried through rewrites untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

impl Entry {
    /// New unsaved entry; the store assigns `id` and `created_at` on first write.
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            text: text.into(),
            tags: Vec::new(),
            created_at: None,
            scheduled_for: None,
            completed_at: None,
            highlight: None,
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// `• text  [#a #b]`
    pub fn display_line(&self) -> String {
        let tags = format_tags(&self.tags);
        if tags.is_empty() {
            format!("{} {}", self.kind.symbol(), self.text)
        } else {
            format!("{} {}  [{}]", self.kind.symbol(), self.text, tags)
        }
    }
}

/// An entry together with the day that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedEntry {
    pub date: NaiveDate,
    pub entry: Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Day,
    Week,
    Month,
}

impl Scope {
    pub fn label(self) -> &'static str {
        match self {
            Scope::Day => "Day",
            Scope::Week => "Week",
            Scope::Month => "Month",
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Scope::Day),
            "week" => Ok(Scope::Week),
            "month" => Ok(Scope::Month),
            other => Err(format!("unknown timespan `{}`; expected day|week|month", other)),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }
}

/// Trim, strip leading `#` markers and lowercase. Empty results are dropped by callers.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_lowercase()
}

/// Normalize a tag list, dropping empties and duplicates while keeping first-seen order.
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = normalize_tag(tag.as_ref());
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Render tags as `#a #b`
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

// `scheduled_for` is written as YYYY-MM-DD; older files carry a full RFC 3339 timestamp.
mod date_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let Some(raw) = raw else { return Ok(None) };
        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(Some(date));
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| Some(ts.date_naive()))
            .map_err(serde::de::Error::custom)
    }
}

// The zero instant written by earlier tooling means "never set".
mod created_at_format {
    use chrono::{DateTime, Datelike, Local};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Local>>, s: S) -> Result<S::Ok, S::Error> {
        value.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Local>>, D::Error> {
        let value: Option<DateTime<Local>> = Option::deserialize(d)?;
        Ok(value.filter(|ts| ts.year() > 1))
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
