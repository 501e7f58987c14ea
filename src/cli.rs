use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use crate::journal::{IndexTarget, Journal};
use crate::lifecycle::Transition;
use crate::models::{DatedEntry, EntryKind, ParseKindError, Scope};
use crate::store::{DayStore, StoreError};
use crate::utils::{parse_csv, parse_date, today};
use crate::view::{self, Filters};

#[derive(Parser)]
#[command(name = "blt")]
#[command(about = "Bullet journal for the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (separate dev config and data)
    #[arg(long)]
    pub dev: bool,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// List entries in a day, week or month
    List {
        /// day|week|month
        #[arg(long, default_value = "day", value_parser = parse_scope_arg)]
        timespan: Scope,
        /// Anchor date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Comma-separated kinds
        #[arg(long = "type")]
        kinds: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Case-insensitive text filter
        #[arg(long)]
        text: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add an entry
    Add {
        /// Entry text
        #[arg(long, conflicts_with = "note")]
        text: Option<String>,
        /// Shortcut for --type note with the given text
        #[arg(long)]
        note: Option<String>,
        /// task|event|note|important|inspiration
        #[arg(long = "type", default_value = "task", value_parser = parse_pickable_kind_arg)]
        kind: EntryKind,
        /// Day to add to (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete the entry at a day index
    Delete {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },
    /// Toggle an entry between task and done
    Complete {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },
    /// Migrate an entry to the next day, or undo a migration
    Migrate {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },
    /// Schedule an entry onto another day, or undo a scheduling
    Schedule {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Target day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        to: NaiveDate,
    },
    /// Replace an entry's text
    Edit {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// New text
        #[arg(long)]
        set: String,
    },
    /// Change an entry's kind
    Retype {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        #[arg(long = "type", value_parser = parse_kind_arg)]
        kind: EntryKind,
    },
    /// Replace an entry's tags
    Tag {
        index: usize,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Comma-separated tags; empty clears them
        #[arg(long, default_value = "")]
        tags: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    KindError(#[from] ParseKindError),
    #[error("Missing text: pass --text or --note")]
    MissingText,
    #[error("Failed to write output: {0}")]
    OutputError(#[from] std::io::Error),
    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", value, e))
}

fn parse_scope_arg(value: &str) -> Result<Scope, String> {
    value.parse()
}

fn parse_kind_arg(value: &str) -> Result<EntryKind, String> {
    value.parse::<EntryKind>().map_err(|e| e.to_string())
}

fn parse_pickable_kind_arg(value: &str) -> Result<EntryKind, String> {
    let kind = parse_kind_arg(value)?;
    if !EntryKind::PICKABLE.contains(&kind) {
        return Err(format!("'{}' cannot be added directly; use task|event|note|important|inspiration", value));
    }
    Ok(kind)
}

fn parse_kinds(value: &str) -> Result<Vec<EntryKind>, CliError> {
    parse_csv(value)
        .iter()
        .map(|part| part.parse::<EntryKind>().map_err(CliError::from))
        .collect()
}

/// One row of `list --json`
#[derive(Debug, Serialize)]
struct ListedEntry<'a> {
    date: String,
    index: usize,
    id: &'a str,
    #[serde(rename = "type")]
    kind: EntryKind,
    text: &'a str,
    tags: &'a [String],
}

/// Handle the list command. Indexes are positions in the unfiltered day.
pub fn handle_list<S: DayStore>(
    journal: &Journal<S>,
    timespan: Scope,
    date: Option<NaiveDate>,
    kinds: Option<String>,
    tags: Option<String>,
    text: Option<String>,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut filters = Filters::default();
    if let Some(text) = text {
        filters.set_text(&text);
    }
    if let Some(kinds) = kinds {
        filters.set_kinds(parse_kinds(&kinds)?);
    }
    if let Some(tags) = tags {
        filters.set_tags(parse_csv(&tags));
    }

    let anchor = date.unwrap_or_else(today);
    // Walk each day in stored order so every row keeps its own position,
    // including legacy records that share an empty id.
    let mut rows: Vec<(usize, DatedEntry)> = Vec::new();
    for date in view::date_window(timespan, anchor).days() {
        for (index, entry) in journal.day_listing(date)?.into_iter().enumerate() {
            if filters.matches(&entry) {
                rows.push((index, DatedEntry { date, entry }));
            }
        }
    }

    if json {
        let listed: Vec<ListedEntry<'_>> = rows
            .iter()
            .map(|(index, dated)| ListedEntry {
                date: dated.date.format("%Y-%m-%d").to_string(),
                index: *index,
                id: &dated.entry.id,
                kind: dated.entry.kind,
                text: &dated.entry.text,
                tags: &dated.entry.tags,
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &listed)?;
        writeln!(out)?;
        return Ok(());
    }

    for (index, dated) in rows {
        if timespan == Scope::Day {
            writeln!(out, "{}. {}", index, dated.entry.display_line())?;
        } else {
            writeln!(
                out,
                "{} {}. {}",
                dated.date.format("%Y-%m-%d"),
                index,
                dated.entry.display_line()
            )?;
        }
    }
    Ok(())
}

/// Handle the add command, printing the new id
pub fn handle_add<S: DayStore>(
    journal: &Journal<S>,
    text: Option<String>,
    note: Option<String>,
    kind: EntryKind,
    date: Option<NaiveDate>,
    tags: Option<String>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let (kind, text) = match note {
        Some(note) => (EntryKind::Note, note),
        None => (kind, text.unwrap_or_default()),
    };
    if text.trim().is_empty() {
        return Err(CliError::MissingText);
    }
    let tags = tags.as_deref().map(parse_csv).unwrap_or_default();
    let date = date.unwrap_or_else(today);
    let id = journal.add(date, kind, &text, tags)?;
    writeln!(out, "{}", id)?;
    Ok(())
}

pub fn handle_delete<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let result = journal.delete(IndexTarget::Day(date), index)?;
    report(out, result, index, date)
}

pub fn handle_complete<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let result = journal.toggle_complete(IndexTarget::Day(date), index)?;
    report(out, result, index, date)
}

pub fn handle_migrate<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let result = journal.toggle_migrate(IndexTarget::Day(date), index)?;
    report(out, result, index, date)
}

pub fn handle_schedule<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    to: NaiveDate,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let result = journal.toggle_schedule(IndexTarget::Day(date), index, to)?;
    report(out, result, index, date)
}

pub fn handle_edit<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    set: String,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if set.trim().is_empty() {
        return Err(CliError::MissingText);
    }
    let result = journal.edit_text(IndexTarget::Day(date), index, &set)?;
    report(out, result, index, date)
}

pub fn handle_retype<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    kind: EntryKind,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let result = journal.retype(IndexTarget::Day(date), index, kind)?;
    report(out, result, index, date)
}

pub fn handle_tag<S: DayStore>(
    journal: &Journal<S>,
    index: usize,
    date: NaiveDate,
    tags: String,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let result = journal.replace_tags(IndexTarget::Day(date), index, parse_csv(&tags))?;
    report(out, result, index, date)
}

fn report(out: &mut impl Write, result: Transition, index: usize, date: NaiveDate) -> Result<(), CliError> {
    writeln!(out, "{}", describe(result, index, date))?;
    Ok(())
}

/// Human-readable outcome of a by-index command
pub fn describe(result: Transition, index: usize, date: NaiveDate) -> String {
    match result {
        Transition::Unchanged => format!("Nothing changed at {} index {}", date, index),
        Transition::Updated => format!("Updated {} index {}", date, index),
        Transition::Removed => format!("Deleted {} index {}", date, index),
        Transition::Forwarded { target } => format!("Moved {} index {} to {}", date, index, target),
        Transition::Restored { target, clone_removed: true } => {
            format!("Restored {} index {} and removed its copy on {}", date, index, target)
        }
        Transition::Restored { target, clone_removed: false } => {
            format!("Restored {} index {}; no copy found on {}", date, index, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn mutations_require_a_date() {
        assert!(Cli::try_parse_from(["blt", "complete", "0"]).is_err());
        assert!(Cli::try_parse_from(["blt", "complete", "0", "--date", "2024-13-01"]).is_err());
        assert!(Cli::try_parse_from(["blt", "complete", "0", "--date", "2024-01-01"]).is_ok());
    }

    #[test]
    fn add_rejects_forwarded_kinds() {
        assert!(Cli::try_parse_from(["blt", "add", "--text", "x", "--type", "migrated"]).is_err());
        let cli = Cli::try_parse_from(["blt", "add", "--text", "x", "--type", "important"]).unwrap();
        match cli.command {
            Some(Commands::Add { kind, .. }) => assert_eq!(kind, EntryKind::Important),
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn data_dir_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["blt", "list", "--data-dir", "/tmp/j", "--timespan", "week"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/j")));
    }

    #[test]
    fn list_indexes_follow_position_even_without_ids() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = crate::store::FsStore::new(dir.path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let path = store.day_path(date);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            concat!(
                "{\"type\":\"note\",\"text\":\"legacy one\"}\n",
                "{\"type\":\"task\",\"text\":\"legacy two\"}\n",
                "{\"type\":\"task\",\"text\":\"legacy three\"}\n",
            ),
        )
        .unwrap();
        let journal = Journal::new(store);

        let mut out = Vec::new();
        handle_list(&journal, Scope::Day, Some(date), None, None, None, false, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0. – legacy one\n1. • legacy two\n2. • legacy three\n"
        );

        let mut out = Vec::new();
        handle_list(
            &journal,
            Scope::Day,
            Some(date),
            Some("task".to_string()),
            None,
            None,
            true,
            &mut out,
        )
        .unwrap();
        let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let indexes: Vec<_> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["index"].as_u64().unwrap())
            .collect();
        assert_eq!(indexes, vec![1, 2]);
    }

    #[test]
    fn unknown_kind_in_filter_is_rejected() {
        assert!(parse_kinds("task, event").is_ok());
        assert!(matches!(parse_kinds("task,chore"), Err(CliError::KindError(_))));
    }
}
