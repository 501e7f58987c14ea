//! Day record persistence.
//!
//! Each calendar day lives in its own newline-delimited JSON file at
//! `<root>/YYYY/MM/DD.jsonl`. A day file is self-contained: nothing in one
//! file refers to another.
//!
//! # Invariants
//! - A missing day file is an empty day, never an error.
//! - A malformed line is skipped; the rest of the day still loads.
//! - Whole-day rewrites go through a temp file in the same directory and an
//!   atomic rename, so readers never see a half-written day.
//!
//! # Concurrency
//! The store assumes a single writer per data root. Two processes doing
//! read-modify-rewrite on the same day race and the last writer wins. The
//! rename prevents torn files, not lost updates. There is no locking.

use chrono::{Datelike, Local, NaiveDate};
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Entry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to move temp file into place: {0}")]
    Persist(std::io::Error),
    #[error("Invalid data root: {0}")]
    InvalidRoot(String),
}

impl From<tempfile::PersistError> for StoreError {
    fn from(err: tempfile::PersistError) -> Self {
        StoreError::Persist(err.error)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for day records.
pub trait DayStore {
    /// Entries for `date` in persisted order; empty when nothing was ever written.
    fn load_day(&self, date: NaiveDate) -> StoreResult<Vec<Entry>>;

    /// Replace the whole day, assigning ids and creation times where missing.
    fn save_day(&self, date: NaiveDate, entries: &[Entry]) -> StoreResult<()>;

    /// Add one entry at the end of the day and return its id.
    fn append(&self, date: NaiveDate, entry: Entry) -> StoreResult<String>;

    /// Replace the entry with the same id. Returns false when no entry matched.
    fn update(&self, date: NaiveDate, entry: &Entry) -> StoreResult<bool> {
        let mut entries = self.load_day(date)?;
        let Some(slot) = entries.iter_mut().find(|e| e.id == entry.id) else {
            return Ok(false);
        };
        *slot = entry.clone();
        self.save_day(date, &entries)?;
        Ok(true)
    }

    /// Remove the entry with `id`. Returns false when no entry matched.
    fn delete(&self, date: NaiveDate, id: &str) -> StoreResult<bool> {
        let mut entries = self.load_day(date)?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save_day(date, &entries)?;
        Ok(true)
    }
}

/// Filesystem-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(StoreError::InvalidRoot("data root cannot be empty".to_string()));
        }
        fs::create_dir_all(root)?;
        debug!("event=store_open module=store status=ok root={}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// `<root>/YYYY/MM/DD.jsonl`
    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.month_dir(date).join(format!("{:02}.jsonl", date.day()))
    }

    fn month_dir(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
    }
}

impl DayStore for FsStore {
    fn load_day(&self, date: NaiveDate) -> StoreResult<Vec<Entry>> {
        let path = self.day_path(date);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        read_records(BufReader::new(file), &path)
    }

    fn save_day(&self, date: NaiveDate, entries: &[Entry]) -> StoreResult<()> {
        let path = self.day_path(date);
        fs::create_dir_all(self.month_dir(date))?;
        write_atomic(&path, "day-", |writer| {
            for entry in entries {
                let mut entry = entry.clone();
                fill_missing(&mut entry);
                write_record(writer, &entry)?;
            }
            Ok(())
        })?;
        debug!(
            "event=day_saved module=store status=ok date={} entries={}",
            date,
            entries.len()
        );
        Ok(())
    }

    fn append(&self, date: NaiveDate, mut entry: Entry) -> StoreResult<String> {
        fs::create_dir_all(self.month_dir(date))?;
        fill_missing(&mut entry);
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(self.day_path(date))?;
        let unterminated = ends_without_newline(&mut file)?;
        let mut writer = BufWriter::new(file);
        if unterminated {
            writer.write_all(b"\n")?;
        }
        write_record(&mut writer, &entry)?;
        writer.flush()?;
        debug!(
            "event=entry_appended module=store status=ok date={} id={}",
            date, entry.id
        );
        Ok(entry.id)
    }
}

/// Opaque per-day identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn fill_missing(entry: &mut Entry) {
    if !entry.has_id() {
        entry.id = generate_id();
    }
    if entry.created_at.is_none() {
        entry.created_at = Some(Local::now());
    }
}

/// True when the file is non-empty and its last byte is not `\n`.
fn ends_without_newline(file: &mut File) -> StoreResult<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn write_record<W: Write>(writer: &mut W, entry: &Entry) -> StoreResult<()> {
    serde_json::to_writer(&mut *writer, entry)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn read_records<R: BufRead>(reader: R, path: &Path) -> StoreResult<Vec<Entry>> {
    let mut out = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Entry>(line) {
            Ok(entry) => out.push(entry),
            Err(err) => warn!(
                "event=record_skipped module=store status=malformed path={} line={} error={}",
                path.display(),
                index + 1,
                err
            ),
        }
    }
    Ok(out)
}

/// Write `path` by filling a temp file in the same directory and renaming it
/// into place. If `fill` fails the temp file is removed and `path` is untouched.
pub fn write_atomic<F>(path: &Path, prefix: &str, fill: F) -> StoreResult<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> StoreResult<()>,
{
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::InvalidRoot(format!("{} has no parent directory", path.display())))?;
    let temp = Builder::new().prefix(prefix).suffix(".tmp").tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        fill(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path)?;
    Ok(())
}
