use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{EntryKind, Scope};
use crate::store::{StoreError, write_atomic};

pub const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse preferences: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to write preferences: {0}")]
    Write(#[from] StoreError),
}

/// View state remembered between interactive sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(alias = "period")]
    pub scope: Scope,
    pub text_filter: String,
    #[serde(alias = "types")]
    pub kinds: Vec<EntryKind>,
    pub tags: Vec<String>,
    /// `YYYY-MM-DD`; kept as text so a bad value only loses the date.
    pub last_date: String,
    #[serde(alias = "center_width", skip_serializing_if = "is_zero")]
    pub display_width: u16,
}

fn is_zero(value: &u16) -> bool {
    *value == 0
}

impl Preferences {
    pub fn path_in(data_root: &Path) -> PathBuf {
        data_root.join(PREFS_FILE)
    }

    /// `Ok(None)` when no preferences were ever saved.
    pub fn load(path: &Path) -> Result<Option<Self>, PreferencesError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path, "prefs-", |writer| {
            writer.write_all(content.as_bytes())?;
            writer.write_all(b"\n")?;
            Ok(())
        })?;
        log::debug!("event=prefs_saved module=preferences status=ok path={}", path.display());
        Ok(())
    }
}
