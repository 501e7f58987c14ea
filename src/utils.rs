use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyModifiers};
use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "BLT_DATA_DIR";

/// Profile mode for the application (dev or prod), chosen by the --dev flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "blt-dev",
            Profile::Prod => "blt",
        }
    }
}

fn project_dirs(profile: Profile) -> Option<ProjectDirs> {
    ProjectDirs::from("com", "blt", profile.app_name())
}

/// Configuration directory; "blt-dev" instead of "blt" under the Dev profile
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    project_dirs(profile).map(|dirs| dirs.config_dir().to_path_buf())
}

/// OS data directory; "blt-dev" instead of "blt" under the Dev profile
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    project_dirs(profile).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Pick the data root: flag, then environment, then config, then the OS data dir.
/// Blank values are skipped.
pub fn resolve_data_root(
    flag: Option<&Path>,
    env_value: Option<&str>,
    config_dir: Option<PathBuf>,
    profile: Profile,
) -> Option<PathBuf> {
    if let Some(path) = flag.filter(|p| !p.as_os_str().is_empty()) {
        return Some(expand_path(&path.to_string_lossy()));
    }
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return Some(expand_path(value));
    }
    config_dir.or_else(|| get_data_dir(profile))
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Split `a, b,,c` into trimmed non-empty parts
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parsed key binding information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyBinding {
    pub key_code: KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl, or Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(KeyModifiers::CONTROL) || modifiers.contains(KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(KeyModifiers::CONTROL)
    }
}

/// Format a key binding for display. On macOS "Ctrl+" is shown as "Opt+".
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config.
/// Supports single keys ("q", "#", "G"), special keys ("Enter", "Left") and "Ctrl+x".
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        return Ok(ParsedKeyBinding {
            key_code: parse_key_code(key_part)?,
            requires_ctrl: true,
        });
    }

    Ok(ParsedKeyBinding {
        key_code: parse_key_code(key_str)?,
        requires_ctrl: false,
    })
}

fn parse_key_code(key_str: &str) -> Result<KeyCode, String> {
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}
