use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the OS data directory when set. `~/` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_list_top")]
    pub list_top: String,
    #[serde(default = "default_list_bottom")]
    pub list_bottom: String,
    #[serde(default = "default_scope_day")]
    pub scope_day: String,
    #[serde(default = "default_scope_week")]
    pub scope_week: String,
    #[serde(default = "default_scope_month")]
    pub scope_month: String,
    #[serde(default = "default_prev_period")]
    pub prev_period: String,
    #[serde(default = "default_next_period")]
    pub next_period: String,
    #[serde(default = "default_jump_to_date")]
    pub jump_to_date: String,
    #[serde(default = "default_today")]
    pub today: String,
    #[serde(default = "default_text_filter")]
    pub text_filter: String,
    #[serde(default = "default_kind_filter")]
    pub kind_filter: String,
    #[serde(default = "default_tag_filter")]
    pub tag_filter: String,
    #[serde(default = "default_clear_filters")]
    pub clear_filters: String,
    #[serde(default = "default_add")]
    pub add: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_complete")]
    pub complete: String,
    #[serde(default = "default_migrate")]
    pub migrate: String,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_retype")]
    pub retype: String,
    #[serde(default = "default_tags")]
    pub tags: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
    /// Done, migrated and scheduled bullets.
    #[serde(default = "default_muted_fg")]
    pub muted_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut themes = HashMap::new();

        // Example custom theme so users can see the format
        themes.insert(
            "paper".to_string(),
            Theme {
                fg: "black".to_string(),
                bg: "#f4ecd8".to_string(),
                highlight_bg: "#8b5e3c".to_string(),
                highlight_fg: String::new(),
                tab_bg: "gray".to_string(),
                muted_fg: "gray".to_string(),
            },
        );

        Self {
            data_dir: None,
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            list_top: default_list_top(),
            list_bottom: default_list_bottom(),
            scope_day: default_scope_day(),
            scope_week: default_scope_week(),
            scope_month: default_scope_month(),
            prev_period: default_prev_period(),
            next_period: default_next_period(),
            jump_to_date: default_jump_to_date(),
            today: default_today(),
            text_filter: default_text_filter(),
            kind_filter: default_kind_filter(),
            tag_filter: default_tag_filter(),
            clear_filters: default_clear_filters(),
            add: default_add(),
            edit: default_edit(),
            delete: default_delete(),
            complete: default_complete(),
            migrate: default_migrate(),
            schedule: default_schedule(),
            retype: default_retype(),
            tags: default_tags(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            tab_bg: default_tab_bg(),
            muted_fg: default_muted_fg(),
        }
    }
}

impl Theme {
    fn preset(fg: &str, bg: &str, highlight_bg: &str, highlight_fg: &str, muted_fg: &str) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.to_string(),
            highlight_bg: highlight_bg.to_string(),
            highlight_fg: highlight_fg.to_string(),
            tab_bg: default_tab_bg(),
            muted_fg: muted_fg.to_string(),
        }
    }

    /// Themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();
        themes.insert("default".to_string(), Theme::default());
        themes.insert(
            "dark".to_string(),
            Theme::preset("white", "black", "cyan", "black", "darkgray"),
        );
        themes.insert(
            "light".to_string(),
            Theme::preset("black", "white", "blue", "white", "gray"),
        );
        themes.insert(
            "green".to_string(),
            Theme::preset("green", "black", "yellow", "black", "darkgray"),
        );
        themes.insert(
            "monochrome".to_string(),
            Theme::preset("white", "black", "white", "black", "gray"),
        );
        themes
    }
}

// Default value functions
fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_list_top() -> String {
    "g".to_string()
}

fn default_list_bottom() -> String {
    "G".to_string()
}

fn default_scope_day() -> String {
    "1".to_string()
}

fn default_scope_week() -> String {
    "2".to_string()
}

fn default_scope_month() -> String {
    "3".to_string()
}

fn default_prev_period() -> String {
    "[".to_string()
}

fn default_next_period() -> String {
    "]".to_string()
}

fn default_jump_to_date() -> String {
    "d".to_string()
}

fn default_today() -> String {
    "T".to_string()
}

fn default_text_filter() -> String {
    "/".to_string()
}

fn default_kind_filter() -> String {
    ":".to_string()
}

fn default_tag_filter() -> String {
    "F".to_string()
}

fn default_clear_filters() -> String {
    "Ctrl+l".to_string()
}

fn default_add() -> String {
    "a".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_delete() -> String {
    "x".to_string()
}

fn default_complete() -> String {
    "c".to_string()
}

fn default_migrate() -> String {
    "m".to_string()
}

fn default_schedule() -> String {
    "s".to_string()
}

fn default_retype() -> String {
    "t".to_string()
}

fn default_tags() -> String {
    "#".to_string()
}

fn default_help() -> String {
    "?".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_muted_fg() -> String {
    "darkgray".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),
}

impl Config {
    /// Load the profile's config file, creating a default one if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file there if missing
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents =
                fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to_path(config_path)?;
            log::info!(
                "event=config_created module=config status=ok path={}",
                config_path.display()
            );
            Ok(config)
        }
    }

    pub fn save_with_profile(&self, profile: utils::Profile) -> Result<(), ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Configured data directory with `~` expanded, if any
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(utils::expand_path)
    }

    /// Get the currently active theme.
    /// An empty highlight_fg is derived from highlight_bg.
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let calculated_fg = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }

    /// Set the active theme by name
    pub fn set_theme(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.themes.contains_key(name) && !Theme::get_preset_themes().contains_key(name) {
            return Err(ConfigError::ThemeNotFound(name.to_string()));
        }
        self.current_theme = name.to_string();
        Ok(())
    }
}
