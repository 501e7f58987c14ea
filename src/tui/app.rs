use crate::journal::{IndexTarget, Journal};
use crate::lifecycle::Transition;
use crate::models::{DatedEntry, EntryKind, Scope, format_tags};
use crate::preferences::Preferences;
use crate::store::{FsStore, StoreResult};
use crate::tui::error::TuiError;
use crate::tui::widgets::line_input::LineInput;
use crate::{Config, Session, utils, view};
use chrono::NaiveDate;
use log::{error, warn};
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    Prompt,
    KindPicker,
    ConfirmDelete,
}

/// What a submitted prompt line is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Add,
    Edit,
    Schedule,
    JumpToDate,
    TextFilter,
    KindFilter,
    TagFilter,
    Tags,
}

impl PromptAction {
    pub fn label(self) -> &'static str {
        match self {
            PromptAction::Add => "New task",
            PromptAction::Edit => "Edit",
            PromptAction::Schedule => "Schedule for (YYYY-MM-DD)",
            PromptAction::JumpToDate => "Go to date (YYYY-MM-DD)",
            PromptAction::TextFilter => "Filter text",
            PromptAction::KindFilter => "Filter types (comma separated)",
            PromptAction::TagFilter => "Filter tags (comma separated)",
            PromptAction::Tags => "Tags (comma separated)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptState {
    pub action: PromptAction,
    pub input: LineInput,
    /// Validation failure shown next to the label; the prompt stays open
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub picker_index: usize,
    pub delete_modal_selection: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
            picker_index: 0,
            delete_modal_selection: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub journal: Journal<FsStore>,
    pub prefs_path: PathBuf,
    pub session: Session,
    /// The visible listing; list indices point into this
    pub entries: Vec<DatedEntry>,
    pub ui: UiState,
    pub status: StatusState,
    pub prompt: Option<PromptState>,
}

impl App {
    pub fn new(config: Config, journal: Journal<FsStore>, data_root: impl AsRef<Path>) -> Result<Self, TuiError> {
        let prefs_path = Preferences::path_in(data_root.as_ref());
        let mut session = Session::new(utils::today());

        match Preferences::load(&prefs_path) {
            Ok(Some(prefs)) => session.restore(&prefs),
            Ok(None) => {}
            Err(e) => warn!(
                "event=prefs_load module=tui status=error path={} error={}",
                prefs_path.display(),
                e
            ),
        }

        let mut app = Self {
            config,
            journal,
            prefs_path,
            session,
            entries: Vec::new(),
            ui: UiState::default(),
            status: StatusState::default(),
            prompt: None,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Reload the visible listing, keeping the selection on the same entry when it survives.
    pub fn refresh(&mut self) -> Result<(), TuiError> {
        let key = self.selected_key();
        self.refresh_selecting(key)
    }

    fn refresh_selecting(&mut self, key: Option<(NaiveDate, String)>) -> Result<(), TuiError> {
        self.entries = self.journal.list_window(
            self.session.scope,
            self.session.anchor,
            &self.session.filters,
        )?;
        let index = key
            .and_then(|(date, id)| {
                self.entries
                    .iter()
                    .position(|e| e.date == date && e.entry.id == id)
            })
            .unwrap_or(self.ui.selected_index);
        self.select(index);
        Ok(())
    }

    fn select(&mut self, index: usize) {
        if self.entries.is_empty() {
            self.ui.selected_index = 0;
            self.ui.list_state.select(None);
        } else {
            self.ui.selected_index = index.min(self.entries.len() - 1);
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    fn selected_key(&self) -> Option<(NaiveDate, String)> {
        self.selected_entry().map(|e| (e.date, e.entry.id.clone()))
    }

    pub fn selected_entry(&self) -> Option<&DatedEntry> {
        self.entries.get(self.ui.selected_index)
    }

    pub fn move_selection_up(&mut self) {
        self.select(self.ui.selected_index.saturating_sub(1));
    }

    pub fn move_selection_down(&mut self) {
        self.select(self.ui.selected_index + 1);
    }

    pub fn move_selection_by(&mut self, delta: isize) {
        let index = self.ui.selected_index.saturating_add_signed(delta);
        self.select(index);
    }

    pub fn move_to_top(&mut self) {
        self.select(0);
    }

    pub fn move_to_bottom(&mut self) {
        self.select(self.entries.len().saturating_sub(1));
    }

    pub fn completion_percent(&self) -> Option<u8> {
        view::completion_percent(self.entries.iter().map(|e| &e.entry))
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    fn save_prefs(&mut self) {
        if let Err(e) = self.session.snapshot().save(&self.prefs_path) {
            warn!(
                "event=prefs_save module=tui status=error path={} error={}",
                self.prefs_path.display(),
                e
            );
            self.set_status_message(format!("Could not save preferences: {}", e));
        }
    }

    /// Persist the view state, then reload the listing for it.
    fn view_changed(&mut self) -> Result<(), TuiError> {
        self.save_prefs();
        self.refresh()
    }

    pub fn set_scope(&mut self, scope: Scope) -> Result<(), TuiError> {
        self.session.set_scope(scope);
        self.view_changed()
    }

    pub fn next_period(&mut self) -> Result<(), TuiError> {
        self.session.next_period();
        self.view_changed()
    }

    pub fn prev_period(&mut self) -> Result<(), TuiError> {
        self.session.prev_period();
        self.view_changed()
    }

    pub fn go_to_today(&mut self) -> Result<(), TuiError> {
        self.session.jump_to(utils::today());
        self.view_changed()
    }

    pub fn clear_filters(&mut self) -> Result<(), TuiError> {
        self.session.clear_filters();
        self.set_status_message("Filters cleared".to_string());
        self.view_changed()
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    /// Open a prompt. Actions on an entry do nothing without a selection.
    pub fn open_prompt(&mut self, action: PromptAction) {
        let selected = self.selected_entry().map(|e| &e.entry);
        let initial = match action {
            PromptAction::Add | PromptAction::Schedule => Some(String::new()),
            PromptAction::Edit => selected.map(|e| e.text.clone()),
            PromptAction::Tags => selected.map(|e| e.tags.join(", ")),
            PromptAction::JumpToDate => Some(self.session.anchor.format("%Y-%m-%d").to_string()),
            PromptAction::TextFilter => Some(self.session.filters.text.clone()),
            PromptAction::KindFilter => Some(
                self.session
                    .filters
                    .kinds
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            PromptAction::TagFilter => Some(
                self.session
                    .filters
                    .tags
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };
        let Some(initial) = initial else {
            return;
        };
        if action == PromptAction::Schedule && selected.is_none() {
            return;
        }
        self.prompt = Some(PromptState {
            action,
            input: LineInput::with_text(initial),
            error: None,
        });
        self.ui.mode = Mode::Prompt;
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.ui.mode = Mode::View;
    }

    /// Submit the open prompt. Invalid input keeps the prompt open with an error.
    pub fn submit_prompt(&mut self) -> Result<(), TuiError> {
        let Some(prompt) = self.prompt.as_ref() else {
            self.ui.mode = Mode::View;
            return Ok(());
        };
        let action = prompt.action;
        let value = prompt.input.value().trim().to_string();

        match self.apply_prompt(action, &value)? {
            Ok(()) => self.cancel_prompt(),
            Err(message) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.error = Some(message);
                }
            }
        }
        Ok(())
    }

    /// The outer result is a store failure; the inner one a rejected input.
    fn apply_prompt(&mut self, action: PromptAction, value: &str) -> Result<Result<(), String>, TuiError> {
        match action {
            PromptAction::Add => {
                if value.is_empty() {
                    return Ok(Err("text is required".to_string()));
                }
                let date = self.session.anchor;
                let added = self.journal.add(date, EntryKind::Task, value, Vec::<String>::new());
                match added {
                    Ok(id) => {
                        self.set_status_message("Added".to_string());
                        self.refresh_selecting(Some((date, id)))?;
                    }
                    Err(e) => self.report_error("add", &e),
                }
            }
            PromptAction::Edit => {
                if value.is_empty() {
                    return Ok(Err("text is required".to_string()));
                }
                let index = self.ui.selected_index;
                let result = self.journal.edit_text(IndexTarget::Visible(&self.session), index, value);
                self.apply_transition("Edited", result)?;
            }
            PromptAction::Schedule => {
                let Ok(date) = utils::parse_date(value) else {
                    return Ok(Err("expected YYYY-MM-DD".to_string()));
                };
                let index = self.ui.selected_index;
                let result = self
                    .journal
                    .toggle_schedule(IndexTarget::Visible(&self.session), index, date);
                self.apply_transition("Scheduled", result)?;
            }
            PromptAction::JumpToDate => {
                let Ok(date) = utils::parse_date(value) else {
                    return Ok(Err("expected YYYY-MM-DD".to_string()));
                };
                self.session.jump_to(date);
                self.view_changed()?;
            }
            PromptAction::TextFilter => {
                self.session.set_text_filter(value);
                self.view_changed()?;
            }
            PromptAction::KindFilter => {
                let mut kinds = Vec::new();
                for name in utils::parse_csv(value) {
                    match name.parse::<EntryKind>() {
                        Ok(kind) => kinds.push(kind),
                        Err(e) => return Ok(Err(e.to_string())),
                    }
                }
                self.session.set_kind_filter(kinds);
                self.view_changed()?;
            }
            PromptAction::TagFilter => {
                self.session.set_tag_filter(utils::parse_csv(value));
                self.view_changed()?;
            }
            PromptAction::Tags => {
                let tags = utils::parse_csv(value);
                let index = self.ui.selected_index;
                let result = self
                    .journal
                    .replace_tags(IndexTarget::Visible(&self.session), index, &tags);
                self.apply_transition("Tags updated", result)?;
            }
        }
        Ok(Ok(()))
    }

    pub fn toggle_complete_selected(&mut self) -> Result<(), TuiError> {
        if self.selected_entry().is_none() {
            return Ok(());
        }
        let index = self.ui.selected_index;
        let result = self
            .journal
            .toggle_complete(IndexTarget::Visible(&self.session), index);
        self.apply_transition("Completion toggled", result)
    }

    pub fn toggle_migrate_selected(&mut self) -> Result<(), TuiError> {
        if self.selected_entry().is_none() {
            return Ok(());
        }
        let index = self.ui.selected_index;
        let result = self
            .journal
            .toggle_migrate(IndexTarget::Visible(&self.session), index);
        self.apply_transition("Migrated", result)
    }

    /// A Scheduled entry is unscheduled at once; anything else asks for a date.
    pub fn schedule_selected(&mut self) -> Result<(), TuiError> {
        let Some(selected) = self.selected_entry() else {
            return Ok(());
        };
        if selected.entry.kind == EntryKind::Scheduled {
            let index = self.ui.selected_index;
            let anchor = self.session.anchor;
            let result = self
                .journal
                .toggle_schedule(IndexTarget::Visible(&self.session), index, anchor);
            return self.apply_transition("Unscheduled", result);
        }
        self.open_prompt(PromptAction::Schedule);
        Ok(())
    }

    pub fn open_kind_picker(&mut self) {
        let Some(selected) = self.selected_entry() else {
            return;
        };
        let kind = selected.entry.kind;
        self.ui.picker_index = EntryKind::PICKABLE
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0);
        self.ui.mode = Mode::KindPicker;
    }

    pub fn picker_up(&mut self) {
        self.ui.picker_index = self.ui.picker_index.saturating_sub(1);
    }

    pub fn picker_down(&mut self) {
        self.ui.picker_index = (self.ui.picker_index + 1).min(EntryKind::PICKABLE.len() - 1);
    }

    pub fn close_kind_picker(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn apply_kind_picker(&mut self) -> Result<(), TuiError> {
        self.ui.mode = Mode::View;
        let Some(kind) = EntryKind::PICKABLE.get(self.ui.picker_index).copied() else {
            return Ok(());
        };
        let index = self.ui.selected_index;
        let result = self
            .journal
            .retype(IndexTarget::Visible(&self.session), index, kind);
        self.apply_transition(&format!("Changed to {}", kind.label()), result)
    }

    pub fn show_delete_confirmation(&mut self) {
        if self.selected_entry().is_some() {
            self.ui.delete_modal_selection = 0;
            self.ui.mode = Mode::ConfirmDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn confirm_delete(&mut self) -> Result<(), TuiError> {
        self.ui.mode = Mode::View;
        let index = self.ui.selected_index;
        let result = self.journal.delete(IndexTarget::Visible(&self.session), index);
        self.apply_transition("Deleted", result)
    }

    fn apply_transition(&mut self, done: &str, result: StoreResult<Transition>) -> Result<(), TuiError> {
        match result {
            Ok(transition) => {
                self.set_status_message(transition_message(done, transition));
                if transition.changed() {
                    self.refresh()?;
                }
                Ok(())
            }
            Err(e) => {
                self.report_error(done, &e);
                self.refresh()
            }
        }
    }

    fn report_error(&mut self, action: &str, e: &dyn std::error::Error) {
        error!("event=tui_action module=tui status=error action={:?} error={}", action, e);
        self.set_status_message(format!("Error: {}", e));
    }

    /// Tag list of the selected entry as shown in the status bar
    pub fn selected_tags(&self) -> String {
        self.selected_entry()
            .map(|e| format_tags(&e.entry.tags))
            .unwrap_or_default()
    }
}

fn transition_message(done: &str, transition: Transition) -> String {
    match transition {
        Transition::Unchanged => "Nothing to change".to_string(),
        Transition::Updated | Transition::Removed => done.to_string(),
        Transition::Forwarded { target } => format!("Moved to {}", target),
        Transition::Restored { target, clone_removed: true } => {
            format!("Restored; removed the copy on {}", target)
        }
        Transition::Restored { target, clone_removed: false } => {
            format!("Restored; no copy found on {}", target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DayStore;
    use crate::models::Entry;
    use tempfile::TempDir;

    fn app_with(entries: &[(NaiveDate, EntryKind, &str)]) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        for (date, kind, text) in entries {
            store.append(*date, Entry::new(*kind, *text)).unwrap();
        }
        let app = App::new(Config::default(), Journal::new(store), dir.path()).unwrap();
        (dir, app)
    }

    fn type_into(app: &mut App, text: &str) {
        let prompt = app.prompt.as_mut().unwrap();
        prompt.input.clear();
        for ch in text.chars() {
            prompt.input.insert(ch);
        }
    }

    #[test]
    fn add_rejects_empty_text_and_keeps_prompt_open() {
        let (_dir, mut app) = app_with(&[]);
        app.open_prompt(PromptAction::Add);
        type_into(&mut app, "   ");
        app.submit_prompt().unwrap();
        assert_eq!(app.ui.mode, Mode::Prompt);
        assert!(app.prompt.as_ref().unwrap().error.is_some());

        type_into(&mut app, "Buy milk");
        app.submit_prompt().unwrap();
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.entries[0].entry.kind, EntryKind::Task);
        assert_eq!(app.entries[0].date, app.session.anchor);
    }

    #[test]
    fn migrate_moves_selection_target_and_undo_restores() {
        let today = utils::today();
        let (_dir, mut app) = app_with(&[(today, EntryKind::Task, "Call Sam")]);
        app.toggle_migrate_selected().unwrap();
        assert_eq!(app.entries[0].entry.kind, EntryKind::Migrated);
        assert!(app.status.message.as_deref().unwrap().starts_with("Moved to"));

        app.toggle_migrate_selected().unwrap();
        assert_eq!(app.entries[0].entry.kind, EntryKind::Task);
        let next = today.succ_opt().unwrap();
        assert!(app.journal.day_listing(next).unwrap().is_empty());
    }

    #[test]
    fn completing_a_note_reports_nothing_to_change() {
        let today = utils::today();
        let (_dir, mut app) = app_with(&[(today, EntryKind::Note, "idea")]);
        app.toggle_complete_selected().unwrap();
        assert_eq!(app.status.message.as_deref(), Some("Nothing to change"));
        assert_eq!(app.entries[0].entry.kind, EntryKind::Note);
    }

    #[test]
    fn invalid_schedule_date_keeps_prompt_open() {
        let today = utils::today();
        let (_dir, mut app) = app_with(&[(today, EntryKind::Task, "Dentist")]);
        app.schedule_selected().unwrap();
        assert_eq!(app.ui.mode, Mode::Prompt);
        type_into(&mut app, "next week");
        app.submit_prompt().unwrap();
        assert_eq!(app.ui.mode, Mode::Prompt);

        let target = today + chrono::Days::new(3);
        type_into(&mut app, &target.format("%Y-%m-%d").to_string());
        app.submit_prompt().unwrap();
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.entries[0].entry.kind, EntryKind::Scheduled);

        // Unscheduling needs no prompt
        app.schedule_selected().unwrap();
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.entries[0].entry.kind, EntryKind::Task);
    }

    #[test]
    fn selection_follows_entry_across_filter_changes() {
        let today = utils::today();
        let (_dir, mut app) = app_with(&[
            (today, EntryKind::Task, "alpha"),
            (today, EntryKind::Note, "beta"),
            (today, EntryKind::Task, "gamma"),
        ]);
        app.move_to_bottom();
        assert_eq!(app.selected_entry().unwrap().entry.text, "gamma");

        app.open_prompt(PromptAction::KindFilter);
        type_into(&mut app, "task");
        app.submit_prompt().unwrap();
        assert_eq!(app.entries.len(), 2);
        assert_eq!(app.selected_entry().unwrap().entry.text, "gamma");

        app.open_prompt(PromptAction::KindFilter);
        type_into(&mut app, "task,bogus");
        app.submit_prompt().unwrap();
        assert_eq!(app.ui.mode, Mode::Prompt);
    }

    #[test]
    fn view_changes_are_saved_and_restored() {
        let (dir, mut app) = app_with(&[]);
        app.set_scope(Scope::Week).unwrap();
        app.open_prompt(PromptAction::TagFilter);
        type_into(&mut app, "#Work, home");
        app.submit_prompt().unwrap();

        let store = FsStore::new(dir.path()).unwrap();
        let reopened = App::new(Config::default(), Journal::new(store), dir.path()).unwrap();
        assert_eq!(reopened.session.scope, Scope::Week);
        assert!(reopened.session.filters.tags.contains("work"));
        assert!(reopened.session.filters.tags.contains("home"));
    }

    #[test]
    fn delete_clamps_selection() {
        let today = utils::today();
        let (_dir, mut app) = app_with(&[
            (today, EntryKind::Task, "one"),
            (today, EntryKind::Task, "two"),
        ]);
        app.move_to_bottom();
        app.show_delete_confirmation();
        assert_eq!(app.ui.mode, Mode::ConfirmDelete);
        app.confirm_delete().unwrap();
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.ui.selected_index, 0);
    }

    #[test]
    fn kind_picker_starts_on_current_kind() {
        let today = utils::today();
        let (_dir, mut app) = app_with(&[(today, EntryKind::Event, "Standup")]);
        app.open_kind_picker();
        assert_eq!(EntryKind::PICKABLE[app.ui.picker_index], EntryKind::Event);
        app.picker_up();
        app.apply_kind_picker().unwrap();
        assert_eq!(app.entries[0].entry.kind, EntryKind::PICKABLE[0]);
    }
}
