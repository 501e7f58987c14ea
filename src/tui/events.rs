use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use crate::models::Scope;
use crate::tui::App;
use crate::tui::app::{Mode, PromptAction};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{has_primary_modifier, parse_key_binding, ParsedKeyBinding};

/// Rows moved by PageUp / PageDown
const PAGE_STEP: isize = 10;

/// Guard that ensures terminal state is restored even on panic
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored here, we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Checked before entering the alternate screen so the message stays readable
    let (width, height) = terminal_size()?;

    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect, app.session.display_width);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events; Windows also reports Release
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;

    Ok(())
}

/// Returns `Ok(true)` when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.ui.mode {
        Mode::View => handle_view_mode(app, key_event),
        Mode::Help => {
            let help = parse_key_binding(&app.config.key_bindings.help).map_err(TuiError::KeyBindingError)?;
            if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('q')) || matches_key_event(key_event, &help) {
                app.exit_help_mode();
            }
            Ok(false)
        }
        Mode::Prompt => handle_prompt_mode(app, key_event),
        Mode::KindPicker => {
            match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => app.picker_up(),
                KeyCode::Down | KeyCode::Char('j') => app.picker_down(),
                KeyCode::Enter => app.apply_kind_picker()?,
                KeyCode::Esc => app.close_kind_picker(),
                _ => {}
            }
            Ok(false)
        }
        Mode::ConfirmDelete => handle_delete_confirmation_modal(app, key_event),
    }
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let bindings = &app.config.key_bindings;
    let quit = parse_key_binding(&bindings.quit).map_err(TuiError::KeyBindingError)?;
    let list_up = parse_key_binding(&bindings.list_up).map_err(TuiError::KeyBindingError)?;
    let list_down = parse_key_binding(&bindings.list_down).map_err(TuiError::KeyBindingError)?;
    let list_top = parse_key_binding(&bindings.list_top).map_err(TuiError::KeyBindingError)?;
    let list_bottom = parse_key_binding(&bindings.list_bottom).map_err(TuiError::KeyBindingError)?;
    let scope_day = parse_key_binding(&bindings.scope_day).map_err(TuiError::KeyBindingError)?;
    let scope_week = parse_key_binding(&bindings.scope_week).map_err(TuiError::KeyBindingError)?;
    let scope_month = parse_key_binding(&bindings.scope_month).map_err(TuiError::KeyBindingError)?;
    let prev_period = parse_key_binding(&bindings.prev_period).map_err(TuiError::KeyBindingError)?;
    let next_period = parse_key_binding(&bindings.next_period).map_err(TuiError::KeyBindingError)?;
    let jump_to_date = parse_key_binding(&bindings.jump_to_date).map_err(TuiError::KeyBindingError)?;
    let today = parse_key_binding(&bindings.today).map_err(TuiError::KeyBindingError)?;
    let text_filter = parse_key_binding(&bindings.text_filter).map_err(TuiError::KeyBindingError)?;
    let kind_filter = parse_key_binding(&bindings.kind_filter).map_err(TuiError::KeyBindingError)?;
    let tag_filter = parse_key_binding(&bindings.tag_filter).map_err(TuiError::KeyBindingError)?;
    let clear_filters = parse_key_binding(&bindings.clear_filters).map_err(TuiError::KeyBindingError)?;
    let add = parse_key_binding(&bindings.add).map_err(TuiError::KeyBindingError)?;
    let edit = parse_key_binding(&bindings.edit).map_err(TuiError::KeyBindingError)?;
    let delete = parse_key_binding(&bindings.delete).map_err(TuiError::KeyBindingError)?;
    let complete = parse_key_binding(&bindings.complete).map_err(TuiError::KeyBindingError)?;
    let migrate = parse_key_binding(&bindings.migrate).map_err(TuiError::KeyBindingError)?;
    let schedule = parse_key_binding(&bindings.schedule).map_err(TuiError::KeyBindingError)?;
    let retype = parse_key_binding(&bindings.retype).map_err(TuiError::KeyBindingError)?;
    let tags = parse_key_binding(&bindings.tags).map_err(TuiError::KeyBindingError)?;
    let help = parse_key_binding(&bindings.help).map_err(TuiError::KeyBindingError)?;

    if matches_key_event(key_event, &quit) {
        return Ok(true);
    }

    match key_event.code {
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        KeyCode::PageUp => app.move_selection_by(-PAGE_STEP),
        KeyCode::PageDown => app.move_selection_by(PAGE_STEP),
        KeyCode::Home => app.move_to_top(),
        KeyCode::End => app.move_to_bottom(),
        _ if matches_key_event(key_event, &list_up) => app.move_selection_up(),
        _ if matches_key_event(key_event, &list_down) => app.move_selection_down(),
        _ if matches_key_event(key_event, &list_top) => app.move_to_top(),
        _ if matches_key_event(key_event, &list_bottom) => app.move_to_bottom(),
        _ if matches_key_event(key_event, &scope_day) => app.set_scope(Scope::Day)?,
        _ if matches_key_event(key_event, &scope_week) => app.set_scope(Scope::Week)?,
        _ if matches_key_event(key_event, &scope_month) => app.set_scope(Scope::Month)?,
        _ if matches_key_event(key_event, &prev_period) => app.prev_period()?,
        _ if matches_key_event(key_event, &next_period) => app.next_period()?,
        _ if matches_key_event(key_event, &jump_to_date) => app.open_prompt(PromptAction::JumpToDate),
        _ if matches_key_event(key_event, &today) => app.go_to_today()?,
        _ if matches_key_event(key_event, &text_filter) => app.open_prompt(PromptAction::TextFilter),
        _ if matches_key_event(key_event, &kind_filter) => app.open_prompt(PromptAction::KindFilter),
        _ if matches_key_event(key_event, &tag_filter) => app.open_prompt(PromptAction::TagFilter),
        _ if matches_key_event(key_event, &clear_filters) => app.clear_filters()?,
        _ if matches_key_event(key_event, &add) => app.open_prompt(PromptAction::Add),
        _ if matches_key_event(key_event, &edit) => app.open_prompt(PromptAction::Edit),
        _ if matches_key_event(key_event, &delete) => app.show_delete_confirmation(),
        _ if matches_key_event(key_event, &complete) => app.toggle_complete_selected()?,
        _ if matches_key_event(key_event, &migrate) => app.toggle_migrate_selected()?,
        _ if matches_key_event(key_event, &schedule) => app.schedule_selected()?,
        _ if matches_key_event(key_event, &retype) => app.open_kind_picker(),
        _ if matches_key_event(key_event, &tags) => app.open_prompt(PromptAction::Tags),
        _ if matches_key_event(key_event, &help) => app.enter_help_mode(),
        _ => {}
    }
    Ok(false)
}

fn handle_prompt_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Enter => app.submit_prompt()?,
        code => {
            let Some(prompt) = app.prompt.as_mut() else {
                app.cancel_prompt();
                return Ok(false);
            };
            match code {
                KeyCode::Backspace => prompt.input.backspace(),
                KeyCode::Delete => prompt.input.delete(),
                KeyCode::Left => prompt.input.move_left(),
                KeyCode::Right => prompt.input.move_right(),
                KeyCode::Home => prompt.input.home(),
                KeyCode::End => prompt.input.end(),
                KeyCode::Char(ch) if !has_primary_modifier(key_event.modifiers) => {
                    prompt.input.insert(ch);
                    prompt.error = None;
                }
                _ => {}
            }
        }
    }
    Ok(false)
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        // Two options, so up and down both flip
        KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
            app.ui.delete_modal_selection = 1 - app.ui.delete_modal_selection.min(1);
        }
        KeyCode::Enter => {
            if app.ui.delete_modal_selection == 0 {
                app.confirm_delete()?;
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    Ok(false)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl, or Option/Alt on macOS
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsStore;
    use crate::{Config, DayStore, Entry, EntryKind, Journal};
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_tasks(texts: &[&str]) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        for text in texts {
            store
                .append(crate::utils::today(), Entry::new(EntryKind::Task, *text))
                .unwrap();
        }
        let app = App::new(Config::default(), Journal::new(store), dir.path()).unwrap();
        (dir, app)
    }

    #[test]
    fn quit_and_navigation_keys() {
        let (_dir, mut app) = app_with_tasks(&["a", "b", "c"]);
        assert!(!handle_key_event(&mut app, press(KeyCode::Char('j'))).unwrap());
        assert_eq!(app.ui.selected_index, 1);
        handle_key_event(&mut app, press(KeyCode::Char('G'))).unwrap();
        assert_eq!(app.ui.selected_index, 2);
        handle_key_event(&mut app, press(KeyCode::Char('g'))).unwrap();
        assert_eq!(app.ui.selected_index, 0);
        assert!(handle_key_event(&mut app, press(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn typing_into_prompt_does_not_trigger_bindings() {
        let (_dir, mut app) = app_with_tasks(&[]);
        handle_key_event(&mut app, press(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.ui.mode, Mode::Prompt);
        for ch in "quit".chars() {
            assert!(!handle_key_event(&mut app, press(KeyCode::Char(ch))).unwrap());
        }
        handle_key_event(&mut app, press(KeyCode::Enter)).unwrap();
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.entries[0].entry.text, "quit");
    }

    #[test]
    fn delete_needs_confirmation() {
        let (_dir, mut app) = app_with_tasks(&["keep"]);
        handle_key_event(&mut app, press(KeyCode::Char('x'))).unwrap();
        handle_key_event(&mut app, press(KeyCode::Esc)).unwrap();
        assert_eq!(app.entries.len(), 1);

        handle_key_event(&mut app, press(KeyCode::Char('x'))).unwrap();
        handle_key_event(&mut app, press(KeyCode::Down)).unwrap();
        handle_key_event(&mut app, press(KeyCode::Enter)).unwrap();
        assert_eq!(app.entries.len(), 1);

        handle_key_event(&mut app, press(KeyCode::Char('x'))).unwrap();
        handle_key_event(&mut app, press(KeyCode::Enter)).unwrap();
        assert!(app.entries.is_empty());
    }

    #[test]
    fn ctrl_binding_requires_modifier() {
        let binding = parse_key_binding("Ctrl+l").unwrap();
        assert!(!matches_key_event(press(KeyCode::Char('l')), &binding));
        assert!(matches_key_event(
            KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL),
            &binding
        ));
    }
}
