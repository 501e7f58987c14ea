use ratatui::Frame;
use ratatui::widgets::{Block, Borders};
use ratatui::style::Style;
use crate::models::EntryKind;
use crate::tui::app::Mode;
use crate::tui::{App, Layout};
use crate::tui::widgets::{
    color::parse_color,
    confirm_delete::render_confirm_delete,
    entry_list::render_entry_list,
    filters_box::render_filters_box,
    help::render_help,
    kind_picker::render_kind_picker,
    line_input::render_line_input,
    status_bar::render_status_bar,
    tabs::render_tabs,
};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("BLT")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let percent_done = app.completion_percent();
    render_tabs(
        f,
        layout.tabs_area,
        app.session.scope,
        &app.session.label(),
        percent_done,
        &app.config,
    );

    render_entry_list(
        f,
        layout.main_area,
        &app.entries,
        app.session.scope,
        &mut app.ui.list_state,
        &app.config,
    );

    // The prompt takes the filters box's place while it is open
    match (&app.ui.mode, &app.prompt) {
        (Mode::Prompt, Some(prompt)) => render_line_input(
            f,
            layout.filters_area,
            prompt.action.label(),
            &prompt.input,
            prompt.error.as_deref(),
            &app.config,
        ),
        _ => render_filters_box(f, layout.filters_area, &app.session.filters.summary(), &app.config),
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &app.config);

    match app.ui.mode {
        Mode::Help => render_help(f, f.area(), &app.config),
        Mode::KindPicker => render_kind_picker(f, f.area(), app.ui.picker_index, &app.config),
        Mode::ConfirmDelete => {
            if let Some(selected) = app.selected_entry() {
                render_confirm_delete(f, f.area(), selected, app.ui.delete_modal_selection, &app.config);
            }
        }
        Mode::View | Mode::Prompt => {}
    }
}

/// Hints for the current mode; in View mode they follow the selected entry's kind.
pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&kb.help))],
        Mode::Prompt => vec!["Enter: Submit".to_string(), "Esc: Cancel".to_string()],
        Mode::KindPicker => vec![
            "↑/↓: Choose".to_string(),
            "Enter: Apply".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::ConfirmDelete => vec!["Enter: Confirm".to_string(), "Esc: Cancel".to_string()],
        Mode::View => {
            let mut hints = vec![format!("{}: Add", key(&kb.add))];
            if let Some(selected) = app.selected_entry() {
                let kind = selected.entry.kind;
                match kind {
                    EntryKind::Done => hints.push(format!("{}: In progress", key(&kb.complete))),
                    EntryKind::Task => hints.push(format!("{}: Complete", key(&kb.complete))),
                    _ => {}
                }
                match kind {
                    EntryKind::Migrated => hints.push(format!("{}: Unmigrate", key(&kb.migrate))),
                    EntryKind::Scheduled => hints.push(format!("{}: Unschedule", key(&kb.schedule))),
                    _ if kind.is_actionable() => {
                        hints.push(format!("{}: Migrate", key(&kb.migrate)));
                        hints.push(format!("{}: Schedule", key(&kb.schedule)));
                    }
                    _ => {}
                }
                hints.push(format!("{}: Edit", key(&kb.edit)));
                hints.push(format!("{}: Delete", key(&kb.delete)));
                hints.push(format!("{}: Type", key(&kb.retype)));
                hints.push(format!("{}: Tags", key(&kb.tags)));
            }
            hints.push(format!("{}: Help", key(&kb.help)));
            hints.push(format!("{}: Quit", key(&kb.quit)));
            hints
        }
    }
}
