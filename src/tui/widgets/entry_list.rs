use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Scrollbar, ScrollbarState, ScrollbarOrientation};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect, Layout, Direction, Constraint};
use crate::models::{DatedEntry, EntryKind, Scope};
use crate::Config;
use crate::utils::format_key_binding_for_display;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

/// One list row; outside Day scope each row starts with its date.
pub fn entry_line(dated: &DatedEntry, scope: Scope, max_width: usize) -> String {
    let mut line = dated.entry.display_line();
    if let (true, Some(target)) = (dated.entry.kind.is_forwarded(), dated.entry.scheduled_for) {
        line.push_str(&format!("  → {}", target.format("%Y-%m-%d")));
    }
    if scope != Scope::Day {
        line = format!("{}  {}", dated.date.format("%Y-%m-%d"), line);
    }
    if line.chars().count() > max_width {
        line = line.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
    }
    line
}

pub fn render_entry_list(
    f: &mut Frame,
    area: Rect,
    entries: &[DatedEntry],
    scope: Scope,
    list_state: &mut ListState,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let muted_fg = parse_color(&active_theme.muted_fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    if entries.is_empty() {
        let hint = format!(
            "⟂ No items here. Press '{}' to add",
            format_key_binding_for_display(&config.key_bindings.add)
        );
        let paragraph = Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(muted_fg))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    // 2 for borders, 2 for padding
    let max_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = entries
        .iter()
        .map(|dated| {
            let style = match dated.entry.kind {
                EntryKind::Done | EntryKind::Migrated | EntryKind::Scheduled => Style::default().fg(muted_fg),
                _ => Style::default().fg(fg_color),
            };
            ListItem::new(entry_line(dated, scope, max_width)).style(style)
        })
        .collect();

    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);

    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let total_items = items.len();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("Entries ({})", total_items)))
        .style(Style::default().fg(fg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
        );

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize;

    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        let selected_index = list_state.selected().unwrap_or(0);
        let scroll_position = if selected_index < visible_items {
            0
        } else {
            selected_index.saturating_sub(visible_items - 1)
        };

        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(scroll_position);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entry;
    use chrono::NaiveDate;

    fn dated(kind: EntryKind, text: &str) -> DatedEntry {
        DatedEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            entry: Entry::new(kind, text),
        }
    }

    #[test]
    fn date_prefix_only_outside_day_scope() {
        let task = dated(EntryKind::Task, "Buy milk");
        assert_eq!(entry_line(&task, Scope::Day, 80), "• Buy milk");
        assert_eq!(entry_line(&task, Scope::Week, 80), "2024-03-14  • Buy milk");
    }

    #[test]
    fn forwarded_entries_show_target() {
        let mut moved = dated(EntryKind::Migrated, "Call Sam");
        moved.entry.scheduled_for = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(entry_line(&moved, Scope::Day, 80), "» Call Sam  → 2024-03-15");
    }

    #[test]
    fn long_lines_are_truncated() {
        let task = dated(EntryKind::Task, "a very long entry text");
        assert_eq!(entry_line(&task, Scope::Day, 10), "• a ver...");
    }
}
