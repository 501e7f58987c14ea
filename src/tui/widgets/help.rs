use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment, Constraint, Layout, Flex};
use crate::Config;
use crate::models::EntryKind;
use crate::utils::format_key_binding_for_display as key;
use crate::tui::widgets::color::parse_color;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

/// Centered rect taking the given percentages of `area`
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {} or ↑ / ↓: Move selection\n", key(&kb.list_down), key(&kb.list_up)));
    text.push_str(&format!("  {} / {}: Top / bottom\n", key(&kb.list_top), key(&kb.list_bottom)));
    text.push_str("  PageUp / PageDown: Move by page\n");
    text.push_str(&format!(
        "  {} / {} / {}: Day, week, month\n",
        key(&kb.scope_day),
        key(&kb.scope_week),
        key(&kb.scope_month)
    ));
    text.push_str(&format!("  {} / {}: Previous / next period\n", key(&kb.prev_period), key(&kb.next_period)));
    text.push_str(&format!("  {}: Go to date\n", key(&kb.jump_to_date)));
    text.push_str(&format!("  {}: Today\n", key(&kb.today)));
    text.push('\n');

    text.push_str("Entries:\n");
    text.push_str(&format!("  {}: Add task\n", key(&kb.add)));
    text.push_str(&format!("  {}: Edit text\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Complete / reopen\n", key(&kb.complete)));
    text.push_str(&format!("  {}: Migrate to tomorrow / undo\n", key(&kb.migrate)));
    text.push_str(&format!("  {}: Schedule for a date / undo\n", key(&kb.schedule)));
    text.push_str(&format!("  {}: Change type\n", key(&kb.retype)));
    text.push_str(&format!("  {}: Edit tags\n", key(&kb.tags)));
    text.push('\n');

    text.push_str("Filters:\n");
    text.push_str(&format!("  {}: Text\n", key(&kb.text_filter)));
    text.push_str(&format!("  {}: Types (comma separated)\n", key(&kb.kind_filter)));
    text.push_str(&format!("  {}: Tags (comma separated)\n", key(&kb.tag_filter)));
    text.push_str(&format!("  {}: Clear all\n", key(&kb.clear_filters)));
    text.push('\n');

    text.push_str("Symbols:\n");
    for kind in EntryKind::ALL {
        text.push_str(&format!("  {}  {}\n", kind.symbol(), kind.label()));
    }
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {} or Ctrl+c: Quit\n", key(&kb.quit)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_follows_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.migrate = "M".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("  M: Migrate to tomorrow / undo"));
        assert!(text.contains("⧗  Scheduled"));
    }
}
