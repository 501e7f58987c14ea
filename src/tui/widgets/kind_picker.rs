use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::models::EntryKind;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::help::popup_area;

/// Popup listing the kinds a user may assign, with `selection` highlighted.
pub fn render_kind_picker(f: &mut Frame, area: Rect, selection: usize, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup_area = popup_area(area, 40, 40);
    f.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = EntryKind::PICKABLE
        .iter()
        .map(|kind| ListItem::new(format!("{}  {}", kind.symbol(), kind.label())))
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Change type (Enter/Esc)")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selection));
    f.render_stateful_widget(list, popup_area, &mut state);
}
