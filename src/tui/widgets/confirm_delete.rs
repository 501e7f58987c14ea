use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use ratatui::text::{Line, Span};
use crate::Config;
use crate::models::DatedEntry;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::help::popup_area;

pub const DELETE_OPTIONS: [&str; 2] = ["Delete", "Cancel"];

pub fn render_confirm_delete(f: &mut Frame, area: Rect, dated: &DatedEntry, selection: usize, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);
    let text_style = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let mut all_lines = vec![
        Line::from(Span::styled(
            format!("Delete this {} from {}?", dated.entry.kind.label().to_lowercase(), dated.date),
            text_style,
        )),
        Line::from(""),
        Line::from(Span::styled(dated.entry.display_line(), text_style)),
        Line::from(""),
    ];

    for (index, option) in DELETE_OPTIONS.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            text_style
        };
        all_lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    all_lines.push(Line::from(""));
    all_lines.push(Line::from(Span::styled(
        "Use ↑↓ to navigate, Enter to confirm, Esc to cancel",
        text_style,
    )));

    let paragraph = Paragraph::new(all_lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Confirm Delete")
            .title_alignment(Alignment::Center)
            .style(text_style))
        .style(text_style)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
