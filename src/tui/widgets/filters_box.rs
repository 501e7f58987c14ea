use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::Config;
use crate::utils::format_key_binding_for_display;
use crate::tui::widgets::color::parse_color;

pub fn render_filters_box(
    f: &mut Frame,
    area: Rect,
    summary: &str,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let muted_fg = parse_color(&active_theme.muted_fg);

    let (content, style) = if summary.is_empty() {
        ("No filters", Style::default().fg(muted_fg))
    } else {
        (summary, Style::default().fg(fg_color))
    };

    let title = format!(
        "Filters ({} clears)",
        format_key_binding_for_display(&config.key_bindings.clear_filters)
    );
    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(style)
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, area);
}
