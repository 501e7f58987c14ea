use ratatui::widgets::{Paragraph, Tabs};
use ratatui::style::{Style, Modifier};
use ratatui::text::{Line, Span};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use crate::models::Scope;
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

const SCOPES: [Scope; 3] = [Scope::Day, Scope::Week, Scope::Month];

/// Scope tabs on the left, the window label and completion on the right.
pub fn render_tabs(
    f: &mut Frame,
    area: Rect,
    scope: Scope,
    window_label: &str,
    percent_done: Option<u8>,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let tab_bg = parse_color(&active_theme.tab_bg);
    let tab_fg = get_contrast_text_color(tab_bg);

    // Padding spans give each tab a box look
    let titles: Vec<Line> = SCOPES
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Line::from(vec![
                Span::styled(" ", Style::default().bg(tab_bg)),
                Span::styled(format!("{} {}", i + 1, s.label()), Style::default().fg(tab_fg).bg(tab_bg)),
                Span::styled(" ", Style::default().bg(tab_bg)),
            ])
        })
        .collect();

    let tab_index = SCOPES.iter().position(|s| *s == scope).unwrap_or(0);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let tabs = Tabs::new(titles)
        .select(tab_index)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD)
        )
        .divider(" ")
        .padding("", "");

    let mut label = window_label.to_string();
    if let Some(percent) = percent_done {
        label.push_str(&format!("  ({}% done)", percent));
    }

    let [tabs_area, label_area] =
        Layout::horizontal([Constraint::Length(tabs_width()), Constraint::Min(0)]).areas(area);

    f.render_widget(tabs, tabs_area);
    f.render_widget(
        Paragraph::new(label)
            .style(Style::default().fg(fg_color).bg(bg_color))
            .alignment(Alignment::Right),
        label_area,
    );
}

fn tabs_width() -> u16 {
    let titles: usize = SCOPES.iter().map(|s| s.label().chars().count() + 4).sum();
    (titles + SCOPES.len() - 1) as u16
}
