use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::tui::widgets::color::parse_color;

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    text: String,
    /// Cursor position in characters, not bytes
    cursor: usize,
}

impl LineInput {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

/// Bordered prompt box with `label` as its title and an optional error line.
pub fn render_line_input(
    f: &mut Frame,
    area: Rect,
    label: &str,
    input: &LineInput,
    error: Option<&str>,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    f.render_widget(Clear, area);

    let mut title = vec![Span::raw(format!("{} ", label))];
    if let Some(error) = error {
        title.push(Span::styled(format!("({}) ", error), Style::default().fg(highlight_bg)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(title))
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = block.inner(area);

    // Keep the cursor visible on narrow boxes by scrolling the text
    let width = inner.width.saturating_sub(1) as usize;
    let skip = input.cursor().saturating_sub(width);
    let shown: String = input.value().chars().skip(skip).collect();

    let paragraph = Paragraph::new(shown)
        .block(block)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(paragraph, area);

    let cursor_x = inner.x + (input.cursor() - skip) as u16;
    f.set_cursor_position(Position::new(cursor_x.min(inner.right().saturating_sub(1)), inner.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_respects_multibyte_characters() {
        let mut input = LineInput::with_text("café");
        assert_eq!(input.cursor(), 4);
        input.backspace();
        assert_eq!(input.value(), "caf");
        input.insert('é');
        input.home();
        input.delete();
        assert_eq!(input.value(), "afé");
        input.move_right();
        input.insert('-');
        assert_eq!(input.value(), "a-fé");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = LineInput::default();
        input.backspace();
        input.move_left();
        input.delete();
        assert_eq!(input.cursor(), 0);
        input.insert('x');
        input.move_right();
        input.move_right();
        assert_eq!(input.cursor(), 1);
        input.clear();
        assert_eq!(input.value(), "");
    }
}
