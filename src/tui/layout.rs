use ratatui::layout::{Rect, Layout as RatLayout, Direction, Constraint};

pub struct Layout {
    pub inner_area: Rect,  // Area inside the outer border
    pub tabs_area: Rect,
    pub main_area: Rect,
    pub filters_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Height: 2 outer borders + 1 tabs + 1 content + 3 filters + 1 status + 2 buffer
    pub const MIN_WIDTH: u16 = 38;
    pub const MIN_HEIGHT: u16 = 10;

    /// `display_width` caps the list column width and centers it; 0 uses the full width.
    pub fn calculate(size: Rect, display_width: u16) -> Self {
        let min_width_with_border = Self::MIN_WIDTH + 2;
        let min_height_with_border = Self::MIN_HEIGHT + 2;
        let width = size.width.max(min_width_with_border);
        let height = size.height.max(min_height_with_border);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(1),    // Entry list
                Constraint::Length(3), // Filters or prompt
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            tabs_area: vertical[0],
            main_area: centered_column(vertical[1], display_width),
            filters_area: vertical[2],
            status_area: vertical[3],
        }
    }
}

fn centered_column(area: Rect, display_width: u16) -> Rect {
    if display_width == 0 || display_width >= area.width {
        return area;
    }
    let width = display_width.max(Layout::MIN_WIDTH).min(area.width);
    let x = area.x + (area.width - width) / 2;
    Rect::new(x, area.y, width, area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_centers_the_list() {
        let layout = Layout::calculate(Rect::new(0, 0, 102, 30), 60);
        assert_eq!(layout.main_area.width, 60);
        assert_eq!(layout.main_area.x, 1 + 20);
        assert_eq!(layout.tabs_area.width, 100);
    }

    #[test]
    fn zero_or_oversized_width_fills_the_row() {
        let full = Layout::calculate(Rect::new(0, 0, 80, 24), 0);
        assert_eq!(full.main_area.width, 78);
        let wide = Layout::calculate(Rect::new(0, 0, 80, 24), 500);
        assert_eq!(wide.main_area, full.main_area);
    }

    #[test]
    fn tiny_terminals_are_clamped() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5), 0);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.status_area.height, 1);
    }
}
