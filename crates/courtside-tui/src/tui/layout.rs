// Screen layout.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Main Panel (fill)                                 |
// +--------------------------------------------------+
// | Help / Command Bar (1 row)                        |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Tabs, record counts and the last notice.
    pub status_bar: Rect,
    /// The active tab's table(s).
    pub main_panel: Rect,
    /// Key hints, or the command/filter line while typing.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        help_bar: vertical[2],
    }
}

/// A rectangle of the given percentage size centered in `area`.
pub fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_stacked_and_cover_the_area() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = build_layout(area);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.main_panel.height, 38);
        assert_eq!(layout.main_panel.y, 1);
        assert_eq!(layout.help_bar.y, 39);
        assert_eq!(layout.main_panel.width, 120);
    }

    #[test]
    fn small_terminal_still_has_a_main_panel() {
        let layout = build_layout(Rect::new(0, 0, 40, 8));
        assert!(layout.main_panel.height >= 5);
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let inner = centered(area, 60, 40);
        assert!(inner.x >= 19 && inner.x <= 21);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert!(inner.y + inner.height <= area.height);
    }
}
