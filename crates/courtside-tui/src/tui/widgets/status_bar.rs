// Status bar: tab indicator, record counts and the last notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{TabId, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = tab_spans(state.active_tab);

    spans.push(Span::styled(
        format!("{} players ", state.data.players.len()),
        Style::default().fg(Color::White),
    ));

    if let Some(notice) = &state.notice {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        let color = if notice.is_error { Color::Red } else { Color::Green };
        spans.push(Span::styled(notice.text.clone(), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// "[1:Players] [2:Teams] [3:Predict]" with the active tab highlighted.
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let tabs = [
        (TabId::Players, "1:Players"),
        (TabId::Teams, "2:Teams"),
        (TabId::Predict, "3:Predict"),
    ];

    let mut spans = Vec::new();
    for (tab_id, label) in tabs {
        let style = if tab_id == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}]", label), style));
        spans.push(Span::raw(" "));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::view_with_sample;

    #[test]
    fn tab_spans_highlight_active() {
        let spans = tab_spans(TabId::Teams);
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[4].content, "[3:Predict]");
    }

    #[test]
    fn error_notice_is_red() {
        let backend = ratatui::backend::TestBackend::new(100, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = view_with_sample();
        state.set_notice("import failed", true);
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (0..100).map(|x| buffer[(x, 0)].symbol()).collect();
        let start = row.find("import failed").unwrap() as u16;
        assert_eq!(buffer[(start, 0)].fg, Color::Red);
        assert!(row.contains("3 players"));
    }
}
