// Bottom row: key hints, or the line being typed.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{TabId, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(state: &ViewState) -> String {
    if state.command_mode {
        return format!(":{}_", state.command_text);
    }
    if state.filter_mode {
        return format!("/{}_", state.filter_text);
    }
    if state.detail.is_some() {
        return " Esc:Close".to_string();
    }
    let tab_keys = match state.active_tab {
        TabId::Players => "/:Filter | Enter:Detail",
        TabId::Teams => "[ ]:Team | t:Ratings/Salary | Enter:Detail",
        TabId::Predict => "c:Conference | +/-:Adjust",
    };
    format!(" q:Quit | 1-3:Tabs | ←→:Column | s:Sort | {tab_keys} | ::Command")
}
