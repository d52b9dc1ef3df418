// Predict tab: one conference's season predictions against the betting line.

use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, TableState};
use ratatui::Frame;

use crate::tui::ViewState;

use super::build_table;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = state.predictions();
    let rendered = state.tables.predict.render(
        &rows,
        &state.predict_sort,
        &state.predict_stats,
        &state.palette,
    );
    let title = format!(
        "{} Conference  c switch  +/- adjust",
        state.conference.label()
    );
    let table = build_table(&rendered, state.column)
        .block(Block::default().borders(Borders::ALL).title(title));
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}
