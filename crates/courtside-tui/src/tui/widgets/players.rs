// Players tab: the full sortable, colored player table.

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, TableState};
use ratatui::Frame;

use crate::tui::ViewState;

use super::build_table;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = state.filtered_players();
    let title = build_title(state, rows.len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if state.data.players.is_empty() {
        let hint = Paragraph::new("No players yet. Load a CSV with :import <path>").block(block);
        frame.render_widget(hint, area);
        return;
    }

    let rendered = state.tables.players.render(
        rows.iter().copied(),
        &state.players_sort,
        &state.stats,
        &state.palette,
    );
    let table = build_table(&rendered, state.column).block(block);
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn build_title(state: &ViewState, shown: usize) -> Line<'static> {
    let mut title = String::from("Players");
    if !state.filter_text.is_empty() {
        title.push_str(&format!(" \"{}\"", state.filter_text));
    }
    title.push_str(&format!(" ({}/{})", shown, state.data.players.len()));
    Line::from(title)
}
