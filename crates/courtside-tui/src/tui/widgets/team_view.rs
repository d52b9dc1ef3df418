// Teams tab: one team's roster as either the ratings or the salary table.
//
// Colors are scaled against the full player population, so a team view is
// comparable to the Players tab.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, TableState};
use ratatui::Frame;

use courtside_nba::money::format_amount;
use courtside_nba::teams::Team;

use crate::tui::{TeamView, ViewState};

use super::build_table;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let team = state.current_team();
    frame.render_widget(team_header(state, team), sections[0]);

    let (spec, sort) = state.team_table();
    let rendered = spec.render(
        state.data.team_players(team.abbr),
        sort,
        &state.stats,
        &state.palette,
    );
    let title = match state.team_view {
        TeamView::Ratings => "Ratings",
        TeamView::Salary => "Salary",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({})", title, rendered.len()));

    if rendered.is_empty() {
        frame.render_widget(Paragraph::new("No players on this team.").block(block), sections[1]);
        return;
    }
    let table = build_table(&rendered, state.column).block(block);
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, sections[1], &mut table_state);
}

fn team_header(state: &ViewState, team: &'static Team) -> Paragraph<'static> {
    let payroll: i64 = state
        .data
        .team_players(team.abbr)
        .fold(0i64, |total, p| total.saturating_add(p.actual_salary));
    let image = state
        .data
        .team_images
        .get(team.abbr)
        .cloned()
        .flatten()
        .unwrap_or_else(|| "no image".to_string());

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", team.abbr),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{}  {}  ", team.name, team.local_name)),
        Span::styled(
            format!("{} | payroll {} | {}", team.conference.label(), format_amount(Some(payroll as f64)), image),
            Style::default().fg(Color::Gray),
        ),
    ]);
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Team  [ ] switch  t view"))
}
