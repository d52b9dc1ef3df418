// Player detail popup.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use courtside_nba::color::scale;
use courtside_nba::money::format_amount;
use courtside_nba::record::keys;
use courtside_nba::teams;
use courtside_nba::{ColorMode, PlayerRecord};

use crate::tui::ViewState;

use super::cell_style;

fn optional(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

/// The detail lines for one player. The difference is colored the same way
/// as in the tables.
pub fn detail_lines(player: &PlayerRecord, state: &ViewState) -> Vec<Line<'static>> {
    let label = |s: &str| Span::styled(format!("{s:<16}"), Style::default().fg(Color::Gray));
    let team = teams::find(&player.team)
        .map(|t| format!("{} ({})", t.name, t.abbr))
        .unwrap_or_else(|| player.team.clone());
    let difference = player.salary_difference();
    let diff_color = scale(
        Some(difference as f64),
        state.stats.range(keys::SALARY_DIFFERENCE),
        ColorMode::Diverging,
        &state.palette,
    );

    vec![
        Line::from(Span::styled(
            player.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![label("Team"), Span::raw(team)]),
        Line::from(vec![label("Position"), Span::raw(player.position_label())]),
        Line::from(vec![
            label("Rank"),
            Span::raw(player.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into())),
        ]),
        Line::from(vec![label("Rating"), Span::raw(format!("{:.1}", player.rating))]),
        Line::from(vec![label("Previous"), Span::raw(optional(player.previous_rating))]),
        Line::from(vec![label("Change"), Span::raw(optional(player.rating_delta))]),
        Line::from(vec![
            label("Actual salary"),
            Span::raw(format_amount(Some(player.actual_salary as f64))),
        ]),
        Line::from(vec![
            label("Estimated"),
            Span::raw(format_amount(Some(player.estimated_salary as f64))),
        ]),
        Line::from(vec![
            label("Difference"),
            Span::styled(format_amount(Some(difference as f64)), cell_style(&diff_color)),
        ]),
        Line::from(vec![
            label("Card image"),
            Span::raw(player.card_image.clone().unwrap_or_else(|| "-".into())),
        ]),
        Line::from(vec![label("Id"), Span::raw(player.id.clone())]),
    ]
}

pub fn render(frame: &mut Frame, area: Rect, player: &PlayerRecord, state: &ViewState) {
    let paragraph = Paragraph::new(detail_lines(player, state))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Player  Esc close"),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}
