// TUI widgets, plus the shared conversion from a rendered table to a
// ratatui `Table`.

pub mod detail;
pub mod help_bar;
pub mod players;
pub mod predict;
pub mod status_bar;
pub mod team_view;

use ratatui::layout::Constraint;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Row, Table};

use courtside_nba::color::Rgb;
use courtside_nba::table::RenderedTable;
use courtside_nba::CellColor;

/// Terminal background the RGBA cell colors are blended over.
pub const BACKGROUND: Rgb = Rgb::new(24, 24, 27);

const MAX_COLUMN_WIDTH: u16 = 28;

/// Style for a colored cell; transparent cells keep the default style.
pub fn cell_style(color: &CellColor) -> Style {
    match color {
        CellColor::Transparent => Style::default(),
        CellColor::Rgba(..) => {
            let Rgb { r, g, b } = color.blend_over(BACKGROUND);
            Style::default().bg(Color::Rgb(r, g, b)).fg(Color::White)
        }
    }
}

/// Header label with the sort arrow of the active column.
pub fn header_label(label: &str, sorted: Option<bool>) -> String {
    match sorted {
        Some(true) => format!("{label} ▲"),
        Some(false) => format!("{label} ▼"),
        None => label.to_string(),
    }
}

fn text_width(text: &str) -> u16 {
    u16::try_from(Span::raw(text).width()).unwrap_or(u16::MAX)
}

/// Build a ratatui table from rendered rows. The header under the column
/// cursor is reversed.
pub fn build_table<T>(rendered: &RenderedTable<'_, T>, column_cursor: usize) -> Table<'static> {
    let labels: Vec<String> = rendered
        .headers
        .iter()
        .map(|h| header_label(&h.label, h.sorted))
        .collect();

    let widths: Vec<Constraint> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let widest = rendered
                .rows
                .iter()
                .map(|r| r.cells.get(i).map_or(0, |c| text_width(&c.text)))
                .max()
                .unwrap_or(0);
            Constraint::Length(widest.max(text_width(label)).min(MAX_COLUMN_WIDTH))
        })
        .collect();

    let header = Row::new(labels.into_iter().enumerate().map(|(i, label)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if i == column_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Cell::from(label).style(style)
    }));

    let rows: Vec<Row<'static>> = rendered
        .rows
        .iter()
        .map(|row| {
            Row::new(
                row.cells
                    .iter()
                    .map(|c| Cell::from(c.text.clone()).style(cell_style(&c.color))),
            )
        })
        .collect();

    Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .highlight_symbol("> ")
}
