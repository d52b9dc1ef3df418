// Column presets for the player, team and prediction tables.

use crate::color::ColorMode;
use crate::compare::CellValue;
use crate::money::format_amount;
use crate::predict::{self, TeamPrediction};
use crate::record::{keys, PlayerRecord};
use crate::table::{ColumnSpec, SortState, SortType, TableError, TableRow, TableSpec};

impl TableRow for PlayerRecord {
    fn field(&self, key: &str) -> CellValue {
        match key {
            keys::ID => self.id.as_str().into(),
            keys::RANK => self.rank.into(),
            keys::NAME => self.name.as_str().into(),
            keys::TEAM => self.team.as_str().into(),
            keys::POSITION => self.position.as_str().into(),
            keys::SECONDARY_POSITION => self.secondary_position.as_str().into(),
            keys::RATING => self.rating.into(),
            keys::PREVIOUS_RATING => self.previous_rating.into(),
            keys::RATING_DELTA => self.rating_delta.into(),
            keys::ACTUAL_SALARY => self.actual_salary.into(),
            keys::ESTIMATED_SALARY => self.estimated_salary.into(),
            keys::SALARY_DIFFERENCE => self.salary_difference().into(),
            _ => CellValue::Empty,
        }
    }
}

fn money(v: &CellValue) -> String {
    format_amount(v.as_number())
}

fn one_decimal(v: &CellValue) -> String {
    v.as_number().map(|n| format!("{n:.1}")).unwrap_or_default()
}

fn position_label(p: &PlayerRecord, _: &CellValue) -> String {
    p.position_label()
}

fn rank() -> ColumnSpec<PlayerRecord> {
    ColumnSpec::new(keys::RANK, "Rank", SortType::Numeric)
}

fn name() -> ColumnSpec<PlayerRecord> {
    ColumnSpec::new(keys::NAME, "PLAYER", SortType::Lexical)
}

fn rating() -> ColumnSpec<PlayerRecord> {
    ColumnSpec::new(keys::RATING, "Rating", SortType::Numeric).color(ColorMode::Monotonic)
}

fn previous_rating() -> ColumnSpec<PlayerRecord> {
    ColumnSpec::new(keys::PREVIOUS_RATING, "Prev", SortType::Numeric).color(ColorMode::Monotonic)
}

fn rating_delta() -> ColumnSpec<PlayerRecord> {
    ColumnSpec::new(keys::RATING_DELTA, "Delta", SortType::Numeric).color(ColorMode::Diverging)
}

fn salary_columns() -> [ColumnSpec<PlayerRecord>; 3] {
    [
        ColumnSpec::new(keys::ACTUAL_SALARY, "Actual", SortType::Numeric)
            .color(ColorMode::Monotonic)
            .fmt(money),
        ColumnSpec::new(keys::ESTIMATED_SALARY, "Estimated", SortType::Numeric)
            .color(ColorMode::Monotonic)
            .fmt(money),
        ColumnSpec::new(keys::SALARY_DIFFERENCE, "Diff", SortType::Numeric)
            .compute(|p: &PlayerRecord| p.salary_difference().into())
            .color(ColorMode::Diverging)
            .fmt(money),
    ]
}

fn default_player_sort() -> SortState {
    SortState::new(keys::RATING, false)
}

/// The full player table, sorted by rating, best first.
pub fn player_table() -> Result<TableSpec<PlayerRecord>, TableError> {
    let mut cols = vec![
        rank(),
        name(),
        ColumnSpec::new(keys::TEAM, "TEAM", SortType::Lexical),
        ColumnSpec::new(keys::POSITION, "POS", SortType::Lexical),
        ColumnSpec::new(keys::SECONDARY_POSITION, "POS'", SortType::Lexical),
        rating(),
        previous_rating(),
        rating_delta(),
    ];
    cols.extend(salary_columns());
    TableSpec::new(cols, default_player_sort())
}

/// Ratings of one team's players.
pub fn team_ratings_table() -> Result<TableSpec<PlayerRecord>, TableError> {
    TableSpec::new(
        vec![
            rank(),
            name(),
            ColumnSpec::new(keys::POSITION, "POS", SortType::Lexical).render(position_label),
            rating(),
            previous_rating(),
            rating_delta(),
        ],
        default_player_sort(),
    )
}

/// Salary view of one team's players.
pub fn team_salary_table() -> Result<TableSpec<PlayerRecord>, TableError> {
    let mut cols = vec![
        rank(),
        name(),
        ColumnSpec::new(keys::POSITION, "POS", SortType::Lexical).render(position_label),
        rating(),
    ];
    cols.extend(salary_columns());
    TableSpec::new(cols, default_player_sort())
}

/// One conference's predictions, most predicted wins first.
pub fn predict_table() -> Result<TableSpec<TeamPrediction>, TableError> {
    TableSpec::new(
        vec![
            ColumnSpec::new(predict::keys::TEAM, "Team", SortType::Lexical),
            ColumnSpec::new(predict::keys::LOCAL_NAME, "Name", SortType::None),
            ColumnSpec::new(predict::keys::LINE, "Line", SortType::Numeric).fmt(one_decimal),
            ColumnSpec::new(predict::keys::OPTIMISTIC, "Optimistic", SortType::None)
                .fmt(one_decimal),
            ColumnSpec::new(predict::keys::PESSIMISTIC, "Pessimistic", SortType::None)
                .fmt(one_decimal),
            ColumnSpec::new(predict::keys::PREDICTED, "Predicted", SortType::Numeric)
                .color(ColorMode::Monotonic)
                .fmt(one_decimal),
            ColumnSpec::new(predict::keys::VS_LINE, "Over/Under", SortType::Numeric)
                .color(ColorMode::Diverging)
                .render(|p: &TeamPrediction, _| p.over_under()),
        ],
        SortState::new(predict::keys::PREDICTED, false),
    )
}
