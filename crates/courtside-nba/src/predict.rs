// Season win predictions against a betting line.

use crate::compare::CellValue;
use crate::stats::{Family, StatsBuilder, StatsRange};
use crate::table::TableRow;
use crate::teams::Team;

pub mod keys {
    pub const TEAM: &str = "team";
    pub const LOCAL_NAME: &str = "localName";
    pub const LINE: &str = "line";
    pub const OPTIMISTIC: &str = "optimistic";
    pub const PESSIMISTIC: &str = "pessimistic";
    pub const PREDICTED: &str = "predicted";
    pub const VS_LINE: &str = "vsLine";
}

/// One team's inputs for the predict view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamPrediction {
    pub team: &'static Team,
    pub line: f64,
    pub optimistic: f64,
    pub pessimistic: f64,
}

impl TeamPrediction {
    pub fn new(team: &'static Team) -> Self {
        TeamPrediction {
            team,
            line: 0.0,
            optimistic: 0.0,
            pessimistic: 0.0,
        }
    }

    /// Midpoint of the optimistic and pessimistic predictions.
    pub fn predicted_wins(&self) -> f64 {
        (self.optimistic + self.pessimistic) / 2.0
    }

    /// Positive when the prediction beats the line.
    pub fn vs_line(&self) -> f64 {
        self.predicted_wins() - self.line
    }

    pub fn over_under(&self) -> String {
        over_under_label(self.vs_line())
    }
}

/// `Over +1.5`, `Under -2.0` or `Push 0.0`.
pub fn over_under_label(diff: f64) -> String {
    if diff > 0.0 {
        format!("Over +{diff:.1}")
    } else if diff < 0.0 {
        format!("Under {diff:.1}")
    } else {
        "Push 0.0".to_string()
    }
}

impl TableRow for TeamPrediction {
    fn field(&self, key: &str) -> CellValue {
        match key {
            keys::TEAM => self.team.abbr.into(),
            keys::LOCAL_NAME => self.team.local_name.into(),
            keys::LINE => self.line.into(),
            keys::OPTIMISTIC => self.optimistic.into(),
            keys::PESSIMISTIC => self.pessimistic.into(),
            keys::PREDICTED => self.predicted_wins().into(),
            keys::VS_LINE => self.vs_line().into(),
            _ => CellValue::Empty,
        }
    }
}

/// Ranges for coloring a prediction table.
pub fn prediction_stats<'a>(rows: impl IntoIterator<Item = &'a TeamPrediction>) -> StatsRange {
    let mut b = StatsBuilder::new()
        .column(keys::PREDICTED, Family::Magnitude)
        .column(keys::VS_LINE, Family::Delta);
    for p in rows {
        b.observe(keys::PREDICTED, Some(p.predicted_wins()));
        b.observe(keys::VS_LINE, Some(p.vs_line()));
    }
    b.finish()
}
