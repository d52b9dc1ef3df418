// Per-column min/max over a full record set.
//
// Ranges are always computed over every record, never over a filtered view,
// so colors stay comparable while the user narrows the table.

use std::collections::BTreeMap;

use crate::record::{keys, PlayerRecord};

/// Closed numeric interval observed for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Fallback for a magnitude column with no observations.
    pub const MAGNITUDE_EMPTY: Range = Range { min: 0.0, max: 1.0 };
    /// Fallback for a delta column with no observations.
    pub const DELTA_EMPTY: Range = Range { min: -1.0, max: 1.0 };
}

/// Which family a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Magnitude,
    Delta,
}

/// Column-key -> range, split into magnitude and delta families.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsRange {
    pub magnitude: BTreeMap<&'static str, Range>,
    pub delta: BTreeMap<&'static str, Range>,
}

impl StatsRange {
    /// Range for `key`. Unknown keys get the magnitude sentinel.
    pub fn range(&self, key: &str) -> Range {
        self.delta
            .get(key)
            .or_else(|| self.magnitude.get(key))
            .copied()
            .unwrap_or(Range::MAGNITUDE_EMPTY)
    }
}

/// Accumulates min/max per column in one pass.
#[derive(Debug, Default)]
pub struct StatsBuilder {
    acc: Vec<(&'static str, Family, Option<Range>)>,
}

impl StatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column so it appears in the result even if it never sees a
    /// value.
    pub fn column(mut self, key: &'static str, family: Family) -> Self {
        if !self.acc.iter().any(|(k, _, _)| *k == key) {
            self.acc.push((key, family, None));
        }
        self
    }

    /// Record one value. Unset and non-finite values are ignored, as are
    /// keys that were never registered.
    pub fn observe(&mut self, key: &str, value: Option<f64>) {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return;
        };
        if let Some((_, _, slot)) = self.acc.iter_mut().find(|(k, _, _)| *k == key) {
            *slot = Some(match *slot {
                Some(r) => Range {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
                None => Range { min: v, max: v },
            });
        }
    }

    pub fn finish(self) -> StatsRange {
        let mut out = StatsRange::default();
        for (key, family, observed) in self.acc {
            match family {
                Family::Magnitude => {
                    out.magnitude
                        .insert(key, observed.unwrap_or(Range::MAGNITUDE_EMPTY));
                }
                Family::Delta => {
                    out.delta.insert(key, observed.unwrap_or(Range::DELTA_EMPTY));
                }
            }
        }
        out
    }
}

const MAGNITUDE_KEYS: [&str; 4] = [
    keys::RATING,
    keys::PREVIOUS_RATING,
    keys::ACTUAL_SALARY,
    keys::ESTIMATED_SALARY,
];
const DELTA_KEYS: [&str; 2] = [keys::RATING_DELTA, keys::SALARY_DIFFERENCE];

/// Ranges for the player table.
pub fn compute_stats(records: &[PlayerRecord]) -> StatsRange {
    let mut builder = MAGNITUDE_KEYS
        .iter()
        .fold(StatsBuilder::new(), |b, k| b.column(*k, Family::Magnitude));
    builder = DELTA_KEYS
        .iter()
        .fold(builder, |b, k| b.column(*k, Family::Delta));

    for r in records {
        builder.observe(keys::RATING, Some(r.rating));
        builder.observe(keys::PREVIOUS_RATING, r.previous_rating);
        builder.observe(keys::ACTUAL_SALARY, Some(r.actual_salary as f64));
        builder.observe(keys::ESTIMATED_SALARY, Some(r.estimated_salary as f64));
        builder.observe(keys::RATING_DELTA, r.rating_delta);
        builder.observe(keys::SALARY_DIFFERENCE, Some(r.salary_difference() as f64));
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(rating: f64, act: i64, est: i64, delta: Option<f64>) -> PlayerRecord {
        let mut p = PlayerRecord::new("id", "P", "ATL");
        p.rating = rating;
        p.actual_salary = act;
        p.estimated_salary = est;
        p.rating_delta = delta;
        p
    }

    #[test]
    fn empty_input_uses_sentinels() {
        let stats = compute_stats(&[]);
        for key in MAGNITUDE_KEYS {
            assert_eq!(stats.magnitude[key], Range::MAGNITUDE_EMPTY, "{key}");
        }
        for key in DELTA_KEYS {
            assert_eq!(stats.delta[key], Range::DELTA_EMPTY, "{key}");
        }
    }

    #[test]
    fn min_max_over_all_records() {
        let stats = compute_stats(&[
            player(9.5, 1_000_000, 1_200_000, Some(1.0)),
            player(8.0, 2_000_000, 1_500_000, Some(-0.2)),
        ]);
        assert_eq!(stats.range(keys::RATING), Range { min: 8.0, max: 9.5 });
        assert_eq!(
            stats.range(keys::SALARY_DIFFERENCE),
            Range {
                min: -500_000.0,
                max: 200_000.0
            }
        );
        assert_eq!(stats.range(keys::RATING_DELTA), Range { min: -0.2, max: 1.0 });
    }

    #[test]
    fn unset_values_are_skipped() {
        let stats = compute_stats(&[player(5.0, 0, 0, None)]);
        assert_eq!(stats.range(keys::PREVIOUS_RATING), Range::MAGNITUDE_EMPTY);
        assert_eq!(stats.range(keys::RATING_DELTA), Range::DELTA_EMPTY);
        assert_eq!(stats.range(keys::RATING), Range { min: 5.0, max: 5.0 });
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let mut b = StatsBuilder::new().column("x", Family::Magnitude);
        b.observe("x", Some(f64::NAN));
        b.observe("x", Some(f64::INFINITY));
        b.observe("x", Some(3.0));
        b.observe("unregistered", Some(1.0));
        let stats = b.finish();
        assert_eq!(stats.range("x"), Range { min: 3.0, max: 3.0 });
        assert!(!stats.magnitude.contains_key("unregistered"));
    }

    #[test]
    fn extreme_csv_amounts_do_not_overflow() {
        let records = crate::record::records_from_csv(
            "name,real,est\nA,-99999999999999999999,99999999999999999999\nB,0,0\n",
            &mut crate::record::IdGenerator::with_prefix("x"),
        )
        .unwrap();
        let stats = compute_stats(&records);
        let max = crate::money::MAX_WHOLE_AMOUNT as f64;
        assert_eq!(stats.range(keys::ACTUAL_SALARY), Range { min: -max, max: 0.0 });
        assert_eq!(
            stats.range(keys::SALARY_DIFFERENCE),
            Range { min: 0.0, max: 2.0 * max }
        );
    }

    #[test]
    fn unknown_key_falls_back_to_magnitude_sentinel() {
        assert_eq!(StatsRange::default().range("nope"), Range::MAGNITUDE_EMPTY);
    }
}
