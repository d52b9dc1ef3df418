// Player records and the CSV <-> record mapping.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::csv_codec;
use crate::headers::{HeaderMap, PlayerField};
use crate::money::{parse_amount, whole_amount};

// ---------------------------------------------------------------------------
// Column keys
// ---------------------------------------------------------------------------

/// Stable keys used by column specs, statistics and field lookups.
pub mod keys {
    pub const ID: &str = "id";
    pub const RANK: &str = "rank";
    pub const NAME: &str = "name";
    pub const TEAM: &str = "team";
    pub const POSITION: &str = "position";
    pub const SECONDARY_POSITION: &str = "secondaryPosition";
    pub const RATING: &str = "rating";
    pub const PREVIOUS_RATING: &str = "previousRating";
    pub const RATING_DELTA: &str = "ratingDelta";
    pub const ACTUAL_SALARY: &str = "actualSalary";
    pub const ESTIMATED_SALARY: &str = "estimatedSalary";
    pub const SALARY_DIFFERENCE: &str = "salaryDifference";
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// One player row. Serialized with camelCase keys; the legacy keys of older
/// backups are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "Rank", deserialize_with = "loose_rank")]
    pub rank: Option<i64>,
    #[serde(default, alias = "PLAYER")]
    pub name: String,
    #[serde(default, alias = "TEAM")]
    pub team: String,
    #[serde(default, alias = "POS")]
    pub position: String,
    #[serde(default, alias = "POS2")]
    pub secondary_position: String,
    #[serde(default, alias = "評分", deserialize_with = "loose_number")]
    pub rating: f64,
    #[serde(default, alias = "上季評分", deserialize_with = "loose_optional_number")]
    pub previous_rating: Option<f64>,
    #[serde(default, alias = "本季增減", deserialize_with = "loose_optional_number")]
    pub rating_delta: Option<f64>,
    #[serde(default, alias = "真實薪水", deserialize_with = "loose_amount")]
    pub actual_salary: i64,
    #[serde(default, alias = "評估薪水", deserialize_with = "loose_amount")]
    pub estimated_salary: i64,
    /// Difference column as supplied by the source file. Kept for reference
    /// only; `salary_difference()` is what gets displayed and exported.
    #[serde(
        default,
        alias = "差額",
        alias = "salaryDifference",
        deserialize_with = "loose_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub imported_difference: Option<i64>,
    #[serde(default)]
    pub card_image: Option<String>,
}

impl PlayerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: &str) -> Self {
        PlayerRecord {
            id: id.into(),
            rank: None,
            name: name.into(),
            team: team.trim().to_uppercase(),
            position: String::new(),
            secondary_position: String::new(),
            rating: 0.0,
            previous_rating: None,
            rating_delta: None,
            actual_salary: 0,
            estimated_salary: 0,
            imported_difference: None,
            card_image: None,
        }
    }

    /// `estimated_salary - actual_salary`, always recomputed. Saturates
    /// rather than overflowing on amounts set directly on the struct.
    pub fn salary_difference(&self) -> i64 {
        self.estimated_salary.saturating_sub(self.actual_salary)
    }

    /// "G / F" style label combining both positions.
    pub fn position_label(&self) -> String {
        if self.secondary_position.is_empty() {
            self.position.clone()
        } else {
            format!("{} / {}", self.position, self.secondary_position)
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient JSON numbers
// ---------------------------------------------------------------------------

// Older backups hold fractional amounts, numeric strings and nulls in the
// numeric fields. Numbers and strings go through `parse_amount`; anything
// else reads as unset.

fn loose_value(value: serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(|v| parse_amount(&v)),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(parse_amount(s.as_str())),
        _ => None,
    }
}

fn loose_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_value(serde_json::Value::deserialize(deserializer)?).unwrap_or(0.0))
}

fn loose_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_value(serde_json::Value::deserialize(deserializer)?))
}

fn loose_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_value(serde_json::Value::deserialize(deserializer)?).map_or(0, whole_amount))
}

fn loose_optional_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_value(serde_json::Value::deserialize(deserializer)?).map(whole_amount))
}

fn loose_rank<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_value(serde_json::Value::deserialize(deserializer)?).map(|v| v.trunc() as i64))
}

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// Hands out record ids of the form `p_YYYYMMDDHHMMSS_N`, skipping any id
/// already in use.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
    taken: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        let prefix = chrono::Utc::now().format("p_%Y%m%d%H%M%S").to_string();
        Self::with_prefix(prefix)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        IdGenerator {
            prefix: prefix.into(),
            next: 1,
            taken: HashSet::new(),
        }
    }

    /// Mark ids that already exist so they are never handed out again.
    pub fn reserve<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.taken.extend(ids.into_iter().map(str::to_string));
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id = format!("{}_{}", self.prefix, self.next);
            self.next += 1;
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// CSV -> records
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("CSV contains no rows")]
    Empty,

    #[error("CSV has a header but no usable player rows")]
    NoRows,
}

fn is_blank(cell: Option<&str>) -> bool {
    cell.map_or(true, |c| c.trim().is_empty())
}

/// Plain numeric parse: blank or invalid text is 0.
fn number_or_zero(cell: Option<&str>) -> f64 {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Unset when the column is absent or the cell blank, 0 when unparseable.
fn optional_number(cell: Option<&str>) -> Option<f64> {
    if is_blank(cell) {
        None
    } else {
        Some(number_or_zero(cell))
    }
}

fn amount(cell: Option<&str>) -> i64 {
    cell.map_or(0, |c| whole_amount(parse_amount(c)))
}

/// Map a header row and data rows to player records.
///
/// Missing columns degrade per field; rows whose cells are all blank are
/// skipped. Every record gets a fresh id from `ids`.
pub fn map_rows<S: AsRef<str>>(
    header: &[S],
    data_rows: &[Vec<S>],
    ids: &mut IdGenerator,
) -> Vec<PlayerRecord> {
    let map = HeaderMap::resolve(header);
    let missing = map.missing();
    if !missing.is_empty() {
        debug!("CSV header lacks columns: {:?}", missing);
    }

    let mut records = Vec::with_capacity(data_rows.len());
    let mut skipped = 0usize;
    for row in data_rows {
        if row.iter().all(|c| c.as_ref().trim().is_empty()) {
            skipped += 1;
            continue;
        }
        let cell = |f: PlayerField| map.cell(row.as_slice(), f);

        let rank = map
            .index(PlayerField::Rank)
            .and_then(|_| optional_number(cell(PlayerField::Rank)))
            .map(|v| v.trunc() as i64);

        let imported_difference = if is_blank(cell(PlayerField::Difference)) {
            None
        } else {
            Some(amount(cell(PlayerField::Difference)))
        };

        records.push(PlayerRecord {
            id: ids.next_id(),
            rank,
            name: cell(PlayerField::Name).unwrap_or_default().trim().to_string(),
            team: cell(PlayerField::Team)
                .unwrap_or_default()
                .trim()
                .to_uppercase(),
            position: cell(PlayerField::Position).unwrap_or_default().trim().to_string(),
            secondary_position: cell(PlayerField::SecondaryPosition)
                .unwrap_or_default()
                .trim()
                .to_string(),
            rating: number_or_zero(cell(PlayerField::Rating)),
            previous_rating: optional_number(cell(PlayerField::PreviousRating)),
            rating_delta: optional_number(cell(PlayerField::RatingDelta)),
            actual_salary: amount(cell(PlayerField::ActualSalary)),
            estimated_salary: amount(cell(PlayerField::EstimatedSalary)),
            imported_difference,
            card_image: None,
        });
    }

    if skipped > 0 {
        debug!("skipped {} blank CSV rows", skipped);
    }
    for r in &records {
        if let Some(supplied) = r.imported_difference {
            if supplied != r.salary_difference() {
                warn!(
                    "'{}': supplied difference {} ignored, recomputed {}",
                    r.name,
                    supplied,
                    r.salary_difference()
                );
            }
        }
    }
    records
}

/// Parse CSV text and map it to records in one step.
pub fn records_from_csv(text: &str, ids: &mut IdGenerator) -> Result<Vec<PlayerRecord>, MapError> {
    let mut rows = csv_codec::parse(text);
    if rows.is_empty() {
        return Err(MapError::Empty);
    }
    let header = rows.remove(0);
    let records = map_rows(&header, &rows, ids);
    if records.is_empty() {
        return Err(MapError::NoRows);
    }
    info!("mapped {} player records from CSV", records.len());
    Ok(records)
}

// ---------------------------------------------------------------------------
// records -> CSV
// ---------------------------------------------------------------------------

/// Export header, in canonical order.
pub const CANONICAL_HEADER: [&str; 11] = [
    "Rank",
    "PLAYER",
    "TEAM",
    "POS",
    "POS'",
    "Rating",
    "PreviousRating",
    "RatingDelta",
    "ActualSalary",
    "EstimatedSalary",
    "Difference",
];

fn fmt_number(n: f64) -> String {
    format!("{n}")
}

/// Records as CSV cells in canonical column order. The difference column is
/// always recomputed.
pub fn to_csv(records: &[PlayerRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.rank.map(|v| v.to_string()).unwrap_or_default(),
                r.name.clone(),
                r.team.clone(),
                r.position.clone(),
                r.secondary_position.clone(),
                fmt_number(r.rating),
                r.previous_rating.map(fmt_number).unwrap_or_default(),
                r.rating_delta.map(fmt_number).unwrap_or_default(),
                r.actual_salary.to_string(),
                r.estimated_salary.to_string(),
                r.salary_difference().to_string(),
            ]
        })
        .collect()
}

/// Full CSV export text.
pub fn export_csv(records: &[PlayerRecord]) -> Result<String, csv_codec::CodecError> {
    csv_codec::serialize(&CANONICAL_HEADER, &to_csv(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "Rank,PLAYER,TEAM,POS,POS',Rating,PrevRating,Delta,Real,Est,Diff\n\
1,A,ATL,G,,9.5,8.5,1.0,1000000,1200000,200000\n\
2,\"B, Jr.\",BOS,F,C,8,8.2,-0.2,2000000,1500000,-500000";

    fn ids() -> IdGenerator {
        IdGenerator::with_prefix("t")
    }

    #[test]
    fn scenario_maps_two_records() {
        let records = records_from_csv(SCENARIO, &mut ids()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "B, Jr.");
        assert_eq!(records[0].salary_difference(), 200_000);
        assert_eq!(records[1].salary_difference(), -500_000);
        assert_eq!(records[1].rating_delta, Some(-0.2));
        assert_eq!(records[1].secondary_position, "C");
        assert_eq!(records[0].secondary_position, "");
        assert_eq!(records[0].rank, Some(1));
        assert_eq!(records[0].previous_rating, Some(8.5));
    }

    #[test]
    fn ids_are_unique_and_prefixed() {
        let records = records_from_csv(SCENARIO, &mut ids()).unwrap();
        assert_eq!(records[0].id, "t_1");
        assert_eq!(records[1].id, "t_2");
    }

    #[test]
    fn id_generator_skips_reserved() {
        let mut gen = ids();
        gen.reserve(["t_1", "t_3"]);
        assert_eq!(gen.next_id(), "t_2");
        assert_eq!(gen.next_id(), "t_4");
    }

    #[test]
    fn team_is_uppercased() {
        let records = records_from_csv("player,team\nA, lal \n", &mut ids()).unwrap();
        assert_eq!(records[0].team, "LAL");
    }

    #[test]
    fn supplied_difference_is_not_trusted() {
        let csv = "name,actual salary,estimated salary,diff\nA,100,300,999\n";
        let records = records_from_csv(csv, &mut ids()).unwrap();
        assert_eq!(records[0].imported_difference, Some(999));
        assert_eq!(records[0].salary_difference(), 200);
        assert_eq!(to_csv(&records)[0][10], "200");
    }

    #[test]
    fn missing_columns_degrade_per_field() {
        let records = records_from_csv("球員,評分\nA,7.5\n", &mut ids()).unwrap();
        let r = &records[0];
        assert_eq!(r.name, "A");
        assert_eq!(r.rating, 7.5);
        assert_eq!(r.rank, None);
        assert_eq!(r.team, "");
        assert_eq!(r.previous_rating, None);
        assert_eq!(r.rating_delta, None);
        assert_eq!(r.actual_salary, 0);
        assert_eq!(r.imported_difference, None);
    }

    #[test]
    fn unparseable_cells_become_zero() {
        let csv = "name,rating,prevrating,actualsalary\nA,great,??,lots\n";
        let r = &records_from_csv(csv, &mut ids()).unwrap()[0];
        assert_eq!(r.rating, 0.0);
        assert_eq!(r.previous_rating, Some(0.0));
        assert_eq!(r.actual_salary, 0);
    }

    #[test]
    fn blank_optional_cells_stay_unset() {
        let csv = "name,rank,prevrating,delta\nA,,,\n";
        let r = &records_from_csv(csv, &mut ids()).unwrap()[0];
        assert_eq!(r.rank, None);
        assert_eq!(r.previous_rating, None);
        assert_eq!(r.rating_delta, None);
    }

    #[test]
    fn salaries_accept_currency_text() {
        let csv = "name,real,est\nA,\"US$1,234\",(1000)\n";
        let r = &records_from_csv(csv, &mut ids()).unwrap()[0];
        assert_eq!(r.actual_salary, 1234);
        assert_eq!(r.estimated_salary, -1000);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let csv = "name,team\nA,ATL\n , \n,,\nB,BOS\n";
        let records = records_from_csv(csv, &mut ids()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "B");
    }

    #[test]
    fn empty_and_header_only_are_errors() {
        assert_eq!(records_from_csv("", &mut ids()), Err(MapError::Empty));
        assert_eq!(
            records_from_csv("name,team\n", &mut ids()),
            Err(MapError::NoRows)
        );
        assert_eq!(
            records_from_csv("name,team\n,\n", &mut ids()),
            Err(MapError::NoRows)
        );
    }

    #[test]
    fn canonical_header_matches_field_labels() {
        for (label, field) in CANONICAL_HEADER.iter().zip(PlayerField::ALL) {
            assert_eq!(*label, field.canonical_label());
        }
    }

    #[test]
    fn export_header_is_canonical() {
        let text = export_csv(&[]).unwrap();
        assert_eq!(
            text.trim_end(),
            "Rank,PLAYER,TEAM,POS,POS',Rating,PreviousRating,RatingDelta,ActualSalary,EstimatedSalary,Difference"
        );
    }

    #[test]
    fn export_then_import_round_trips() {
        let original = records_from_csv(SCENARIO, &mut ids()).unwrap();
        let text = export_csv(&original).unwrap();
        let again = records_from_csv(&text, &mut IdGenerator::with_prefix("u")).unwrap();
        assert_eq!(again.len(), original.len());
        for (a, b) in original.iter().zip(&again) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.team, b.team);
            assert_eq!(a.rank, b.rank);
            assert_eq!(a.rating, b.rating);
            assert_eq!(a.previous_rating, b.previous_rating);
            assert_eq!(a.rating_delta, b.rating_delta);
            assert_eq!(a.actual_salary, b.actual_salary);
            assert_eq!(a.estimated_salary, b.estimated_salary);
            assert_eq!(b.salary_difference(), b.estimated_salary - b.actual_salary);
        }
    }

    #[test]
    fn legacy_json_keys_are_accepted() {
        let json = r#"{
            "id": "x1", "Rank": 3, "PLAYER": "C", "TEAM": "MIA", "POS": "G", "POS2": "",
            "評分": 7.1, "上季評分": 6.9, "本季增減": 0.2,
            "真實薪水": 500, "評估薪水": 800, "差額": 300, "cardImage": null
        }"#;
        let r: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.rank, Some(3));
        assert_eq!(r.name, "C");
        assert_eq!(r.rating, 7.1);
        assert_eq!(r.rating_delta, Some(0.2));
        assert_eq!(r.imported_difference, Some(300));
        assert_eq!(r.salary_difference(), 300);
    }

    #[test]
    fn extreme_amounts_are_clamped() {
        let csv = "name,real,est\nA,-99999999999999999999,99999999999999999999\n";
        let r = &records_from_csv(csv, &mut ids()).unwrap()[0];
        assert_eq!(r.actual_salary, -crate::money::MAX_WHOLE_AMOUNT);
        assert_eq!(r.estimated_salary, crate::money::MAX_WHOLE_AMOUNT);
        assert_eq!(r.salary_difference(), 2 * crate::money::MAX_WHOLE_AMOUNT);
    }

    #[test]
    fn difference_saturates_on_raw_extremes() {
        let mut r = PlayerRecord::new("id", "A", "ATL");
        r.actual_salary = i64::MIN;
        r.estimated_salary = i64::MAX;
        assert_eq!(r.salary_difference(), i64::MAX);
    }

    #[test]
    fn legacy_json_tolerates_fractions_strings_and_nulls() {
        let json = r#"{
            "id": "x1", "Rank": "4", "PLAYER": "C", "評分": "7.5", "上季評分": null,
            "本季增減": "bad", "真實薪水": 1234.5, "評估薪水": "US$2,000",
            "差額": null
        }"#;
        let r: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.rank, Some(4));
        assert_eq!(r.rating, 7.5);
        assert_eq!(r.previous_rating, None);
        assert_eq!(r.rating_delta, Some(0.0));
        assert_eq!(r.actual_salary, 1235);
        assert_eq!(r.estimated_salary, 2000);
        assert_eq!(r.imported_difference, None);
        assert_eq!(r.salary_difference(), 765);
    }

    #[test]
    fn json_uses_camel_case() {
        let mut r = PlayerRecord::new("id1", "A", "atl");
        r.previous_rating = Some(5.0);
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["team"], "ATL");
        assert_eq!(value["previousRating"], 5.0);
        assert!(value.get("importedDifference").is_none());
    }

    #[test]
    fn position_label_joins_secondary() {
        let mut r = PlayerRecord::new("id", "A", "ATL");
        r.position = "G".into();
        assert_eq!(r.position_label(), "G");
        r.secondary_position = "F".into();
        assert_eq!(r.position_label(), "G / F");
    }
}
