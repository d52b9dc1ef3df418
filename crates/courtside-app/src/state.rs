// The persisted/backup document and every mutation applied to it.
//
// `AppData` is plain data. Each operation either succeeds completely or
// returns an error with the document untouched.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use courtside_core::ImportMode;
use courtside_nba::csv_codec::CodecError;
use courtside_nba::predict::TeamPrediction;
use courtside_nba::record::{self, IdGenerator, MapError, PlayerRecord};
use courtside_nba::teams::{self, Team};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StateError {
    #[error("import failed: {0}")]
    Import(#[from] MapError),

    #[error("backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backup must be a JSON object")]
    NotAnObject,

    #[error("CSV export failed: {0}")]
    Export(#[from] CodecError),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("no player with id {0}")]
    UnknownPlayer(String),
}

// ---------------------------------------------------------------------------
// AppData
// ---------------------------------------------------------------------------

/// Everything the application persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub team_images: BTreeMap<String, Option<String>>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub predict_wins: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub predict_line: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub predict_opt: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub predict_pes: BTreeMap<String, f64>,
}

/// Prediction inputs, one map each in `AppData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictField {
    Wins,
    Line,
    Optimistic,
    Pessimistic,
}

impl PredictField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wins" => Some(PredictField::Wins),
            "line" => Some(PredictField::Line),
            "opt" | "optimistic" => Some(PredictField::Optimistic),
            "pes" | "pessimistic" => Some(PredictField::Pessimistic),
            _ => None,
        }
    }
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub imported: usize,
    pub total: usize,
}

/// Number maps tolerate nulls and numeric strings; anything else is 0.
fn lenient_numbers<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| {
            let n = match v {
                serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
                serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
                _ => 0.0,
            };
            (k, if n.is_finite() { n } else { 0.0 })
        })
        .collect())
}

impl Default for AppData {
    fn default() -> Self {
        let mut data = AppData {
            players: Vec::new(),
            team_images: BTreeMap::new(),
            predict_wins: BTreeMap::new(),
            predict_line: BTreeMap::new(),
            predict_opt: BTreeMap::new(),
            predict_pes: BTreeMap::new(),
        };
        data.fill_team_defaults();
        data
    }
}

impl AppData {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Make sure every team has an entry in each per-team map. Existing
    /// entries, including ones for unknown teams, are kept.
    fn fill_team_defaults(&mut self) {
        for abbr in teams::abbreviations() {
            self.team_images.entry(abbr.to_string()).or_insert(None);
            for map in [
                &mut self.predict_wins,
                &mut self.predict_line,
                &mut self.predict_opt,
                &mut self.predict_pes,
            ] {
                map.entry(abbr.to_string()).or_insert(0.0);
            }
        }
    }

    /// Give every player a unique, non-empty id and an uppercase team.
    /// Returns how many ids were reassigned.
    fn repair_players(&mut self) -> usize {
        let mut ids = IdGenerator::new();
        ids.reserve(self.players.iter().map(|p| p.id.as_str()).filter(|id| !id.is_empty()));

        let mut seen = HashSet::new();
        let mut repaired = 0;
        for p in &mut self.players {
            if p.id.is_empty() || !seen.insert(p.id.clone()) {
                p.id = ids.next_id();
                seen.insert(p.id.clone());
                repaired += 1;
            }
            let team = p.team.trim().to_uppercase();
            if team != p.team {
                p.team = team;
            }
        }
        if repaired > 0 {
            warn!("reassigned {} missing or duplicate player ids", repaired);
        }
        repaired
    }

    /// Build from a JSON value (backup file or stored state). Missing keys
    /// take defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self, StateError> {
        if !value.is_object() {
            return Err(StateError::NotAnObject);
        }
        let mut data: AppData = serde_json::from_value(value)?;
        data.fill_team_defaults();
        data.repair_players();
        Ok(data)
    }

    /// Parse a JSON backup.
    pub fn from_backup_json(text: &str) -> Result<Self, StateError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let data = Self::from_value(value)?;
        info!("restored backup with {} players", data.players.len());
        Ok(data)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, StateError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Pretty-printed JSON backup.
    pub fn to_backup_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Players as CSV in canonical column order.
    pub fn export_csv(&self) -> Result<String, StateError> {
        Ok(record::export_csv(&self.players)?)
    }

    /// Import CSV text. On error the player list is unchanged.
    pub fn import_csv(
        &mut self,
        text: &str,
        mode: ImportMode,
        ids: &mut IdGenerator,
    ) -> Result<ImportSummary, StateError> {
        ids.reserve(self.players.iter().map(|p| p.id.as_str()));
        let records = record::records_from_csv(text, ids)?;
        let imported = records.len();
        match mode {
            ImportMode::Replace => self.players = records,
            ImportMode::Append => self.players.extend(records),
        }
        info!(
            "{} import: {} players imported, {} total",
            mode.label(),
            imported,
            self.players.len()
        );
        Ok(ImportSummary {
            mode,
            imported,
            total: self.players.len(),
        })
    }

    /// Back to the empty default document.
    pub fn reset(&mut self) {
        *self = AppData::default();
        info!("state reset to defaults");
    }

    fn known_team(abbr: &str) -> Result<&'static Team, StateError> {
        teams::find(abbr).ok_or_else(|| StateError::UnknownTeam(abbr.trim().to_string()))
    }

    pub fn set_prediction(
        &mut self,
        team: &str,
        field: PredictField,
        value: f64,
    ) -> Result<(), StateError> {
        let team = Self::known_team(team)?;
        let value = if value.is_finite() { value } else { 0.0 };
        let map = match field {
            PredictField::Wins => &mut self.predict_wins,
            PredictField::Line => &mut self.predict_line,
            PredictField::Optimistic => &mut self.predict_opt,
            PredictField::Pessimistic => &mut self.predict_pes,
        };
        map.insert(team.abbr.to_string(), value);
        Ok(())
    }

    pub fn set_team_image(&mut self, team: &str, image: Option<String>) -> Result<(), StateError> {
        let team = Self::known_team(team)?;
        self.team_images.insert(team.abbr.to_string(), image);
        Ok(())
    }

    pub fn set_card_image(&mut self, player_id: &str, image: Option<String>) -> Result<(), StateError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| StateError::UnknownPlayer(player_id.to_string()))?;
        player.card_image = image;
        Ok(())
    }

    pub fn player(&self, id: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn team_players<'a>(&'a self, abbr: &'a str) -> impl Iterator<Item = &'a PlayerRecord> + 'a {
        self.players.iter().filter(move |p| p.team == abbr)
    }

    pub fn prediction(&self, team: &'static Team) -> TeamPrediction {
        let get = |m: &BTreeMap<String, f64>| m.get(team.abbr).copied().unwrap_or(0.0);
        TeamPrediction {
            team,
            line: get(&self.predict_line),
            optimistic: get(&self.predict_opt),
            pessimistic: get(&self.predict_pes),
        }
    }

    /// Prediction rows for a list of teams (e.g. one conference).
    pub fn predictions(&self, teams: &[&'static Team]) -> Vec<TeamPrediction> {
        teams.iter().map(|t| self.prediction(*t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Rank,PLAYER,TEAM,POS,POS',Rating,PrevRating,Delta,Real,Est,Diff\n\
1,A,ATL,G,,9.5,8.5,1.0,1000000,1200000,200000\n\
2,\"B, Jr.\",BOS,F,C,8,8.2,-0.2,2000000,1500000,-500000";

    fn ids(prefix: &str) -> IdGenerator {
        IdGenerator::with_prefix(prefix)
    }

    #[test]
    fn default_has_all_teams() {
        let data = AppData::default();
        assert!(data.is_empty());
        assert_eq!(data.team_images.len(), 30);
        assert_eq!(data.predict_line.len(), 30);
        assert_eq!(data.predict_pes["UTA"], 0.0);
        assert_eq!(data.team_images["ATL"], None);
    }

    #[test]
    fn replace_then_append() {
        let mut data = AppData::default();
        let s = data.import_csv(CSV, ImportMode::Replace, &mut ids("a")).unwrap();
        assert_eq!((s.imported, s.total), (2, 2));

        let s = data.import_csv(CSV, ImportMode::Append, &mut ids("a")).unwrap();
        assert_eq!((s.imported, s.total), (2, 4));

        let unique: HashSet<_> = data.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unique.len(), 4);

        let s = data.import_csv(CSV, ImportMode::Replace, &mut ids("b")).unwrap();
        assert_eq!(s.total, 2);
        assert!(data.players.iter().all(|p| p.id.starts_with("b_")));
    }

    #[test]
    fn failed_import_leaves_state_unchanged() {
        let mut data = AppData::default();
        data.import_csv(CSV, ImportMode::Replace, &mut ids("a")).unwrap();
        let before = data.clone();

        let err = data
            .import_csv("PLAYER,TEAM\n", ImportMode::Replace, &mut ids("x"))
            .unwrap_err();
        assert!(matches!(err, StateError::Import(MapError::NoRows)));
        assert_eq!(data, before);

        assert!(data.import_csv("", ImportMode::Append, &mut ids("x")).is_err());
        assert_eq!(data, before);
    }

    #[test]
    fn backup_round_trip() {
        let mut data = AppData::default();
        data.import_csv(CSV, ImportMode::Replace, &mut ids("a")).unwrap();
        data.set_prediction("bos", PredictField::Line, 55.5).unwrap();
        data.set_team_image("LAL", Some("depth/lal.png".into())).unwrap();

        let json = data.to_backup_json().unwrap();
        assert!(json.contains("\n  \"players\""));
        let restored = AppData::from_backup_json(&json).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn restore_merges_defaults_and_legacy_keys() {
        let json = r#"{
            "players": [
                {"id": "p1", "PLAYER": "A", "TEAM": "atl", "評分": 7, "真實薪水": 10, "評估薪水": 30}
            ],
            "predictLine": {"BOS": 50.5, "LAL": null, "MIA": "41"}
        }"#;
        let data = AppData::from_backup_json(json).unwrap();
        assert_eq!(data.players[0].team, "ATL");
        assert_eq!(data.players[0].salary_difference(), 20);
        assert_eq!(data.predict_line["BOS"], 50.5);
        assert_eq!(data.predict_line["LAL"], 0.0);
        assert_eq!(data.predict_line["MIA"], 41.0);
        assert_eq!(data.predict_opt.len(), 30);
        assert_eq!(data.team_images.len(), 30);
    }

    #[test]
    fn restore_accepts_fractional_and_text_numbers() {
        let json = r#"{
            "players": [
                {"id": "p1", "PLAYER": "A", "TEAM": "BOS", "Rank": 2.0, "評分": "8.5",
                 "真實薪水": 1234.5, "評估薪水": "$3,000", "差額": "1765.5", "上季評分": null}
            ]
        }"#;
        let data = AppData::from_backup_json(json).unwrap();
        let p = &data.players[0];
        assert_eq!(p.rank, Some(2));
        assert_eq!(p.rating, 8.5);
        assert_eq!(p.actual_salary, 1235);
        assert_eq!(p.estimated_salary, 3000);
        assert_eq!(p.imported_difference, Some(1766));
        assert_eq!(p.previous_rating, None);
        assert_eq!(p.salary_difference(), 1765);
    }

    #[test]
    fn restore_repairs_ids() {
        let json = r#"{"players": [
            {"id": "dup", "name": "A"},
            {"id": "dup", "name": "B"},
            {"name": "C"}
        ]}"#;
        let data = AppData::from_backup_json(json).unwrap();
        assert_eq!(data.players[0].id, "dup");
        let unique: HashSet<_> = data.players.iter().map(|p| p.id.clone()).collect();
        assert_eq!(unique.len(), 3);
        assert!(data.players.iter().all(|p| !p.id.is_empty()));
    }

    #[test]
    fn bad_backups_are_errors() {
        assert!(matches!(
            AppData::from_backup_json("{not json"),
            Err(StateError::Json(_))
        ));
        assert!(matches!(
            AppData::from_backup_json("[1, 2]"),
            Err(StateError::NotAnObject)
        ));
    }

    #[test]
    fn export_uses_computed_difference() {
        let mut data = AppData::default();
        data.import_csv(CSV, ImportMode::Replace, &mut ids("a")).unwrap();
        data.players[0].estimated_salary = 0;
        let csv = data.export_csv().unwrap();
        let first = csv.lines().nth(1).unwrap();
        assert!(first.ends_with(",1000000,0,-1000000"), "{first}");
    }

    #[test]
    fn reset_clears_everything() {
        let mut data = AppData::default();
        data.import_csv(CSV, ImportMode::Replace, &mut ids("a")).unwrap();
        data.set_prediction("ATL", PredictField::Optimistic, 40.0).unwrap();
        data.reset();
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn predictions_read_maps() {
        let mut data = AppData::default();
        data.set_prediction("DEN", PredictField::Line, 50.0).unwrap();
        data.set_prediction("DEN", PredictField::Optimistic, 56.0).unwrap();
        data.set_prediction("DEN", PredictField::Pessimistic, 48.0).unwrap();
        let p = data.prediction(teams::find("DEN").unwrap());
        assert_eq!(p.predicted_wins(), 52.0);
        assert_eq!(p.over_under(), "Over +2.0");

        let west = data.predictions(&teams::west());
        assert_eq!(west.len(), 15);
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let mut data = AppData::default();
        assert!(matches!(
            data.set_prediction("SEA", PredictField::Line, 1.0),
            Err(StateError::UnknownTeam(_))
        ));
        assert!(matches!(
            data.set_card_image("nope", None),
            Err(StateError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn card_image_targets_by_id() {
        let mut data = AppData::default();
        data.import_csv(CSV, ImportMode::Replace, &mut ids("a")).unwrap();
        data.set_card_image("a_2", Some("cards/b.png".into())).unwrap();
        assert_eq!(data.player("a_2").unwrap().card_image.as_deref(), Some("cards/b.png"));
        assert_eq!(data.player("a_1").unwrap().card_image, None);
        assert_eq!(data.team_players("BOS").count(), 1);
    }

    #[test]
    fn predict_field_parse() {
        assert_eq!(PredictField::parse("opt"), Some(PredictField::Optimistic));
        assert_eq!(PredictField::parse(" LINE "), Some(PredictField::Line));
        assert_eq!(PredictField::parse("x"), None);
    }
}
