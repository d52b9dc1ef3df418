// Messages between the front end and the session task.

use std::path::PathBuf;
use std::sync::Arc;

use courtside_core::ImportMode;

use crate::state::{AppData, PredictField};

/// Commands sent from the front end to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Read a CSV file and merge it into the player list.
    ImportCsv { path: PathBuf, mode: ImportMode },
    /// Write the player list as CSV.
    ExportCsv { path: PathBuf },
    /// Write the whole document as pretty JSON.
    Backup { path: PathBuf },
    /// Replace the whole document with a JSON backup.
    Restore { path: PathBuf },
    /// Back to an empty document.
    Reset,
    SetPrediction {
        team: String,
        field: PredictField,
        value: f64,
    },
    SetCardImage { id: String, image: Option<String> },
    SetTeamImage { team: String, image: Option<String> },
    Quit,
}

/// Updates pushed from the session to the front end.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// The document after a change (and once at startup).
    State(Arc<AppData>),
    /// One-line success notice for the status bar.
    Notice(String),
    /// One-line failure notice; the document is unchanged.
    Error(String),
}
