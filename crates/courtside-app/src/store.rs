// Where `AppData` lives between runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{debug, info};

use courtside_core::db::Database;

use crate::state::AppData;

/// Load/save collaborator for the persisted document and the one-shot
/// preset flag.
pub trait StateStore: Send + Sync {
    /// The stored document, or `None` on first run.
    fn load(&self) -> Result<Option<AppData>>;
    fn save(&self, data: &AppData) -> Result<()>;
    fn preset_applied(&self) -> Result<bool>;
    fn mark_preset_applied(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// Stores the document as one JSON value in the `app_state` table.
pub struct SqliteStateStore {
    db: Arc<Database>,
    key: String,
    preset_key: String,
}

impl SqliteStateStore {
    pub fn new(db: Arc<Database>, key: impl Into<String>) -> Self {
        let key = key.into();
        let preset_key = format!("{key}.preset_loaded");
        SqliteStateStore {
            db,
            key,
            preset_key,
        }
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> Result<Option<AppData>> {
        let Some(value) = self.db.load_state(&self.key)? else {
            info!("no stored state under {}", self.key);
            return Ok(None);
        };
        let data = AppData::from_value(value)
            .with_context(|| format!("stored state under {} is unreadable", self.key))?;
        info!("loaded stored state: {} players", data.players.len());
        Ok(Some(data))
    }

    fn save(&self, data: &AppData) -> Result<()> {
        let value = data.to_value().context("failed to serialize state")?;
        self.db.save_state(&self.key, &value)?;
        debug!("state saved: {} players", data.players.len());
        Ok(())
    }

    fn preset_applied(&self) -> Result<bool> {
        Ok(self
            .db
            .load_state(&self.preset_key)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn mark_preset_applied(&self) -> Result<()> {
        self.db
            .save_state(&self.preset_key, &serde_json::Value::Bool(true))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps everything in memory and counts saves.
#[derive(Default)]
pub struct MemoryStateStore {
    data: Mutex<Option<AppData>>,
    preset: Mutex<bool>,
    saves: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: AppData) -> Self {
        let store = Self::default();
        *store.data.lock().expect("store mutex poisoned") = Some(data);
        store
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last saved (or seeded) document.
    pub fn snapshot(&self) -> Option<AppData> {
        self.data.lock().expect("store mutex poisoned").clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<AppData>> {
        Ok(self.snapshot())
    }

    fn save(&self, data: &AppData) -> Result<()> {
        *self.data.lock().expect("store mutex poisoned") = Some(data.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn preset_applied(&self) -> Result<bool> {
        Ok(*self.preset.lock().expect("store mutex poisoned"))
    }

    fn mark_preset_applied(&self) -> Result<()> {
        *self.preset.lock().expect("store mutex poisoned") = true;
        Ok(())
    }
}
