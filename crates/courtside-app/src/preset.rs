// One-shot seeding of an empty installation from a preset document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use courtside_core::text::read_text_file;

use crate::state::AppData;
use crate::store::StateStore;

/// Somewhere a preset JSON document can be fetched from.
#[async_trait]
pub trait PresetSource: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;
    /// The full document text.
    async fn fetch(&self) -> Result<String>;
}

/// A preset on the local filesystem.
pub struct FilePreset {
    path: PathBuf,
}

impl FilePreset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FilePreset { path: path.into() }
    }
}

#[async_trait]
impl PresetSource for FilePreset {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        let decoded = read_text_file(&self.path)
            .await
            .with_context(|| format!("failed to read preset {}", self.path.display()))?;
        Ok(decoded.text)
    }
}

/// A preset served over HTTP(S).
pub struct HttpPreset {
    url: String,
    client: reqwest::Client,
}

impl HttpPreset {
    pub fn new(url: impl Into<String>) -> Self {
        HttpPreset {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PresetSource for HttpPreset {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .with_context(|| format!("failed to request preset {}", self.url))?
            .error_for_status()
            .with_context(|| format!("preset {} returned an error status", self.url))?;
        response
            .text()
            .await
            .with_context(|| format!("failed to read preset body from {}", self.url))
    }
}

/// Pick a source for a configured location. Empty means no preset.
pub fn source_from_config(location: &str) -> Option<Box<dyn PresetSource>> {
    let location = location.trim();
    if location.is_empty() {
        None
    } else if location.starts_with("http://") || location.starts_with("https://") {
        Some(Box::new(HttpPreset::new(location)))
    } else {
        Some(Box::new(FilePreset::new(location)))
    }
}

async fn load_preset(source: &dyn PresetSource) -> Result<AppData> {
    let text = source.fetch().await?;
    let data = AppData::from_backup_json(&text)
        .with_context(|| format!("preset {} is not a valid backup", source.describe()))?;
    Ok(data)
}

/// Seed `current` from the preset when nothing has been loaded yet.
///
/// Runs only if `current` has no players and the preset has never been
/// applied. Returns the seeded document, or `None` when skipped or when the
/// preset could not be loaded (logged, never raised).
pub async fn bootstrap(
    store: &dyn StateStore,
    current: &AppData,
    source: &dyn PresetSource,
) -> Option<AppData> {
    match store.preset_applied() {
        Ok(true) => return None,
        Ok(false) => {}
        Err(e) => {
            warn!("could not read preset flag, skipping preset: {:#}", e);
            return None;
        }
    }
    if !current.is_empty() {
        return None;
    }

    let data = match load_preset(source).await {
        Ok(data) => data,
        Err(e) => {
            warn!("preset load skipped: {:#}", e);
            return None;
        }
    };

    if let Err(e) = store.save(&data) {
        warn!("failed to persist preset: {:#}", e);
        return None;
    }
    if let Err(e) = store.mark_preset_applied() {
        warn!("failed to record preset flag: {:#}", e);
    }
    info!(
        "preset loaded from {}: {} players",
        source.describe(),
        data.players.len()
    );
    Some(data)
}
