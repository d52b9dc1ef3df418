// Configuration loading and parsing (config/courtside.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mode::ImportMode;

/// Name of the single configuration file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "courtside.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// courtside.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub preset: PresetConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite file path. Empty means "use the platform data directory".
    #[serde(default)]
    pub db_path: String,
    /// Key under which the whole application state blob is stored.
    pub state_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Idle delay before a batch of state changes is written.
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig { debounce_ms: 200 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresetConfig {
    /// File path or http(s) URL of the preset bootstrap document.
    /// Empty disables the bootstrap.
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorConfig {
    pub positive: String,
    pub negative: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            positive: "#09734E".into(),
            negative: "#7D2C2D".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub default_mode: ImportMode,
}

impl Config {
    /// Resolve the database path: the configured one, or `courtside.db` in
    /// the platform data directory when left empty.
    pub fn resolved_db_path(&self) -> PathBuf {
        if !self.storage.db_path.trim().is_empty() {
            return PathBuf::from(self.storage.db_path.trim());
        }
        match directories::ProjectDirs::from("", "", "courtside") {
            Some(dirs) => dirs.data_dir().join("courtside.db"),
            None => PathBuf::from("courtside.db"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/courtside.toml` relative to
/// `base_dir`. Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration text without validating it.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Built-in copy of `defaults/courtside.toml`, used when the binary runs
/// outside a checkout.
pub const DEFAULT_CONFIG: &str = include_str!("../../../defaults/courtside.toml");

/// Make sure `config/courtside.toml` exists, seeding it from
/// `defaults/courtside.toml` or, failing that, from `DEFAULT_CONFIG`.
/// An existing file is never touched. Returns the path written, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let shipped = base_dir.join("defaults").join(CONFIG_FILE);
    let text = if shipped.is_file() {
        let text = read_file(&shipped)?;
        // A broken defaults file is reported against its own path instead of
        // being copied into config/.
        let parsed = parse_config(&text).map_err(|e| ConfigError::ParseError {
            path: shipped.clone(),
            source: e,
        })?;
        validate(&parsed)?;
        text
    } else {
        DEFAULT_CONFIG.to_string()
    };

    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, text.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Load config relative to the current working directory, seeding
/// `config/courtside.toml` first when it is missing.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(path) = ensure_config_file(&cwd)? {
        tracing::info!("Created {}", path.display());
    }
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Parse `#RRGGBB` (or `RRGGBB`, or the short `#RGB`) into its components.
pub fn parse_hex_rgb(input: &str) -> Option<(u8, u8, u8)> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.storage.state_key.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "storage.state_key".into(),
            message: "must not be empty".into(),
        });
    }

    let debounce = config.persistence.debounce_ms;
    if debounce > 10_000 {
        return Err(ConfigError::ValidationError {
            field: "persistence.debounce_ms".into(),
            message: format!("must be at most 10000, got {debounce}"),
        });
    }

    let colors: &[(&str, &str)] = &[
        ("colors.positive", &config.colors.positive),
        ("colors.negative", &config.colors.negative),
    ];
    for (name, value) in colors {
        if parse_hex_rgb(value).is_none() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("expected a hex color like #09734E, got {value:?}"),
            });
        }
    }

    let source = config.preset.source.trim();
    if source.starts_with("ftp://") || source.starts_with("file://") {
        return Err(ConfigError::ValidationError {
            field: "preset.source".into(),
            message: "must be a plain file path or an http(s) URL".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
