// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database and load the stored document
// 4. Seed from the preset when nothing is stored yet
// 5. Create mpsc channels, spawn the session task
// 6. Run the TUI until the user quits
// 7. Wait for the session to flush pending saves

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use courtside_app::preset;
use courtside_app::saver::DebouncedSaver;
use courtside_app::session::{self, Session};
use courtside_app::{AppData, SqliteStateStore, StateStore};
use courtside_core::config;
use courtside_core::db::Database;
use courtside_nba::Palette;
use courtside_tui::tui::{self, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Courtside starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: state key {}, debounce {}ms",
        config.storage.state_key, config.persistence.debounce_ms
    );

    let db_path = config.resolved_db_path();
    let db = Database::open_path(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path.display());

    let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(
        Arc::new(db),
        config.storage.state_key.clone(),
    ));

    let mut data = match store.load() {
        Ok(Some(data)) => data,
        Ok(None) => AppData::default(),
        Err(e) => {
            // An unreadable document is kept on disk; start empty.
            warn!("Stored state unreadable, starting empty: {:#}", e);
            AppData::default()
        }
    };

    if let Some(source) = preset::source_from_config(&config.preset.source) {
        if let Some(seeded) = preset::bootstrap(store.as_ref(), &data, source.as_ref()).await {
            data = seeded;
        }
    }
    info!("Starting with {} players", data.players.len());

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let saver = DebouncedSaver::spawn(
        store.clone(),
        Duration::from_millis(config.persistence.debounce_ms),
    );
    let session_handle = tokio::spawn(async move {
        if let Err(e) = session::run(cmd_rx, ui_tx, Session::new(data, saver)).await {
            error!("Session loop error: {:#}", e);
        }
    });

    let view_state = ViewState::new(Palette::from_config(&config.colors), config.import.default_mode)
        .context("invalid table definition")?;

    if let Err(e) = tui::run(ui_rx, cmd_tx, view_state).await {
        error!("TUI error: {:#}", e);
    }

    // Dropping cmd_tx (moved into tui::run) ends the session loop, which
    // flushes the saver before returning.
    if tokio::time::timeout(Duration::from_secs(5), session_handle)
        .await
        .is_err()
    {
        warn!("Session did not shut down within 5s; pending changes may be lost");
    }

    info!("Courtside shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("courtside=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
