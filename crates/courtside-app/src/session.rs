// The single writer of application state.
//
// The front end sends `UserCommand`s; the session applies them to its
// `AppData`, schedules a debounced save after every change and pushes the new
// document back as a `UiUpdate`. File reads are awaited inline so a command is
// applied only once its whole input is available.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use courtside_core::text::read_text_file;
use courtside_nba::record::IdGenerator;

use crate::protocol::{UiUpdate, UserCommand};
use crate::saver::DebouncedSaver;
use crate::state::AppData;

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub message: String,
    /// Whether the document changed (and a save was scheduled).
    pub changed: bool,
}

impl Applied {
    fn changed(message: impl Into<String>) -> Self {
        Applied {
            message: message.into(),
            changed: true,
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Applied {
            message: message.into(),
            changed: false,
        }
    }
}

pub struct Session {
    data: AppData,
    saver: DebouncedSaver,
    ids: IdGenerator,
}

impl Session {
    pub fn new(data: AppData, saver: DebouncedSaver) -> Self {
        Session {
            data,
            saver,
            ids: IdGenerator::new(),
        }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn snapshot(&self) -> Arc<AppData> {
        Arc::new(self.data.clone())
    }

    /// Apply one command. On error the document is untouched.
    pub async fn handle_command(&mut self, cmd: UserCommand) -> Result<Applied> {
        let applied = match cmd {
            UserCommand::ImportCsv { path, mode } => {
                let text = read_input(&path).await?;
                let summary = self
                    .data
                    .import_csv(&text, mode, &mut self.ids)
                    .with_context(|| format!("import of {} failed", path.display()))?;
                Applied::changed(format!(
                    "{}: {} players imported, {} total",
                    mode.label(),
                    summary.imported,
                    summary.total
                ))
            }
            UserCommand::ExportCsv { path } => {
                let text = self.data.export_csv()?;
                write_output(&path, text).await?;
                Applied::unchanged(format!(
                    "exported {} players to {}",
                    self.data.players.len(),
                    path.display()
                ))
            }
            UserCommand::Backup { path } => {
                let text = self.data.to_backup_json()?;
                write_output(&path, text).await?;
                Applied::unchanged(format!("backup written to {}", path.display()))
            }
            UserCommand::Restore { path } => {
                let text = read_input(&path).await?;
                let data = AppData::from_backup_json(&text)
                    .with_context(|| format!("{} is not a valid backup", path.display()))?;
                self.data = data;
                Applied::changed(format!(
                    "restored {} players from {}",
                    self.data.players.len(),
                    path.display()
                ))
            }
            UserCommand::Reset => {
                self.data.reset();
                Applied::changed("all data cleared")
            }
            UserCommand::SetPrediction { team, field, value } => {
                self.data.set_prediction(&team, field, value)?;
                Applied::changed(format!("{} {:?} set to {}", team.to_uppercase(), field, value))
            }
            UserCommand::SetCardImage { id, image } => {
                let cleared = image.is_none();
                self.data.set_card_image(&id, image)?;
                Applied::changed(if cleared {
                    format!("card image cleared for {id}")
                } else {
                    format!("card image set for {id}")
                })
            }
            UserCommand::SetTeamImage { team, image } => {
                let cleared = image.is_none();
                self.data.set_team_image(&team, image)?;
                Applied::changed(if cleared {
                    format!("image cleared for {}", team.to_uppercase())
                } else {
                    format!("image set for {}", team.to_uppercase())
                })
            }
            UserCommand::Quit => Applied::unchanged("quit"),
        };

        if applied.changed {
            self.saver.schedule(&self.data);
        }
        Ok(applied)
    }

    /// Write anything pending and stop the saver.
    pub async fn shutdown(self) {
        self.saver.shutdown().await;
    }
}

async fn read_input(path: &Path) -> Result<String> {
    let decoded = read_text_file(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!("read {} as {}", path.display(), decoded.encoding);
    Ok(decoded.text)
}

async fn write_output(path: &Path, text: String) -> Result<()> {
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Run the session loop until `Quit` or until the front end goes away.
///
/// Sends the initial document first, then one `State` plus `Notice` per
/// changing command, or a single `Error` when a command fails.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut session: Session,
) -> Result<()> {
    info!("session loop started");
    let _ = ui_tx.send(UiUpdate::State(session.snapshot())).await;

    loop {
        match cmd_rx.recv().await {
            Some(UserCommand::Quit) => {
                info!("quit command received, shutting down");
                break;
            }
            Some(cmd) => match session.handle_command(cmd).await {
                Ok(applied) => {
                    info!("{}", applied.message);
                    if applied.changed {
                        let _ = ui_tx.send(UiUpdate::State(session.snapshot())).await;
                    }
                    let _ = ui_tx.send(UiUpdate::Notice(applied.message)).await;
                }
                Err(e) => {
                    warn!("command failed: {:#}", e);
                    let _ = ui_tx.send(UiUpdate::Error(format!("{:#}", e))).await;
                }
            },
            None => {
                info!("command channel closed, shutting down");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
