// Debounced persistence.
//
// Every change schedules a snapshot; the background task writes only after
// the stream of snapshots has been quiet for the configured delay. Only the
// newest snapshot is ever written.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::AppData;
use crate::store::StateStore;

/// Default quiet period before a write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

enum SaveRequest {
    Snapshot(Box<AppData>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background save task.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SaveRequest>,
    handle: JoinHandle<()>,
}

impl DebouncedSaver {
    /// Spawn the save task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn StateStore>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, delay, rx));
        DebouncedSaver { tx, handle }
    }

    /// Queue a snapshot, restarting the quiet period.
    pub fn schedule(&self, data: &AppData) {
        if self.tx.send(SaveRequest::Snapshot(Box::new(data.clone()))).is_err() {
            warn!("save task is gone; snapshot dropped");
        }
    }

    /// Write any pending snapshot now and wait for it.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SaveRequest::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flush and stop the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!("save task ended abnormally: {}", e);
        }
    }
}

fn write(store: &dyn StateStore, data: &AppData) {
    match store.save(data) {
        Ok(()) => debug!("persisted {} players", data.players.len()),
        Err(e) => warn!("failed to persist state: {:#}", e),
    }
}

async fn run(
    store: Arc<dyn StateStore>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
) {
    let mut pending: Option<Box<AppData>> = None;
    loop {
        let request = if pending.is_some() {
            // A fresh sleep each iteration: any new request restarts the
            // quiet period.
            tokio::select! {
                req = rx.recv() => req,
                _ = tokio::time::sleep(delay) => {
                    if let Some(data) = pending.take() {
                        write(store.as_ref(), &data);
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match request {
            Some(SaveRequest::Snapshot(data)) => pending = Some(data),
            Some(SaveRequest::Flush(ack)) => {
                if let Some(data) = pending.take() {
                    write(store.as_ref(), &data);
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(data) = pending.take() {
                    write(store.as_ref(), &data);
                }
                info!("save task stopped");
                break;
            }
        }
    }
}
