use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::store::Persist;

/// A map and the file it is flushed to.
#[derive(Clone)]
pub struct FlushTarget {
    pub name: String,
    pub store: Arc<dyn Persist>,
    pub path: PathBuf,
}

impl FlushTarget {
    pub fn new(name: impl Into<String>, store: Arc<dyn Persist>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            store,
            path: path.into(),
        }
    }
}

/// Periodic snapshot task. Each tick rewrites the snapshot of every target
/// mutated since the previous tick; stopping performs one unconditional
/// flush of every target before the task exits.
pub struct SnapshotFlusher {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl SnapshotFlusher {
    /// Spawn the flush loop on the current tokio runtime.
    pub fn spawn(targets: Vec<FlushTarget>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_flush_loop(targets, interval, token.clone()));
        tracing::info!(interval = ?interval, "snapshot flusher started");
        Self { token, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the timer and wait for the final flush to complete.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "snapshot flusher task failed");
        }
        tracing::info!("snapshot flusher stopped");
    }
}

async fn run_flush_loop(targets: Vec<FlushTarget>, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing has changed yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for target in &targets {
                    flush_if_dirty(target).await;
                }
            }
            () = token.cancelled() => break,
        }
    }

    for target in &targets {
        flush(target).await;
    }
}

async fn flush_if_dirty(target: &FlushTarget) {
    if !target.store.is_dirty() {
        tracing::debug!(target_name = %target.name, "snapshot unchanged");
        return;
    }
    target.store.clear_dirty();
    flush(target).await;
}

/// Write one snapshot off the async worker threads. Failures are logged and
/// leave the previous file in place.
async fn flush(target: &FlushTarget) {
    let store = target.store.clone();
    let path = target.path.clone();
    match tokio::task::spawn_blocking(move || store.snapshot_to(&path)).await {
        Ok(Ok(())) => {
            tracing::info!(
                target_name = %target.name,
                path = %target.path.display(),
                "snapshot flushed"
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(target_name = %target.name, error = %e, "snapshot flush failed");
        }
        Err(e) => {
            tracing::warn!(target_name = %target.name, error = %e, "snapshot flush task failed");
        }
    }
}
