use std::sync::Arc;

use lsfbeat_domain::{OutgoingMessage, Topic};
use lsfbeat_state_store::{FlushTarget, JobStateStore, PropertyCache, SnapshotFlusher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::detector::TransitionDetector;
use crate::error::PipelineError;
use crate::parser::{FileType, RecordParser};
use crate::processor::RecordProcessor;

/// One queued record and where to send its messages.
struct Submission {
    raw: String,
    file_type: FileType,
    topics: Vec<Topic>,
    reply: oneshot::Sender<Vec<OutgoingMessage>>,
}

/// Cloneable submitter for a running pipeline.
#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<Submission>,
}

impl PipelineHandle {
    /// Queue a raw record and wait for the messages it produces. Waits for
    /// queue space when the worker is behind.
    ///
    /// # Errors
    /// Returns `PipelineError::Closed` once the pipeline is stopping.
    pub async fn submit(
        &self,
        raw: impl Into<String>,
        file_type: FileType,
        topics: Vec<Topic>,
    ) -> Result<Vec<OutgoingMessage>, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Submission {
                raw: raw.into(),
                file_type,
                topics,
                reply,
            })
            .await
            .map_err(|_| PipelineError::Closed)?;
        rx.await.map_err(|_| PipelineError::ReplyDropped)
    }
}

/// Owns the state store, property cache, snapshot flusher and the single
/// worker that processes records in submission order.
pub struct IngestPipeline {
    handle: PipelineHandle,
    token: CancellationToken,
    worker: JoinHandle<()>,
    flusher: SnapshotFlusher,
    states: Arc<JobStateStore>,
    properties: Arc<PropertyCache>,
}

impl IngestPipeline {
    /// Load snapshots, then spawn the flusher and the worker on the current
    /// tokio runtime. Snapshot files are read on the blocking pool.
    pub async fn start(config: PipelineConfig, parser: Arc<dyn RecordParser>) -> Self {
        let state_path = config.state_snapshot.clone();
        let states = Arc::new(
            tokio::task::spawn_blocking(move || JobStateStore::open(&state_path))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "state snapshot load failed, starting empty");
                    JobStateStore::new()
                }),
        );
        let properties = Arc::new(match config.property_snapshot.clone() {
            Some(path) => tokio::task::spawn_blocking(move || PropertyCache::open(&path))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "property snapshot load failed, starting empty");
                    PropertyCache::new()
                }),
            None => PropertyCache::new(),
        });

        let mut targets = vec![FlushTarget::new(
            "job-states",
            states.clone(),
            config.state_snapshot.clone(),
        )];
        if let Some(path) = &config.property_snapshot {
            targets.push(FlushTarget::new(
                "job-properties",
                properties.clone(),
                path.clone(),
            ));
        }
        let flusher = SnapshotFlusher::spawn(targets, config.flush_interval);

        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let token = CancellationToken::new();
        let processor = Arc::new(RecordProcessor::new(
            parser,
            TransitionDetector::new(states.clone(), properties.clone()),
        ));
        let worker = tokio::spawn(run_worker(rx, processor, token.clone()));

        tracing::info!(
            queue_capacity = config.queue_capacity,
            tracked_jobs = states.len(),
            "ingest pipeline started"
        );

        Self {
            handle: PipelineHandle { tx },
            token,
            worker,
            flusher,
            states,
            properties,
        }
    }

    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    /// See [`PipelineHandle::submit`].
    ///
    /// # Errors
    /// Returns `PipelineError::Closed` once the pipeline is stopping.
    pub async fn submit(
        &self,
        raw: impl Into<String>,
        file_type: FileType,
        topics: Vec<Topic>,
    ) -> Result<Vec<OutgoingMessage>, PipelineError> {
        self.handle.submit(raw, file_type, topics).await
    }

    pub fn states(&self) -> &Arc<JobStateStore> {
        &self.states
    }

    pub fn properties(&self) -> &Arc<PropertyCache> {
        &self.properties
    }

    /// Refuse new records, finish every queued one, then stop the flusher,
    /// which writes a final snapshot.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.worker.await {
            tracing::warn!(error = %e, "pipeline worker failed");
        }
        self.flusher.stop().await;
        tracing::info!(tracked_jobs = self.states.len(), "ingest pipeline stopped");
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Submission>,
    processor: Arc<RecordProcessor>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            submission = rx.recv() => match submission {
                Some(submission) => handle_submission(&processor, submission).await,
                None => break,
            },
            () = token.cancelled() => {
                // Close first so blocked submitters fail instead of waiting.
                rx.close();
                while let Some(submission) = rx.recv().await {
                    handle_submission(&processor, submission).await;
                }
                break;
            }
        }
    }
}

/// Parse and project one record on the blocking pool. The parser may be a
/// slow native call. One record is in flight at a time.
async fn handle_submission(processor: &Arc<RecordProcessor>, submission: Submission) {
    let Submission {
        raw,
        file_type,
        topics,
        reply,
    } = submission;
    tracing::debug!(file_type = %file_type, raw = %raw, "processing record");

    let processor = Arc::clone(processor);
    let result =
        tokio::task::spawn_blocking(move || processor.process(&raw, file_type, &topics)).await;
    let messages = match result {
        Ok(messages) => messages,
        Err(e) => {
            // Dropping the reply surfaces as `ReplyDropped` to the submitter.
            tracing::warn!(file_type = %file_type, error = %e, "record processing failed");
            return;
        }
    };
    if reply.send(messages).is_err() {
        tracing::debug!("submitter went away before reply");
    }
}
