use std::path::PathBuf;
use std::time::Duration;

use lsfbeat_state_store::default_snapshot_path;

/// Configuration for [`IngestPipeline`](crate::IngestPipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Records that may wait for the worker before `submit` blocks.
    pub queue_capacity: usize,
    /// How often the state snapshot is rewritten when it has changed.
    pub flush_interval: Duration,
    /// Snapshot file of the job state store.
    pub state_snapshot: PathBuf,
    /// Snapshot file of the property cache. `None` keeps it in memory only.
    pub property_snapshot: Option<PathBuf>,
}

impl PipelineConfig {
    /// Default settings with the state snapshot placed by
    /// [`default_snapshot_path`] (`LSF_BAK_PATH` or the executable's dir).
    pub fn from_env() -> Self {
        Self {
            state_snapshot: default_snapshot_path(),
            ..Self::default()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            flush_interval: Duration::from_secs(1),
            state_snapshot: PathBuf::from(lsfbeat_state_store::SNAPSHOT_FILE_NAME),
            property_snapshot: None,
        }
    }
}
