use crate::event::ParsedEvent;
use crate::keys::fields;

/// `(cluster, job id, array index)` triple identifying one job instance.
///
/// Missing fields fall back to `""` / `-1`; the resulting identity is
/// degenerate but still usable as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobIdentity {
    pub cluster: String,
    pub job_id: i64,
    pub job_index: i64,
}

impl JobIdentity {
    pub fn from_event(event: &ParsedEvent) -> Self {
        Self {
            cluster: event.get_str(fields::CLUSTER),
            job_id: event.get_int(fields::JOB_ID),
            job_index: event.get_int(fields::JOB_INDEX),
        }
    }

    /// Store key: `{cluster}_{job_id}_{job_index}`
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.cluster, self.job_id, self.job_index)
    }
}
