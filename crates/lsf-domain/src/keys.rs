//! Field name constants for scheduler records and state-change messages.

/// Event type names with a fixed lifecycle meaning.
pub mod event_types {
    pub const JOB_NEW: &str = "JOB_NEW";
    pub const JOB_START_ACCEPT: &str = "JOB_START_ACCEPT";
    pub const JOB_STATUS: &str = "JOB_STATUS";
}

pub mod fields {
    pub const EVENT_TYPE: &str = "event_type";
    pub const CLUSTER: &str = "cluster";
    pub const JOB_ID: &str = "job_id";
    pub const JOB_INDEX: &str = "job_arr_idx";
    pub const JOB_STATUS: &str = "job_status";
    pub const EXIT_STATUS: &str = "exit_status";
    pub const EXIT_INFO: &str = "exit_info";

    // State-change message fields
    pub const LAST_STATUS: &str = "last_status";
    pub const CURRENT_STATUS: &str = "current_status";
    pub const CHANGE_REASON: &str = "change_reason";
}

/// Descriptive fields captured from a job-creation event and attached to
/// every later state-change message for that job.
pub const PROPERTY_FIELDS: [&str; 7] = [
    "user_name",
    "queue_name",
    "job_name",
    "project_name",
    "user_group_name",
    "job_group",
    "app_profile",
];
