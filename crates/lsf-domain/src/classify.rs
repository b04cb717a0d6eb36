//! Maps scheduler events to canonical lifecycle states.

use crate::event::ParsedEvent;
use crate::keys::{event_types, fields};
use crate::state::LifecycleState;

/// Termination reasons indexed by the record's `exit_info` code.
pub const EXIT_REASONS: [&str; 32] = [
    "job exited, reason unknown TERM_UNKNOWN",
    "job killed after preemption TERM_PREEMPT",
    "job killed after queue run window is closed TERM_WINDOW",
    "job killed after load exceeds threshold TERM_LOAD",
    "job exited, reason unknown TERM_OTHER",
    "job killed after reaching LSF run time limit TERM_RUNLIMIT",
    "job killed after deadline expires TERM_DEADLINE",
    "job killed after reaching LSF process TERM_PROCESSLIMIT",
    "job killed by owner without time for cleanup TERM_FORCE_OWNER",
    "job killed by root or LSF administrator without time for cleanup TERM_FORCE_ADMIN",
    "job killed and requeued by owner TERM_REQUEUE_OWNER",
    "job killed and requeued by root or LSF administrator TERM_REQUEUE_ADMIN",
    "job killed after reaching LSF CPU usage limit TERM_CPULIMIT",
    "job killed after checkpointing TERM_CHKPNT",
    "job killed by owner TERM_OWNER",
    "job killed by root or an administrator TERM_ADMIN",
    "job killed after reaching LSF memory usage limit TERM_MEMLIMIT",
    "job killed by a signal external to lsf TERM_EXTERNAL_SIGNAL",
    "job terminated abnormally in RMS TERM_RMS",
    "job killed when LSF is not available TERM_ZOMBIE",
    "job killed after reaching LSF swap usage limit TERM_SWAP",
    "job killed after reaching LSF thread TERM_THREADLIMIT",
    "job terminated abnormally in SLURM TERM_SLURM",
    "job exited, reason unknown TERM_BUCKET_KILL",
    "job terminated after control PID died TERM_CTRL_PID",
    "Current working directory is not accessible or does not exist on the execution host TERM_CWD_NOTEXIST",
    "hung job removed from the LSF system TERM_REMOVE_HUNG_JOB",
    "TERM_ORPHAN_SYSTEM",
    "TERM_PRE_EXEC_FAIL",
    "TERM_DATA",
    "TERM_MC_RECALL",
    "TERM_RC_RECLAIM",
];

/// Highest `exit_info` code eligible for a reason lookup.
pub const MAX_EXIT_INFO: i64 = 26;

/// Result of classifying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub state: LifecycleState,
    pub reason: String,
}

impl Classification {
    fn new(state: LifecycleState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: reason.into(),
        }
    }
}

/// Fixed `(state, reason)` for event types that imply a lifecycle step.
fn static_classification(event_type: &str) -> Option<Classification> {
    match event_type {
        event_types::JOB_NEW => Some(Classification::new(
            LifecycleState::Pend,
            "new job submitted",
        )),
        event_types::JOB_START_ACCEPT => {
            Some(Classification::new(LifecycleState::Run, "job starts"))
        }
        _ => None,
    }
}

/// Human-readable termination reason for a status report, or `""` when the
/// record has no positive exit status or its exit info is out of range.
pub fn exit_reason(event: &ParsedEvent) -> &'static str {
    let exit_status = event.get_int(fields::EXIT_STATUS);
    let exit_info = event.get_int(fields::EXIT_INFO);
    if exit_status <= 0 || !(0..=MAX_EXIT_INFO).contains(&exit_info) {
        return "";
    }
    usize::try_from(exit_info)
        .ok()
        .and_then(|i| EXIT_REASONS.get(i))
        .copied()
        .unwrap_or("")
}

/// Classify an event. `None` means the record is not a trackable lifecycle
/// event, which is not an error.
pub fn classify(event: &ParsedEvent) -> Option<Classification> {
    let event_type = event.event_type();
    if let Some(fixed) = static_classification(&event_type) {
        return Some(fixed);
    }

    if event_type != event_types::JOB_STATUS {
        return None;
    }

    let status = event.get_str(fields::JOB_STATUS);
    let Ok(state) = status.parse::<LifecycleState>() else {
        tracing::warn!(status = %status, "unsupported job status");
        return None;
    };

    let reason = if state.carries_exit_reason() {
        exit_reason(event)
    } else {
        ""
    };
    Some(Classification::new(state, reason))
}
