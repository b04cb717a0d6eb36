/// Errors for decoding scheduler records and configuration.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("record is not a json object")]
    NotAnObject,

    #[error("unknown lifecycle state: {0}")]
    UnknownState(String),
}
