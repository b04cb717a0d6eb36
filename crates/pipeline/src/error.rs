use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline is stopped")]
    Closed,

    #[error("worker dropped the reply channel")]
    ReplyDropped,
}
