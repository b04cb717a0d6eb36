mod config;
mod detector;
mod error;
mod parser;
mod pipeline;
mod processor;
pub mod projector;
pub mod routing;

pub use config::PipelineConfig;
pub use detector::{StateChange, TransitionDetector, build_message};
pub use error::PipelineError;
pub use parser::{FileType, JsonParser, RecordParser};
pub use pipeline::{IngestPipeline, PipelineHandle};
pub use processor::RecordProcessor;
