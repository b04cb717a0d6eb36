pub mod classify;
pub mod error;
pub mod event;
pub mod identity;
pub mod keys;
pub mod message;
pub mod state;
pub mod topic;
pub mod value;

pub use classify::{Classification, classify};
pub use error::DomainError;
pub use event::ParsedEvent;
pub use identity::JobIdentity;
pub use message::OutgoingMessage;
pub use state::{LifecycleState, state_name};
pub use topic::{Topic, TopicKind};
pub use value::{FieldMap, FieldValue};
