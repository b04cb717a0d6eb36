mod error;
mod flusher;
mod path;
mod store;

pub use error::StoreError;
pub use flusher::{FlushTarget, SnapshotFlusher};
pub use path::{SNAPSHOT_DIR_ENV, SNAPSHOT_FILE_NAME, default_snapshot_path, resolve_snapshot_path};
pub use store::{
    JobStateStore, Persist, PropertyCache, PropertySnapshot, SnapshotMap, SnapshotValue,
};
