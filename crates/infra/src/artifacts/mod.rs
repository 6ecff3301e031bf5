//! Bundle storage: loading, persisting and fetching the serving blob.

mod store;
mod sync;

pub use store::{ArtifactStore, PersistError};
pub use sync::{ArtifactSync, MirrorSync, NoSync, SyncError, SyncOutcome};
