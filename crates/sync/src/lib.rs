//! Best-effort mirroring of the local book to a remote REST store.
//!
//! Local data is authoritative. Changes flow out through a [`SyncQueue`];
//! remote state flows in once, at startup, through [`hydrate`].

pub mod hydrate;
pub mod queue;
pub mod remote;
pub mod workspace;

pub use hydrate::{HydrateReport, hydrate};
pub use queue::{SyncHandle, SyncQueue, SyncStats};
pub use remote::{HttpRemote, RemoteApi, SyncError, push};
pub use workspace::Workspace;
