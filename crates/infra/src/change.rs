//! Outbox seam between local writes and the remote mirror.
//!
//! The [`Book`](crate::Book) reports every record it created, updated or
//! deleted to a [`ChangeSink`] after the local write has succeeded. Sinks must
//! not block and must not fail the caller.

use std::sync::Mutex;

use serde_json::Value;

use nexus_core::RecordId;

use crate::collections::Collection;

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Created {
        collection: Collection,
        id: RecordId,
        record: Value,
    },
    Updated {
        collection: Collection,
        id: RecordId,
        record: Value,
    },
    Deleted {
        collection: Collection,
        id: RecordId,
    },
}

impl Change {
    pub fn collection(&self) -> Collection {
        match self {
            Change::Created { collection, .. }
            | Change::Updated { collection, .. }
            | Change::Deleted { collection, .. } => *collection,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            Change::Created { id, .. } | Change::Updated { id, .. } | Change::Deleted { id, .. } => id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Change::Created { .. } => "create",
            Change::Updated { .. } => "update",
            Change::Deleted { .. } => "delete",
        }
    }
}

pub trait ChangeSink: Send + Sync {
    fn record(&self, change: Change);
}

/// Drops every change (no remote configured).
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardChanges;

impl ChangeSink for DiscardChanges {
    fn record(&self, _change: Change) {}
}

/// Keeps changes in memory, in order.
#[derive(Debug, Default)]
pub struct ChangeLog {
    changes: Mutex<Vec<Change>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Change> {
        match self.changes.lock() {
            Ok(mut changes) => std::mem::take(&mut *changes),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ChangeSink for ChangeLog {
    fn record(&self, change: Change) {
        match self.changes.lock() {
            Ok(mut changes) => changes.push(change),
            Err(poisoned) => poisoned.into_inner().push(change),
        }
    }
}
