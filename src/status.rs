//! Per-operation status registry
//!
//! A three-state machine per operation kind: Idle → Loading → Idle on
//! success or Fail on failure. Completion never retains a success state, so
//! a status only answers "in flight?" or "did the most recent attempt
//! fail?", not history. A new invocation re-enters Loading from any state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current state of one asynchronous operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    #[default]
    Idle,
    Loading,
    Fail,
}

/// Distinct operation kinds, each tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Search,
    TreeFetch,
    ListFetch,
    FileFetch,
    Save,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Search,
        OperationKind::TreeFetch,
        OperationKind::ListFetch,
        OperationKind::FileFetch,
        OperationKind::Save,
        OperationKind::Delete,
    ];
}

/// Tracks the status of every operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRegistry {
    statuses: HashMap<OperationKind, OperationStatus>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// An operation of `kind` has been dispatched.
    pub fn start(&mut self, kind: OperationKind) {
        self.statuses.insert(kind, OperationStatus::Loading);
    }

    /// The in-flight operation completed successfully.
    pub fn succeed(&mut self, kind: OperationKind) {
        self.statuses.insert(kind, OperationStatus::Idle);
    }

    /// The in-flight operation failed.
    pub fn fail(&mut self, kind: OperationKind) {
        self.statuses.insert(kind, OperationStatus::Fail);
    }

    pub fn get(&self, kind: OperationKind) -> OperationStatus {
        self.statuses.get(&kind).copied().unwrap_or_default()
    }

    /// Return every tracked operation to Idle, e.g. to clear stale failure
    /// banners.
    pub fn reset_all(&mut self) {
        self.statuses.clear();
    }

    /// Full status snapshot for observers.
    pub fn snapshot(&self) -> HashMap<OperationKind, OperationStatus> {
        OperationKind::ALL
            .iter()
            .map(|&kind| (kind, self.get(kind)))
            .collect()
    }
}
