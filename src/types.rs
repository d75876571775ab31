//! Wire-level types received from the remote store.

use serde::{Deserialize, Serialize};

/// One listed or fetched file/directory entry from the remote store.
///
/// `sha` is the remote revision tag; it doubles as the optimistic-concurrency
/// token on save and as a merge key. `content` and `size` are only present
/// once the file body has actually been retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A paged search result.
///
/// `total` is the remote-reported count and is independent of how many
/// records are present in `notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub total: u64,
    pub notes: Vec<Record>,
}

impl Page {
    /// Drop all records, e.g. when rolling back a failed listing.
    pub fn clear(&mut self) {
        self.total = 0;
        self.notes.clear();
    }
}
