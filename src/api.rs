//! Synchronization API
//!
//! The context object a host (state container / UI layer) owns. Holds the
//! mirror tree, the flat result page, the currently loaded file record, and
//! the per-operation status registry; every operation runs gate → fetch →
//! merge → status. Merges and removals happen under a single write lock, so
//! each completion applies atomically with respect to concurrent reads.
//!
//! The gatekeeper is advisory: two gated requests for the same path
//! dispatched before either completes may both pass it. Later completions
//! simply merge on top of whatever the tree holds by then.

use crate::error::SyncError;
use crate::gatekeeper::{should_fetch, FetchKind};
use crate::remote::{RemoteStore, SearchQuery};
use crate::status::{OperationKind, OperationStatus, StatusRegistry};
use crate::tree::{path, Tree};
use crate::types::{Page, Record};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Synchronization context for one remote note store.
pub struct SyncApi {
    remote: Arc<dyn RemoteStore>,
    tree: RwLock<Tree>,
    page: RwLock<Page>,
    current: RwLock<Option<Record>>,
    status: RwLock<StatusRegistry>,
}

/// File operations need a real path; `""` (and its aliases) is the root
/// directory, never a file.
fn require_file_path(raw: &str) -> Result<String, SyncError> {
    let normalized = path::normalize(raw);
    if normalized.is_empty() {
        return Err(SyncError::InvalidPath(raw.to_string()));
    }
    Ok(normalized)
}

impl SyncApi {
    /// Create a new synchronization context over a remote store client.
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            tree: RwLock::new(Tree::new()),
            page: RwLock::new(Page::default()),
            current: RwLock::new(None),
            status: RwLock::new(StatusRegistry::new()),
        }
    }

    /// Paged search; never gated. Results replace the page and are merged
    /// into the tree as an authoritative listing. On failure the page rolls
    /// back to empty.
    #[instrument(skip(self))]
    pub async fn search(&self, query: SearchQuery) -> Result<Page, SyncError> {
        self.status.write().start(OperationKind::Search);
        match self.remote.search(query).await {
            Ok(result) => {
                self.tree.write().merge(&result.notes, true);
                *self.page.write() = result.clone();
                self.status.write().succeed(OperationKind::Search);
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Search failed; rolling page back");
                self.page.write().clear();
                self.status.write().fail(OperationKind::Search);
                Err(err)
            }
        }
    }

    /// Authoritative full-tree refresh; never gated. Any prior tree state
    /// is discarded before the merge.
    #[instrument(skip(self))]
    pub async fn load_tree(&self) -> Result<(), SyncError> {
        self.status.write().start(OperationKind::TreeFetch);
        match self.remote.list_tree().await {
            Ok(records) => {
                let mut fresh = Tree::new();
                fresh.merge(&records, true);
                *self.tree.write() = fresh;
                self.status.write().succeed(OperationKind::TreeFetch);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Tree listing failed; rolling page back");
                self.page.write().clear();
                self.status.write().fail(OperationKind::TreeFetch);
                Err(err)
            }
        }
    }

    /// List one directory's children. Gated: returns `Ok(false)` without
    /// touching the remote when the listing is already fully cached.
    #[instrument(skip(self))]
    pub async fn load_directory(&self, dir_path: &str) -> Result<bool, SyncError> {
        if !should_fetch(&self.tree.read(), dir_path, FetchKind::DirectoryListing) {
            debug!(path = dir_path, "Directory listing served from cache");
            return Ok(false);
        }
        self.status.write().start(OperationKind::ListFetch);
        match self.remote.list_directory(dir_path).await {
            Ok(records) => {
                let mut tree = self.tree.write();
                tree.merge(&records, true);
                if records.is_empty() {
                    // A merge of zero records cannot name the directory it
                    // describes; mark it listed-and-empty here.
                    if let Some(node) = tree.locate_mut(dir_path) {
                        if node.is_dir {
                            node.children = Some(Vec::new());
                            node.cached = true;
                        }
                    }
                }
                drop(tree);
                self.status.write().succeed(OperationKind::ListFetch);
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, path = dir_path, "Directory listing failed");
                self.page.write().clear();
                self.status.write().fail(OperationKind::ListFetch);
                Err(err)
            }
        }
    }

    /// Load one file into `current`. Gated: a cached node is served from
    /// the tree. The speculative `current = None` is set at request start,
    /// so a failure needs no rollback.
    #[instrument(skip(self))]
    pub async fn load_file(&self, file_path: &str) -> Result<Option<Record>, SyncError> {
        let normalized = require_file_path(file_path)?;
        let file_path = normalized.as_str();
        if !should_fetch(&self.tree.read(), file_path, FetchKind::FileGet) {
            let record = self.tree.read().locate(file_path).map(|n| n.to_record());
            debug!(path = file_path, "File served from cache");
            *self.current.write() = record.clone();
            return Ok(record);
        }
        *self.current.write() = None;
        self.status.write().start(OperationKind::FileFetch);
        match self.remote.get_file(file_path).await {
            Ok(record) => {
                self.tree.write().merge(&[record.clone()], false);
                *self.current.write() = Some(record.clone());
                self.status.write().succeed(OperationKind::FileFetch);
                Ok(Some(record))
            }
            Err(err) => {
                warn!(error = %err, path = file_path, "File fetch failed");
                self.status.write().fail(OperationKind::FileFetch);
                Err(err)
            }
        }
    }

    /// Save one file; never gated. On success the returned record (content
    /// attached) replaces the page entry for that path and is merged as a
    /// point update. Nothing is mutated before the remote call succeeds.
    #[instrument(skip(self, content))]
    pub async fn save_file(
        &self,
        file_path: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<Record, SyncError> {
        let normalized = require_file_path(file_path)?;
        let file_path = normalized.as_str();
        self.status.write().start(OperationKind::Save);
        match self.remote.save_file(file_path, content, sha).await {
            Ok(mut record) => {
                if record.content.is_none() {
                    record.content = Some(content.to_string());
                    record.size = record.size.or(Some(content.len() as u64));
                }
                let target = path::normalize(file_path);
                {
                    let mut page = self.page.write();
                    match page
                        .notes
                        .iter_mut()
                        .find(|note| path::normalize(&note.path) == target)
                    {
                        Some(entry) => *entry = record.clone(),
                        None => {
                            page.notes.push(record.clone());
                            page.total += 1;
                        }
                    }
                }
                self.tree.write().merge(&[record.clone()], false);
                self.status.write().succeed(OperationKind::Save);
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, path = file_path, "Save failed");
                self.status.write().fail(OperationKind::Save);
                Err(err)
            }
        }
    }

    /// Delete one file; never gated. On success the record leaves the page,
    /// the node leaves the tree, and `current` is cleared if it pointed at
    /// the deleted path. Nothing is mutated on failure.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, file_path: &str, sha: Option<&str>) -> Result<(), SyncError> {
        let normalized = require_file_path(file_path)?;
        let file_path = normalized.as_str();
        self.status.write().start(OperationKind::Delete);
        match self.remote.delete_file(file_path, sha).await {
            Ok(()) => {
                let target = path::normalize(file_path);
                {
                    let mut page = self.page.write();
                    let before = page.notes.len();
                    page.notes
                        .retain(|note| path::normalize(&note.path) != target);
                    let removed = (before - page.notes.len()) as u64;
                    page.total = page.total.saturating_sub(removed);
                }
                self.tree.write().remove(file_path);
                {
                    let mut current = self.current.write();
                    if current
                        .as_ref()
                        .is_some_and(|record| path::normalize(&record.path) == target)
                    {
                        *current = None;
                    }
                }
                self.status.write().succeed(OperationKind::Delete);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, path = file_path, "Delete failed");
                self.status.write().fail(OperationKind::Delete);
                Err(err)
            }
        }
    }

    /// Return every operation status to Idle.
    pub fn reset_status(&self) {
        self.status.write().reset_all();
    }

    /// Snapshot of the mirror tree.
    pub fn tree(&self) -> Tree {
        self.tree.read().clone()
    }

    /// Snapshot of the flat result page.
    pub fn page(&self) -> Page {
        self.page.read().clone()
    }

    /// The currently loaded single-file record, if any.
    pub fn current(&self) -> Option<Record> {
        self.current.read().clone()
    }

    /// Status snapshot for all operation kinds.
    pub fn status(&self) -> HashMap<OperationKind, OperationStatus> {
        self.status.read().snapshot()
    }

    /// Status of one operation kind.
    pub fn status_of(&self, kind: OperationKind) -> OperationStatus {
        self.status.read().get(kind)
    }
}
