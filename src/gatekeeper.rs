//! Fetch gatekeeper: pre-flight predicate for passive reads
//!
//! Evaluated against the tree snapshot at dispatch time. Advisory only:
//! writes and search always reach the remote store and never consult it.

use crate::tree::Tree;

/// The kind of gated read being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    DirectoryListing,
    FileGet,
}

/// Decide whether a fetch for `path` is still necessary.
///
/// A directory listing is skipped only when the directory's children are
/// fully known (`children` present), the node is cached, and at least one
/// non-directory child is already listed. A never-listed directory
/// (`children` absent) is always fetched, whatever its `cached` flag says:
/// "no children known" cannot be trusted as complete.
///
/// A file get is skipped only when the node exists and is cached.
pub fn should_fetch(tree: &Tree, path: &str, kind: FetchKind) -> bool {
    let Some(node) = tree.locate(path) else {
        return true;
    };
    match kind {
        FetchKind::DirectoryListing => {
            let Some(children) = node.children.as_ref() else {
                return true;
            };
            let has_file_child = children.iter().any(|child| !child.is_dir);
            !(node.cached && has_file_child)
        }
        FetchKind::FileGet => !node.cached,
    }
}
