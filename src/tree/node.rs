//! Tree node types, exact-path lookup, and node removal

use crate::tree::path;
use crate::types::Record;
use serde::{Deserialize, Serialize};

/// One path in the mirrored hierarchy (file or directory).
///
/// `children` is `None` for a directory that has never been listed and
/// `Some(vec![])` for one that is listed and empty; the distinction matters
/// to the fetch gatekeeper. Files never have children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Last path segment, display label
    pub name: String,
    /// Full remote path, unique key within the tree; `""` is the root
    pub path: String,
    pub is_dir: bool,
    /// Remote revision tag, present once fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// True iff this node's own data needs no further fetch
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Create an unlisted, uncached directory node.
    pub fn directory(node_path: &str) -> Self {
        Self {
            name: path::file_name(node_path).to_string(),
            path: node_path.to_string(),
            is_dir: true,
            sha: None,
            content: None,
            size: None,
            cached: false,
            children: None,
        }
    }

    /// Create an uncached file node.
    pub fn file(node_path: &str) -> Self {
        Self {
            name: path::file_name(node_path).to_string(),
            path: node_path.to_string(),
            is_dir: false,
            sha: None,
            content: None,
            size: None,
            cached: false,
            children: None,
        }
    }

    /// View this node as a wire record, e.g. when serving a gated-out
    /// file get from cache. Directories and never-fetched files have no
    /// revision tag yet; those map to an empty `sha`.
    pub fn to_record(&self) -> Record {
        Record {
            path: self.path.clone(),
            sha: self.sha.clone().unwrap_or_default(),
            is_dir: self.is_dir,
            content: self.content.clone(),
            size: self.size,
        }
    }
}

/// The local mirror tree. The root always exists with path `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub root: TreeNode,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Empty tree: a root directory, uncached, nothing listed.
    pub fn new() -> Self {
        Self {
            root: TreeNode::directory(""),
        }
    }

    /// Resolve a path to its node by exact segment walk.
    ///
    /// Returns `None` if any segment along the way is missing. No prefix
    /// matching.
    pub fn locate(&self, raw_path: &str) -> Option<&TreeNode> {
        let target = path::normalize(raw_path);
        let mut node = &self.root;
        for segment in path::segments(&target) {
            let next = path::join(&node.path, segment);
            node = node
                .children
                .as_ref()?
                .iter()
                .find(|child| child.path == next)?;
        }
        Some(node)
    }

    /// Mutable counterpart of [`locate`](Self::locate).
    pub(crate) fn locate_mut(&mut self, raw_path: &str) -> Option<&mut TreeNode> {
        let target = path::normalize(raw_path);
        let mut node = &mut self.root;
        for segment in path::segments(&target) {
            let next = path::join(&node.path, segment);
            let children = node.children.as_mut()?;
            let idx = children.iter().position(|child| child.path == next)?;
            node = &mut children[idx];
        }
        Some(node)
    }

    /// Remove the node at `raw_path` from its parent's child list.
    ///
    /// The node's whole subtree goes with it. Now-empty ancestor directories
    /// are left in place with their `cached` state unchanged. Returns false
    /// when the path does not resolve to an existing node.
    pub fn remove(&mut self, raw_path: &str) -> bool {
        let target = path::normalize(raw_path);
        let Some(parent_path) = path::parent(&target) else {
            // The root itself is never removed.
            return false;
        };
        let Some(parent) = self.locate_mut(&parent_path) else {
            return false;
        };
        let Some(children) = parent.children.as_mut() else {
            return false;
        };
        let before = children.len();
        children.retain(|child| child.path != target);
        children.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Tree {
        let mut tree = Tree::new();
        tree.root.children = Some(vec![
            TreeNode {
                children: Some(vec![TreeNode::file("a/b.md"), TreeNode::file("a/c.md")]),
                ..TreeNode::directory("a")
            },
            TreeNode::file("top.md"),
        ]);
        tree
    }

    #[test]
    fn test_locate_root() {
        let tree = Tree::new();
        let root = tree.locate("").unwrap();
        assert_eq!(root.path, "");
        assert!(root.is_dir);
        assert!(!root.cached);
    }

    #[test]
    fn test_locate_exact_match() {
        let tree = sample_tree();
        assert_eq!(tree.locate("a/b.md").unwrap().path, "a/b.md");
        assert_eq!(tree.locate("a").unwrap().path, "a");
        assert_eq!(tree.locate("/a/b.md/").unwrap().path, "a/b.md");
    }

    #[test]
    fn test_locate_missing_segment() {
        let tree = sample_tree();
        assert!(tree.locate("a/missing.md").is_none());
        assert!(tree.locate("nonexistent/path").is_none());
        // No prefix matching
        assert!(tree.locate("a/b").is_none());
    }

    #[test]
    fn test_locate_through_unlisted_directory() {
        let mut tree = Tree::new();
        tree.root.children = Some(vec![TreeNode::directory("a")]);
        // "a" has children: None, so nothing under it resolves
        assert!(tree.locate("a/b.md").is_none());
        assert!(tree.locate("a").is_some());
    }

    #[test]
    fn test_remove_file_keeps_siblings() {
        let mut tree = sample_tree();
        assert!(tree.remove("a/b.md"));
        assert!(tree.locate("a/b.md").is_none());
        assert!(tree.locate("a/c.md").is_some());
        assert!(tree.locate("a").is_some());
    }

    #[test]
    fn test_remove_directory_takes_subtree() {
        let mut tree = sample_tree();
        assert!(tree.remove("a"));
        assert!(tree.locate("a").is_none());
        assert!(tree.locate("a/b.md").is_none());
        assert!(tree.locate("top.md").is_some());
    }

    #[test]
    fn test_remove_leaves_empty_parent_in_place() {
        let mut tree = sample_tree();
        tree.remove("a/b.md");
        tree.remove("a/c.md");
        let parent = tree.locate("a").unwrap();
        assert_eq!(parent.children.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut tree = sample_tree();
        let before = tree.clone();
        assert!(!tree.remove("a/missing.md"));
        assert!(!tree.remove(""));
        assert_eq!(tree, before);
    }
}
