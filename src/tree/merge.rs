//! Merge engine: folds flat record batches into the path tree
//!
//! Two modes, selected by `replace_children`:
//! - authoritative (`true`): the batch is the complete truth for the children
//!   of every directory it touches; absent siblings are pruned and those
//!   directories are marked cached.
//! - incremental (`false`): point updates only; siblings are left untouched.
//!
//! Merging is idempotent and order-independent across records within one
//! call.

use crate::tree::node::{Tree, TreeNode};
use crate::tree::path;
use crate::types::Record;
use std::collections::HashSet;
use tracing::{debug, trace};

impl Tree {
    /// Fold `records` into the tree.
    ///
    /// Every missing ancestor directory along a record's path is created
    /// uncached; implicitly created ancestors stay uncached until they are
    /// explicitly listed, so a later directory-listing fetch for them still
    /// proceeds.
    pub fn merge(&mut self, records: &[Record], replace_children: bool) {
        debug!(
            record_count = records.len(),
            replace_children, "Merging record batch"
        );
        for record in records {
            self.apply_record(record, replace_children);
        }
        if replace_children {
            self.finalize_authoritative(records);
        }
    }

    /// Insert or update the node for one record, creating ancestors as
    /// needed.
    fn apply_record(&mut self, record: &Record, replace_children: bool) {
        let target = path::normalize(&record.path);
        if target.is_empty() {
            // The root is implicit; a record for it carries nothing we track.
            return;
        }
        trace!(path = %target, is_dir = record.is_dir, "Applying record");

        let mut node = &mut self.root;
        let segs = path::segments(&target);
        for segment in &segs[..segs.len() - 1] {
            let next = path::join(&node.path, segment);
            node = descend(node, &next);
        }

        let children = node.children.get_or_insert_with(Vec::new);
        let idx = match children.iter().position(|child| child.path == target) {
            Some(idx) => idx,
            None => {
                let created = if record.is_dir {
                    TreeNode::directory(&target)
                } else {
                    TreeNode::file(&target)
                };
                let at = insertion_point(children, &target);
                children.insert(at, created);
                at
            }
        };
        update_terminal(&mut children[idx], record, replace_children);
    }

    /// Authoritative epilogue: every directory that is the parent of a
    /// record in the batch had its full child set declared, so siblings not
    /// named by the batch are pruned and the directory is marked cached.
    /// Implicit ancestor directories of deeper batch records survive the
    /// pruning even though they are not batch members themselves.
    /// Directory records without children in the batch (e.g. subdirectory
    /// entries of a single listing) stay unlisted.
    fn finalize_authoritative(&mut self, records: &[Record]) {
        let batch: HashSet<String> = records
            .iter()
            .map(|record| path::normalize(&record.path))
            .collect();
        let mut ancestors: HashSet<String> = HashSet::new();
        for record_path in &batch {
            let mut cursor = path::parent(record_path);
            while let Some(ancestor) = cursor {
                if ancestor.is_empty() {
                    break;
                }
                cursor = path::parent(&ancestor);
                ancestors.insert(ancestor);
            }
        }
        let parents: HashSet<String> = batch
            .iter()
            .filter_map(|record_path| path::parent(record_path))
            .collect();

        for parent_path in &parents {
            let Some(node) = self.locate_mut(parent_path) else {
                continue;
            };
            if let Some(children) = node.children.as_mut() {
                let before = children.len();
                children.retain(|child| {
                    batch.contains(&child.path) || ancestors.contains(&child.path)
                });
                if children.len() != before {
                    trace!(
                        path = %parent_path,
                        pruned = before - children.len(),
                        "Pruned children absent from authoritative batch"
                    );
                }
            }
            node.cached = true;
        }
    }
}

/// Sorted position for a new child. Child lists are kept ordered by path so
/// the merged tree is identical whatever order the batch arrived in.
fn insertion_point(children: &[TreeNode], target: &str) -> usize {
    children.partition_point(|child| child.path.as_str() < target)
}

/// Walk one level down into `next`, creating a missing intermediate
/// directory (uncached, listed-empty) and converting a conflicting file
/// node when the remote now reports a directory at that path.
fn descend<'a>(node: &'a mut TreeNode, next: &str) -> &'a mut TreeNode {
    let children = node.children.get_or_insert_with(Vec::new);
    let idx = match children.iter().position(|child| child.path == next) {
        Some(idx) => idx,
        None => {
            let mut dir = TreeNode::directory(next);
            dir.children = Some(Vec::new());
            let at = insertion_point(children, next);
            children.insert(at, dir);
            at
        }
    };
    let child = &mut children[idx];
    if !child.is_dir {
        child.is_dir = true;
        child.content = None;
        child.size = None;
        child.cached = false;
        child.children = Some(Vec::new());
    }
    child
}

/// Update the terminal node in place from its record.
fn update_terminal(node: &mut TreeNode, record: &Record, replace_children: bool) {
    let target = path::normalize(&record.path);
    let sha_changed = node.sha.as_deref() != Some(record.sha.as_str());
    node.name = path::file_name(&target).to_string();
    node.path = target;
    node.sha = Some(record.sha.clone());

    if record.is_dir {
        if !node.is_dir {
            node.is_dir = true;
            node.content = None;
            node.size = None;
            node.cached = false;
        }
        // Children, if already known, survive; a directory record alone says
        // nothing about its listing.
        return;
    }

    if node.is_dir {
        node.is_dir = false;
        node.children = None;
        node.cached = false;
    }

    if let Some(content) = &record.content {
        node.content = Some(content.clone());
        node.size = record.size.or_else(|| Some(content.len() as u64));
        node.cached = true;
    } else if !replace_children {
        // Point update from a get/save result: authoritative for this file.
        node.size = record.size.or(node.size);
        node.cached = true;
    } else {
        // Listing entry without content: the revision tag is the merge key.
        // A changed sha invalidates whatever body we held.
        node.size = record.size.or(node.size);
        if sha_changed {
            node.content = None;
            node.cached = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_record(path: &str, sha: &str) -> Record {
        Record {
            path: path.to_string(),
            sha: sha.to_string(),
            is_dir: false,
            content: None,
            size: None,
        }
    }

    fn dir_record(path: &str, sha: &str) -> Record {
        Record {
            path: path.to_string(),
            sha: sha.to_string(),
            is_dir: true,
            content: None,
            size: None,
        }
    }

    fn fetched_record(path: &str, sha: &str, content: &str) -> Record {
        Record {
            path: path.to_string(),
            sha: sha.to_string(),
            is_dir: false,
            content: Some(content.to_string()),
            size: Some(content.len() as u64),
        }
    }

    #[test]
    fn test_incremental_merge_creates_ancestors_uncached() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("a/b.md", "s1")], false);

        let dir = tree.locate("a").unwrap();
        assert!(dir.is_dir);
        assert!(!dir.cached);

        let file = tree.locate("a/b.md").unwrap();
        assert!(!file.is_dir);
        assert!(file.cached);
        assert_eq!(file.sha.as_deref(), Some("s1"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let records = vec![
            fetched_record("a/b.md", "s1", "hello"),
            file_record("a/c.md", "s2"),
            dir_record("a", "d1"),
        ];
        for replace in [false, true] {
            let mut once = Tree::new();
            once.merge(&records, replace);
            let mut twice = once.clone();
            twice.merge(&records, replace);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_merge_is_order_independent() {
        let r1 = fetched_record("x/y/z.md", "s1", "body");
        let r2 = dir_record("x/y", "d1");
        let r3 = file_record("x/other.md", "s3");
        for replace in [false, true] {
            let mut forward = Tree::new();
            forward.merge(&[r1.clone(), r2.clone(), r3.clone()], replace);
            let mut backward = Tree::new();
            backward.merge(&[r3.clone(), r2.clone(), r1.clone()], replace);
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn test_authoritative_merge_prunes_absent_siblings() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("d/a.md", "s1"), file_record("d/b.md", "s2")], true);
        assert!(tree.locate("d/b.md").is_some());
        assert!(tree.locate("d").unwrap().cached);

        tree.merge(&[file_record("d/a.md", "s1")], true);
        assert!(tree.locate("d/a.md").is_some());
        assert!(tree.locate("d/b.md").is_none());
        assert!(tree.locate("d").unwrap().cached);
    }

    #[test]
    fn test_incremental_merge_leaves_siblings_untouched() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("d/a.md", "s1"), file_record("d/b.md", "s2")], true);

        tree.merge(&[fetched_record("d/a.md", "s1b", "body")], false);
        assert!(tree.locate("d/b.md").is_some());
        assert_eq!(tree.locate("d/a.md").unwrap().sha.as_deref(), Some("s1b"));
    }

    #[test]
    fn test_listing_entry_without_content_stays_fetch_required() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("a/b.md", "s1")], true);
        assert!(!tree.locate("a/b.md").unwrap().cached);
    }

    #[test]
    fn test_changed_sha_invalidates_cached_content() {
        let mut tree = Tree::new();
        tree.merge(&[fetched_record("a/b.md", "s1", "old body")], false);
        assert!(tree.locate("a/b.md").unwrap().cached);

        tree.merge(&[file_record("a/b.md", "s2")], true);
        let node = tree.locate("a/b.md").unwrap();
        assert!(!node.cached);
        assert!(node.content.is_none());
    }

    #[test]
    fn test_unchanged_sha_keeps_cached_content() {
        let mut tree = Tree::new();
        tree.merge(&[fetched_record("a/b.md", "s1", "body")], false);
        tree.merge(&[file_record("a/b.md", "s1")], true);
        let node = tree.locate("a/b.md").unwrap();
        assert!(node.cached);
        assert_eq!(node.content.as_deref(), Some("body"));
    }

    #[test]
    fn test_subdirectory_entry_stays_unlisted() {
        let mut tree = Tree::new();
        tree.merge(&[dir_record("a/sub", "d1"), file_record("a/x.md", "s1")], true);
        let sub = tree.locate("a/sub").unwrap();
        assert!(!sub.cached);
        assert!(sub.children.is_none());
        assert!(tree.locate("a").unwrap().cached);
    }

    #[test]
    fn test_mixed_depth_authoritative_batch_keeps_deep_records() {
        let mut tree = Tree::new();
        tree.merge(
            &[file_record("a/b.md", "s1"), file_record("top.md", "s2")],
            true,
        );
        // "a" is not a batch member, but it carries a/b.md and must survive
        // the root's pruning.
        assert!(tree.locate("a").is_some());
        assert!(tree.locate("a/b.md").is_some());
        assert!(tree.locate("top.md").is_some());
        assert!(tree.root.cached);
    }

    #[test]
    fn test_deep_ancestor_survives_but_stays_uncached() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("a/b/c.md", "s1")], true);
        // "a" is a pure path component: neither a batch member nor the
        // parent of one, so it survives untouched and uncached.
        let outer = tree.locate("a").unwrap();
        assert!(!outer.cached);
        let inner = tree.locate("a/b").unwrap();
        assert!(inner.cached, "parent of the batch record is declared complete");
        assert!(tree.locate("a/b/c.md").is_some());
    }

    #[test]
    fn test_sibling_order_is_deterministic() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("z.md", "s1"), file_record("a.md", "s2")], false);
        let names: Vec<&str> = tree
            .root
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|child| child.name.as_str())
            .collect();
        assert_eq!(names, vec!["a.md", "z.md"]);
    }

    #[test]
    fn test_root_listing_marks_root_cached() {
        let mut tree = Tree::new();
        tree.merge(&[file_record("top.md", "s1")], true);
        assert!(tree.root.cached);
        assert_eq!(tree.root.children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_file_replaced_by_directory() {
        let mut tree = Tree::new();
        tree.merge(&[fetched_record("a", "s1", "was a file")], false);
        tree.merge(&[file_record("a/b.md", "s2")], false);
        let dir = tree.locate("a").unwrap();
        assert!(dir.is_dir);
        assert!(dir.content.is_none());
        assert!(tree.locate("a/b.md").is_some());
    }
}
