//! Path normalization and segment utilities
//!
//! Remote paths are plain `/`-separated strings; the empty string is the
//! root. Every tree operation normalizes its path argument first so that
//! `"a/b/"` and `"a/b"` resolve to the same node.

use unicode_normalization::UnicodeNormalization;

/// Normalize a remote path string.
///
/// This function:
/// 1. Normalizes Unicode to NFC (note titles may arrive in either form)
/// 2. Strips leading and trailing slashes
/// 3. Maps `"."` and `"/"` to the root path `""`
pub fn normalize(path: &str) -> String {
    let normalized: String = path.nfc().collect();
    let trimmed = normalized.trim_matches('/');
    if trimmed == "." {
        return String::new();
    }
    trimmed.to_string()
}

/// Split a normalized path into its segments. The root has no segments.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return vec![];
    }
    path.split('/').collect()
}

/// Parent path of a normalized path. The root's parent is `None`.
pub fn parent(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    match path.rfind('/') {
        Some(idx) => Some(path[..idx].to_string()),
        None => Some(String::new()),
    }
}

/// Last segment of a normalized path, used as the display name.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join a parent path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}
