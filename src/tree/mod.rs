//! Path tree mirror of the remote note hierarchy
//!
//! Each node (file or directory) is keyed by its full remote path and carries
//! a `cached` flag recording whether its own data (file content, or full
//! child listing for a directory) is already known locally.

pub mod merge;
pub mod node;
pub mod path;

pub use node::{Tree, TreeNode};
