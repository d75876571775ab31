//! Notetree: Client-Side Cache Synchronization for Hierarchical Note Stores
//!
//! Maintains a local tree mirror of a remote note repository, folds
//! asynchronously fetched record batches into it, and decides before each
//! read whether the remote store actually needs to be hit.

pub mod api;
pub mod config;
pub mod error;
pub mod gatekeeper;
pub mod logging;
pub mod remote;
pub mod status;
pub mod tree;
pub mod types;
