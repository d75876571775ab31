//! Remote Store Client Abstraction
//!
//! Unified interface for the remote note repository. The synchronization
//! core only ever talks to this trait; the HTTP implementation lives in
//! [`http`] and hosts may substitute their own (tests use an in-memory
//! one).

use crate::error::SyncError;
use crate::types::{Page, Record};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;

pub use http::HttpRemoteStore;

/// Search parameters; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// 1-based result page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Restrict results to a subtree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Free-text query; absent means "list everything"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Remote note store client trait
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Paged search over the store. Ranking is the remote's concern; the
    /// core only consumes the flat result page.
    async fn search(&self, query: SearchQuery) -> Result<Page, SyncError>;

    /// Authoritative listing of the entire hierarchy.
    async fn list_tree(&self) -> Result<Vec<Record>, SyncError>;

    /// Authoritative listing of one directory's immediate children.
    async fn list_directory(&self, path: &str) -> Result<Vec<Record>, SyncError>;

    /// Fetch one file, body included.
    async fn get_file(&self, path: &str) -> Result<Record, SyncError>;

    /// Create or update one file. `sha` is the optimistic-concurrency token
    /// of the revision being replaced; omit it when creating.
    async fn save_file(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<Record, SyncError>;

    /// Delete one file at revision `sha`.
    async fn delete_file(&self, path: &str, sha: Option<&str>) -> Result<(), SyncError>;
}
