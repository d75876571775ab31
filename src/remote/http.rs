//! HTTP implementation of the remote store client

use crate::config::RemoteConfig;
use crate::error::SyncError;
use crate::remote::{RemoteStore, SearchQuery};
use crate::types::{Page, Record};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct SaveRequest<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

fn build_http_client(config: &RemoteConfig) -> Result<Client, SyncError> {
    let connect_timeout = config
        .connect_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT);
    let request_timeout = config
        .request_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| SyncError::NetworkFailure(format!("Failed to create HTTP client: {}", e)))
}

/// Remote store over a REST notes API.
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, SyncError> {
        let client = build_http_client(config)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn search(&self, query: SearchQuery) -> Result<Page, SyncError> {
        let url = format!("{}/search", self.base_url);
        debug!(%url, "Remote search");
        let response = self
            .request(reqwest::Method::GET, url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn list_tree(&self) -> Result<Vec<Record>, SyncError> {
        let url = format!("{}/tree", self.base_url);
        debug!(%url, "Remote tree listing");
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<Record>, SyncError> {
        let url = format!("{}/dirs/{}", self.base_url, path);
        debug!(%url, "Remote directory listing");
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn get_file(&self, path: &str) -> Result<Record, SyncError> {
        let url = format!("{}/notes/{}", self.base_url, path);
        debug!(%url, "Remote file get");
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn save_file(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<Record, SyncError> {
        let url = format!("{}/notes/{}", self.base_url, path);
        debug!(%url, has_sha = sha.is_some(), "Remote file save");
        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&SaveRequest { content, sha })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn delete_file(&self, path: &str, sha: Option<&str>) -> Result<(), SyncError> {
        let url = format!("{}/notes/{}", self.base_url, path);
        debug!(%url, "Remote file delete");
        self.request(reqwest::Method::DELETE, url)
            .json(&DeleteRequest { sha })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = RemoteConfig {
            base_url: "https://notes.example.com/api/".to_string(),
            ..RemoteConfig::default()
        };
        let store = HttpRemoteStore::new(&config).unwrap();
        assert_eq!(store.base_url, "https://notes.example.com/api");
    }

    #[test]
    fn test_save_request_omits_absent_sha() {
        let body = serde_json::to_string(&SaveRequest {
            content: "hello",
            sha: None,
        })
        .unwrap();
        assert_eq!(body, r#"{"content":"hello"}"#);
    }
}
