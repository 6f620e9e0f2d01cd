//! Sources for the raw collection JSON.
//!
//! `HttpFetcher` reads `<base>/artists.json` and `<base>/events.json` from a
//! web server, `DirectoryFetcher` reads the same files from disk, and
//! `MemoryFetcher` serves canned responses.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::debug;

use super::FetchError;
use crate::models::ResourceKind;

/// HTTP request timeout in seconds when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Produces the body of a collection document.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, kind: ResourceKind) -> Result<String, FetchError>;
}

/// Fetches collection documents over HTTP.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn resource_url(&self, kind: ResourceKind) -> String {
        format!("{}/{}", self.base_url, kind.file_name())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, kind: ResourceKind) -> Result<String, FetchError> {
        let url = self.resource_url(kind);
        debug!(%url, "Fetching collection");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status, &body));
        }

        Ok(response.text().await?)
    }
}

/// Reads collection documents from a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    dir: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl Fetcher for DirectoryFetcher {
    async fn fetch(&self, kind: ResourceKind) -> Result<String, FetchError> {
        let path = self.dir.join(kind.file_name());
        debug!(path = %path.display(), "Reading collection file");
        if !path.exists() {
            return Err(FetchError::NotFound(path.display().to_string()));
        }
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Serves canned `(status, body)` responses and counts requests.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: Mutex<HashMap<ResourceKind, (u16, String)>>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `kind` with status 200 and `body`.
    pub fn with_body(self, kind: ResourceKind, body: impl Into<String>) -> Self {
        self.respond(kind, 200, body);
        self
    }

    /// Replace the response for `kind`.
    pub fn respond(&self, kind: ResourceKind, status: u16, body: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(kind, (status, body.into()));
        }
    }

    /// Number of fetches served so far, successful or not.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, kind: ResourceKind) -> Result<String, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .lock()
            .map_err(|_| FetchError::InvalidResponse("response table poisoned".to_string()))?
            .get(&kind)
            .cloned();

        match response {
            Some((status, body)) => {
                let status = StatusCode::from_u16(status)
                    .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
                if status.is_success() {
                    Ok(body)
                } else {
                    Err(FetchError::from_status(status, &body))
                }
            }
            None => Err(FetchError::NotFound(kind.file_name().to_string())),
        }
    }
}
