// storage/yandex.rs - Yandex Disk REST API client
//
// Reads:  GET /resources (stat) -> GET /resources/download (signed href) -> GET href
// Writes: GET /resources/upload?overwrite=true (signed href) -> PUT href
// Dirs:   PUT /resources, one call per path prefix (409 = already exists)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{parent_prefixes, revision_of, Document, DocumentStore, Precondition, StoreError};

/// Resource metadata returned by `GET /resources`
#[derive(Debug, Deserialize)]
struct ResourceMeta {
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Signed transfer link returned by the download/upload endpoints
#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct YandexDiskClient {
    http: reqwest::Client,
    api_url: String,
}

impl YandexDiskClient {
    pub fn new(api_url: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self::with_client(http, api_url))
    }

    pub fn with_client(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, resource: &str, path: &str, extra: &[(&str, &str)]) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}{}", self.api_url, resource))
            .map_err(|e| StoreError::InvalidPath(format!("bad storage API url: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", path);
            for (k, v) in extra {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn auth(token: &str) -> String {
        format!("OAuth {}", token)
    }

    /// Resource metadata, or `None` if the path does not exist
    async fn stat(&self, token: &str, path: &str) -> Result<Option<ResourceMeta>, StoreError> {
        let url = self.endpoint("/resources", path, &[("fields", "sha256,type,path")])?;
        let resp = self.http.get(url).header(AUTHORIZATION, Self::auth(token)).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.json::<ResourceMeta>().await?)),
            _ => Err(error_from(resp).await),
        }
    }

    /// Signed download or upload href for `path`
    async fn link(&self, token: &str, resource: &str, path: &str, extra: &[(&str, &str)]) -> Result<String, StoreError> {
        let url = self.endpoint(resource, path, extra)?;
        let resp = self.http.get(url).header(AUTHORIZATION, Self::auth(token)).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string())),
            s if s.is_success() => Ok(resp.json::<Link>().await?.href),
            _ => Err(error_from(resp).await),
        }
    }
}

/// Map a non-2xx upstream response onto a store error
async fn error_from(resp: Response) -> StoreError {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return StoreError::Unauthorized;
    }

    let text = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .unwrap_or(text);

    StoreError::Upstream {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl DocumentStore for YandexDiskClient {
    async fn ensure_container(&self, token: &str, path: &str) {
        for prefix in parent_prefixes(path) {
            let url = match self.endpoint("/resources", &prefix, &[]) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Skipping container {}: {}", prefix, e);
                    return;
                }
            };

            match self.http.put(url).header(AUTHORIZATION, Self::auth(token)).send().await {
                Ok(resp) if resp.status().is_success() => debug!("Created container {}", prefix),
                Ok(resp) if resp.status() == StatusCode::CONFLICT => {}
                Ok(resp) => debug!("Container {} not created: {}", prefix, resp.status()),
                Err(e) => debug!("Container {} not created: {}", prefix, e),
            }
        }
    }

    async fn read(&self, token: &str, path: &str) -> Result<Option<Document>, StoreError> {
        let meta = match self.stat(token, path).await? {
            Some(meta) => meta,
            None => return Ok(None),
        };
        if meta.kind.as_deref() == Some("dir") {
            return Err(StoreError::InvalidPath(format!("{} is a directory", path)));
        }

        let href = match self.link(token, "/resources/download", path, &[]).await {
            Ok(href) => href,
            // Deleted between stat and link
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let resp = self.http.get(&href).send().await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        let bytes = resp.bytes().await?.to_vec();

        let document = Document::new(bytes);
        if let Some(remote) = meta.sha256.as_deref() {
            if remote != document.revision {
                warn!("Downloaded content of {} does not match its listed sha256", path);
            }
        }
        Ok(Some(document))
    }

    async fn write(
        &self,
        token: &str,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<String, StoreError> {
        if precondition != Precondition::Any {
            let current = self.stat(token, path).await?.and_then(|m| m.sha256);
            if !precondition.matches(current.as_deref()) {
                return Err(StoreError::Conflict(path.to_string()));
            }
        }

        let href = self
            .link(token, "/resources/upload", path, &[("overwrite", "true")])
            .await?;

        let revision = revision_of(&bytes);
        let resp = self.http.put(&href).body(bytes).send().await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }

        debug!("Uploaded {} ({})", path, &revision[..12]);
        Ok(revision)
    }
}
