use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use tokio::sync::Mutex;
use tracing::info;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub key: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Given a file, eventually yields a stable reference URL, or fails.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<String>;
}

/// Bucket reachable over plain HTTP `PUT <base_url>/<key>`.
pub struct HttpObjectStorage {
    client: Client,
    base_url: Url,
    public_url: Url,
    token: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(base_url: &str, public_url: Option<&str>, token: Option<String>) -> Result<Self> {
        let base_url = directory_url(base_url)
            .with_context(|| format!("invalid object storage url '{base_url}'"))?;
        let public_url = match public_url {
            Some(raw) => directory_url(raw)
                .with_context(|| format!("invalid object storage public url '{raw}'"))?,
            None => base_url.clone(),
        };
        Ok(Self {
            client: Client::new(),
            base_url,
            public_url,
            token,
        })
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, request: UploadRequest) -> Result<String> {
        let target = object_url(&self.base_url, &request.key)?;
        let size_bytes = request.bytes.len();

        let mut builder = self.client.put(target.clone()).body(request.bytes);
        if let Some(content_type) = request.content_type.as_deref() {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(token) = self.token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder
            .send()
            .await
            .with_context(|| format!("upload to {target} failed"))?
            .error_for_status()
            .with_context(|| format!("object storage rejected upload to {target}"))?;

        let reference = object_url(&self.public_url, &request.key)?;
        info!(key = %request.key, size_bytes, "object uploaded");
        Ok(reference.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Process-local stand-in used when no bucket is configured.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(&self, request: UploadRequest) -> Result<String> {
        let reference = format!("memory://{}", request.key);
        self.objects.lock().await.insert(
            request.key,
            StoredObject {
                content_type: request.content_type,
                bytes: request.bytes,
            },
        );
        Ok(reference)
    }
}

fn directory_url(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

/// Appends `key` below `dir` one segment at a time, so `#`, `?` and `%` in a
/// file name stay part of the path.
fn object_url(dir: &Url, key: &str) -> Result<Url> {
    let mut url = dir.clone();
    url.path_segments_mut()
        .map_err(|()| anyhow!("object storage url '{dir}' cannot hold a path"))?
        .pop_if_empty()
        .extend(key.split('/'));
    Ok(url)
}

#[cfg(test)]
#[path = "tests/object_storage_tests.rs"]
mod tests;
