use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::foundation::error::{SwatchError, SwatchResult};

/// Source of image bytes referenced by scene documents.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Bytes behind `url`.
    async fn fetch(&self, url: &str) -> SwatchResult<Vec<u8>>;
}

/// Fetches `http(s)://` URLs over the network.
///
/// Local files are read only when a root is set with [`HttpImageSource::with_root`]; bare paths
/// and `file://` URLs then resolve inside that root. Without a root, anything but http(s) is
/// rejected, so a scene cannot pull files off the host into a published thumbnail.
#[derive(Clone, Debug)]
pub struct HttpImageSource {
    client: reqwest::Client,
    root: Option<PathBuf>,
}

impl HttpImageSource {
    /// Network-only source with a per-request `timeout`.
    pub fn new(timeout: Duration) -> SwatchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwatchError::remote(format!("build http client: {e}")))?;
        Ok(Self { client, root: None })
    }

    /// Also serve relative paths from files under `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    async fn read_file(&self, source: &str) -> SwatchResult<Vec<u8>> {
        let Some(root) = &self.root else {
            return Err(SwatchError::validation(format!(
                "image '{source}' is not an http(s) URL"
            )));
        };
        let path = root.join(normalize_rel_path(source)?);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read image '{}'", path.display()))
            .map_err(|e| SwatchError::remote(format!("{e:#}")))?;
        Ok(bytes)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> SwatchResult<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file://") {
            return self.read_file(path).await;
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return self.read_file(url).await;
        }

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SwatchError::remote(format!("fetch '{url}': {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SwatchError::remote(format!("fetch '{url}': http {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SwatchError::remote(format!("read body of '{url}': {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Normalize a root-relative image path.
///
/// Separators become `/` and `.` segments are dropped. Absolute paths, drive prefixes and `..`
/// segments are rejected.
pub(crate) fn normalize_rel_path(source: &str) -> SwatchResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || s.contains(':') {
        return Err(SwatchError::validation(format!(
            "image path '{source}' must be relative"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(SwatchError::validation(format!(
                    "image path '{source}' must not contain '..'"
                )));
            }
            _ => out.push(part),
        }
    }
    if out.is_empty() {
        return Err(SwatchError::validation(format!(
            "image path '{source}' has no file name"
        )));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/platform/images.rs"]
mod tests;
