use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use crate::foundation::{error::SwatchResult, math::digest_hex};

/// Publishes bytes and returns a URL they can be fetched from.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` of `content_type`; returns the public URL.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SwatchResult<String>;
}

/// Content-addressed files in a local directory served under `base_url`.
#[derive(Clone, Debug)]
pub struct DirAssetStore {
    dir: PathBuf,
    base_url: String,
}

impl DirAssetStore {
    /// Store writing into `dir` (created on first upload).
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

#[async_trait]
impl AssetStore for DirAssetStore {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SwatchResult<String> {
        let name = format!("{}.{}", digest_hex(&bytes), extension_for(content_type));
        let path = self.dir.join(&name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create asset dir '{}'", self.dir.display()))?;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("write asset '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "asset stored");
        Ok(format!("{}/{name}", self.base_url))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/platform/assets.rs"]
mod tests;
