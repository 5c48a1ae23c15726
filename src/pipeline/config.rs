use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    variants::matcher::OptionNames,
};

/// Tunables of the generation and thumbnail pipeline. Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Remote calls (or renders) in flight at once.
    pub batch_size: usize,
    /// Bound on a single platform query, mutation or upload.
    pub remote_timeout_ms: u64,
    /// Bound on a single image fetch.
    pub image_timeout_ms: u64,
    /// Longer side of rendered thumbnails.
    pub thumbnail_max_px: u32,
    /// Metafield namespace written on bound variants.
    pub metafield_namespace: String,
    /// Metafield key written on bound variants; the value is the template id.
    pub metafield_key: String,
    /// Option names that carry the color.
    pub color_option_names: Vec<String>,
    /// Option names that carry the pattern.
    pub pattern_option_names: Vec<String>,
    /// Idle worker poll interval.
    pub worker_poll_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            remote_timeout_ms: 15_000,
            image_timeout_ms: 10_000,
            thumbnail_max_px: 512,
            metafield_namespace: "swatchforge".to_string(),
            metafield_key: "template_id".to_string(),
            color_option_names: vec!["color".to_string(), "colour".to_string()],
            pattern_option_names: vec![
                "pattern".to_string(),
                "print".to_string(),
                "design".to_string(),
            ],
            worker_poll_ms: 2_000,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> SwatchResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| SwatchError::validation(format!("parse pipeline config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a config file.
    pub fn load(path: &Path) -> SwatchResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read pipeline config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> SwatchResult<()> {
        if self.batch_size == 0 {
            return Err(SwatchError::validation("batchSize must be > 0"));
        }
        for (name, v) in [
            ("remoteTimeoutMs", self.remote_timeout_ms),
            ("imageTimeoutMs", self.image_timeout_ms),
            ("workerPollMs", self.worker_poll_ms),
        ] {
            if v == 0 {
                return Err(SwatchError::validation(format!("{name} must be > 0")));
            }
        }
        if self.thumbnail_max_px == 0 {
            return Err(SwatchError::validation("thumbnailMaxPx must be > 0"));
        }
        if self.metafield_namespace.trim().is_empty() || self.metafield_key.trim().is_empty() {
            return Err(SwatchError::validation(
                "metafieldNamespace and metafieldKey must not be empty",
            ));
        }
        if self.color_option_names.is_empty() {
            return Err(SwatchError::validation(
                "colorOptionNames must name at least one option",
            ));
        }
        Ok(())
    }

    /// Matcher option names.
    pub fn option_names(&self) -> OptionNames {
        OptionNames::new(self.color_option_names.as_slice(), self.pattern_option_names.as_slice())
    }

    /// [`PipelineConfig::remote_timeout_ms`] as a duration.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// [`PipelineConfig::image_timeout_ms`] as a duration.
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    /// [`PipelineConfig::worker_poll_ms`] as a duration.
    pub fn worker_poll(&self) -> Duration {
        Duration::from_millis(self.worker_poll_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
