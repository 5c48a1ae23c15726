use crate::foundation::error::SwatchError;

/// Pipeline step an item failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Creating a variant template.
    Persist,
    /// Writing platform metafields.
    Bind,
    /// Fetching images and rasterizing.
    Render,
    /// Publishing a thumbnail and recording its URL.
    Upload,
}

/// One item that did not make it through its phase.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    /// Combination or template the failure belongs to.
    pub item: String,
    /// Where it failed.
    pub phase: Phase,
    /// Error display string.
    pub message: String,
}

impl ItemFailure {
    /// Record `err` against `item`.
    pub fn new(item: impl Into<String>, phase: Phase, err: &SwatchError) -> Self {
        let item = item.into();
        tracing::warn!(item = %item, ?phase, error = %err, "item failed");
        Self {
            item,
            phase,
            message: err.to_string(),
        }
    }
}

/// Result of a `generate-variants` job.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Sellable combinations found on the platform.
    pub combinations: usize,
    /// Variant templates created.
    pub created: usize,
    /// Combinations whose every platform variant was bound.
    pub bound: usize,
    /// Combinations left without a bound template.
    pub unmatched: Vec<String>,
    /// Per-item failures.
    pub failures: Vec<ItemFailure>,
    /// Dependent thumbnail job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_job_id: Option<String>,
    /// Human-readable outcome.
    pub summary: String,
}

impl GenerationReport {
    /// Fill in [`GenerationReport::summary`].
    pub fn summarize(mut self) -> Self {
        self.summary = format!("Synced {} of {} variants", self.bound, self.combinations);
        self
    }
}

/// Result of a `render-thumbnails` job.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailReport {
    /// Templates asked for.
    pub total: usize,
    /// Thumbnails rendered, uploaded and recorded.
    pub rendered: usize,
    /// Per-template failures.
    pub failures: Vec<ItemFailure>,
    /// Human-readable outcome.
    pub summary: String,
}

impl ThumbnailReport {
    /// Fill in [`ThumbnailReport::summary`].
    pub fn summarize(mut self) -> Self {
        self.summary = format!("Rendered {} of {} thumbnails", self.rendered, self.total);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/report.rs"]
mod tests;
