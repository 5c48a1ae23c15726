use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::foundation::error::{SwatchError, SwatchResult};

/// Job lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, not yet picked up.
    Pending,
    /// Picked up by a worker.
    Processing,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    /// Wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `true` for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Kind of work a job carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    /// Substitute, persist and bind color variants of a master template.
    GenerateVariants,
    /// Render and upload thumbnails for a set of templates.
    RenderThumbnails,
}

impl JobType {
    /// Wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateVariants => "generate-variants",
            Self::RenderThumbnails => "render-thumbnails",
        }
    }
}

/// Durable record of one long-running request.
///
/// State changes go through the transition methods, which reject anything that would leave a
/// terminal state or push `progress` past `total`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// UUID v4.
    pub id: String,
    /// Owning shop.
    pub shop: String,
    /// Work kind.
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// Lifecycle state.
    pub status: JobStatus,
    /// Input payload.
    #[serde(default)]
    pub data: Value,
    /// Completed units.
    #[serde(default)]
    pub progress: u64,
    /// Expected units, once known.
    #[serde(default)]
    pub total: Option<u64>,
    /// Output payload of a completed job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Message of a failed job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Job that must complete before this one may start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last transition time.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// New pending job with a fresh id.
    pub fn new(shop: impl Into<String>, job_type: JobType, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            shop: shop.into(),
            job_type,
            status: JobStatus::Pending,
            data,
            progress: 0,
            total: None,
            result: None,
            error: None,
            depends_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Same job with an initial `total`.
    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.total = total;
        self
    }

    /// Same job, runnable only after `parent` completes.
    pub fn depending_on(mut self, parent: impl Into<String>) -> Self {
        self.depends_on = Some(parent.into());
        self
    }

    /// `pending -> processing`.
    pub fn start(&mut self) -> SwatchResult<()> {
        if self.status != JobStatus::Pending {
            return Err(self.rejected("start"));
        }
        self.status = JobStatus::Processing;
        self.touch();
        Ok(())
    }

    /// Set the expected unit count; never below current progress.
    pub fn set_total(&mut self, total: u64) -> SwatchResult<()> {
        self.require_processing("set total")?;
        if total < self.progress {
            return Err(SwatchError::invalid_transition(format!(
                "job {}: total {total} is below progress {}",
                self.id, self.progress
            )));
        }
        self.total = Some(total);
        self.touch();
        Ok(())
    }

    /// Set completed units; never above `total` once it is known.
    pub fn set_progress(&mut self, progress: u64) -> SwatchResult<()> {
        self.require_processing("set progress")?;
        if let Some(total) = self.total
            && progress > total
        {
            return Err(SwatchError::invalid_transition(format!(
                "job {}: progress {progress} exceeds total {total}",
                self.id
            )));
        }
        self.progress = progress;
        self.touch();
        Ok(())
    }

    /// Add `by` completed units.
    pub fn advance(&mut self, by: u64) -> SwatchResult<()> {
        self.set_progress(self.progress.saturating_add(by))
    }

    /// `processing -> completed`.
    pub fn complete(&mut self, result: Value) -> SwatchResult<()> {
        self.require_processing("complete")?;
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.touch();
        Ok(())
    }

    /// `pending | processing -> failed`.
    ///
    /// Pending jobs may fail without starting when their dependency fails.
    pub fn fail(&mut self, error: impl Into<String>) -> SwatchResult<()> {
        if self.status.is_terminal() {
            return Err(self.rejected("fail"));
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.touch();
        Ok(())
    }

    /// Polling shape.
    pub fn view(&self) -> JobView {
        JobView {
            id: self.id.clone(),
            job_type: self.job_type,
            status: self.status,
            progress: self.progress,
            total: self.total,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }

    fn require_processing(&self, op: &str) -> SwatchResult<()> {
        if self.status != JobStatus::Processing {
            return Err(self.rejected(op));
        }
        Ok(())
    }

    fn rejected(&self, op: &str) -> SwatchError {
        SwatchError::invalid_transition(format!(
            "job {}: cannot {op} while {}",
            self.id,
            self.status.as_str()
        ))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Stable shape returned to polling callers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    /// Job id.
    pub id: String,
    /// Work kind.
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// Lifecycle state.
    pub status: JobStatus,
    /// Completed units.
    pub progress: u64,
    /// Expected units.
    pub total: Option<u64>,
    /// Present once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Present once failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/model.rs"]
mod tests;
