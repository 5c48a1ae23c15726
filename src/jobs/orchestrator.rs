//! Job lifecycle on top of a [`JobStore`].
//!
//! Writers are serialized by one async lock; each write loads the job, applies a transition on
//! [`Job`], and persists it. Reads go straight to the store.
//!
//! Dependencies form a graph: a job created with [`JobOrchestrator::create_dependent`] becomes
//! runnable when its parent completes and is failed when its parent fails.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, Notify};

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    jobs::model::{Job, JobStatus, JobType, JobView},
    jobs::store::JobStore,
};

/// Error recorded on jobs found in `processing` when a worker starts.
pub const INTERRUPTED: &str = "interrupted before completion";

/// Creates jobs, applies transitions, and wakes workers when work becomes runnable.
pub struct JobOrchestrator {
    store: Arc<dyn JobStore>,
    write: Mutex<()>,
    wake: Notify,
}

impl JobOrchestrator {
    /// Orchestrator over `store`.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            write: Mutex::new(()),
            wake: Notify::new(),
        }
    }

    /// Create a pending job.
    #[tracing::instrument(skip(self, data))]
    pub async fn create(
        &self,
        shop: &str,
        job_type: JobType,
        data: Value,
        total: Option<u64>,
    ) -> SwatchResult<Job> {
        let job = Job::new(shop, job_type, data).with_total(total);
        let _guard = self.write.lock().await;
        self.store.insert_job(&job)?;
        tracing::info!(job_id = %job.id, job_type = job_type.as_str(), "job created");
        self.wake.notify_one();
        Ok(job)
    }

    /// Create a pending job that runs only after `parent_id` completes.
    ///
    /// A parent that already failed is rejected; one that already completed makes the new job
    /// runnable at once.
    #[tracing::instrument(skip(self, data))]
    pub async fn create_dependent(
        &self,
        parent_id: &str,
        job_type: JobType,
        data: Value,
        total: Option<u64>,
    ) -> SwatchResult<Job> {
        let _guard = self.write.lock().await;
        let parent = self.load(parent_id)?;
        if parent.status == JobStatus::Failed {
            return Err(SwatchError::invalid_transition(format!(
                "job {parent_id}: cannot add a dependent to a failed job"
            )));
        }
        let job = Job::new(parent.shop.clone(), job_type, data)
            .with_total(total)
            .depending_on(parent_id);
        self.store.insert_job(&job)?;
        tracing::info!(job_id = %job.id, parent_id, "dependent job created");
        if parent.status == JobStatus::Completed {
            self.wake.notify_one();
        }
        Ok(job)
    }

    /// Job `id` if it belongs to `shop`.
    pub fn get(&self, id: &str, shop: &str) -> SwatchResult<Option<Job>> {
        Ok(self.store.get_job(id)?.filter(|j| j.shop == shop))
    }

    /// Polling view of job `id` owned by `shop`.
    pub fn view(&self, id: &str, shop: &str) -> SwatchResult<JobView> {
        self.get(id, shop)?
            .map(|j| j.view())
            .ok_or_else(|| SwatchError::job_not_found(id))
    }

    /// `pending -> processing`.
    pub async fn start(&self, id: &str) -> SwatchResult<Job> {
        self.transition(id, |j| j.start()).await
    }

    /// Set the expected unit count.
    pub async fn set_total(&self, id: &str, total: u64) -> SwatchResult<Job> {
        self.transition(id, |j| j.set_total(total)).await
    }

    /// Add completed units.
    pub async fn advance(&self, id: &str, by: u64) -> SwatchResult<Job> {
        self.transition(id, |j| j.advance(by)).await
    }

    /// `processing -> completed`; dependents become runnable.
    #[tracing::instrument(skip(self, result))]
    pub async fn complete(&self, id: &str, result: Value) -> SwatchResult<Job> {
        let job = self.transition(id, |j| j.complete(result)).await?;
        tracing::info!(job_id = id, "job completed");
        if !self.store.dependents_of(id)?.is_empty() {
            self.wake.notify_one();
        }
        Ok(job)
    }

    /// Fail job `id`, then every pending job that depends on it, transitively.
    #[tracing::instrument(skip(self, error))]
    pub async fn fail(&self, id: &str, error: impl Into<String>) -> SwatchResult<Job> {
        let error = error.into();
        let _guard = self.write.lock().await;
        let mut job = self.load(id)?;
        job.fail(error.clone())?;
        self.store.update_job(&job)?;
        tracing::warn!(job_id = id, error = %error, "job failed");

        let mut queue = VecDeque::from([job.id.clone()]);
        while let Some(parent) = queue.pop_front() {
            for mut child in self.store.dependents_of(&parent)? {
                if child.status != JobStatus::Pending {
                    continue;
                }
                child.fail(format!("dependency {parent} failed"))?;
                self.store.update_job(&child)?;
                tracing::warn!(job_id = %child.id, parent_id = %parent, "dependent job failed");
                queue.push_back(child.id);
            }
        }
        Ok(job)
    }

    /// Pending jobs whose dependency is absent or completed, oldest first.
    pub fn runnable(&self) -> SwatchResult<Vec<Job>> {
        let mut out = Vec::new();
        for job in self.store.jobs_with_status(JobStatus::Pending)? {
            let ready = match &job.depends_on {
                None => true,
                Some(parent) => self
                    .store
                    .get_job(parent)?
                    .is_some_and(|p| p.status == JobStatus::Completed),
            };
            if ready {
                out.push(job);
            }
        }
        Ok(out)
    }

    /// Start the oldest runnable job, if any.
    pub async fn claim_next(&self) -> SwatchResult<Option<Job>> {
        let _guard = self.write.lock().await;
        let Some(mut job) = self.runnable()?.into_iter().next() else {
            return Ok(None);
        };
        job.start()?;
        self.store.update_job(&job)?;
        tracing::debug!(job_id = %job.id, "job claimed");
        Ok(Some(job))
    }

    /// Fail jobs a previous process left in `processing`. Returns their ids.
    pub async fn recover_interrupted(&self) -> SwatchResult<Vec<String>> {
        let stuck = self.store.jobs_with_status(JobStatus::Processing)?;
        let mut ids = Vec::with_capacity(stuck.len());
        for job in stuck {
            self.fail(&job.id, INTERRUPTED).await?;
            ids.push(job.id);
        }
        if !ids.is_empty() {
            tracing::warn!(count = ids.len(), "recovered interrupted jobs");
        }
        Ok(ids)
    }

    /// Wait until new work may be runnable, or `timeout` elapses.
    pub async fn wait_for_work(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.wake.notified()).await;
    }

    async fn transition(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Job) -> SwatchResult<()>,
    ) -> SwatchResult<Job> {
        let _guard = self.write.lock().await;
        let mut job = self.load(id)?;
        apply(&mut job)?;
        self.store.update_job(&job)?;
        Ok(job)
    }

    fn load(&self, id: &str) -> SwatchResult<Job> {
        self.store
            .get_job(id)?
            .ok_or_else(|| SwatchError::job_not_found(id))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/orchestrator.rs"]
mod tests;
