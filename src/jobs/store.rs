use crate::{
    foundation::error::SwatchResult,
    jobs::model::{Job, JobStatus},
};

/// Durable job storage.
///
/// Implementations only persist; every state rule lives on [`Job`] and in the orchestrator,
/// which serializes writers.
pub trait JobStore: Send + Sync {
    /// Persist a new job. Fails when the id already exists.
    fn insert_job(&self, job: &Job) -> SwatchResult<()>;

    /// Load a job by id.
    fn get_job(&self, id: &str) -> SwatchResult<Option<Job>>;

    /// Overwrite an existing job. Fails when the id is unknown.
    fn update_job(&self, job: &Job) -> SwatchResult<()>;

    /// Jobs in `status`, oldest first.
    fn jobs_with_status(&self, status: JobStatus) -> SwatchResult<Vec<Job>>;

    /// Jobs whose `depends_on` is `parent_id`, oldest first.
    fn dependents_of(&self, parent_id: &str) -> SwatchResult<Vec<Job>>;
}
