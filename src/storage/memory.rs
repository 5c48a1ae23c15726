use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    jobs::model::{Job, JobStatus},
    jobs::store::JobStore,
    scene::canvas::CanvasData,
    templates::model::Template,
    templates::store::TemplateStore,
};

/// Process-local job and template store. State is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    jobs: RwLock<BTreeMap<String, Job>>,
    templates: RwLock<BTreeMap<String, Template>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> SwatchResult<RwLockReadGuard<'_, BTreeMap<String, Job>>> {
        self.jobs.read().map_err(|_| poisoned())
    }

    fn jobs_mut(&self) -> SwatchResult<RwLockWriteGuard<'_, BTreeMap<String, Job>>> {
        self.jobs.write().map_err(|_| poisoned())
    }

    fn templates(&self) -> SwatchResult<RwLockReadGuard<'_, BTreeMap<String, Template>>> {
        self.templates.read().map_err(|_| poisoned())
    }

    fn templates_mut(&self) -> SwatchResult<RwLockWriteGuard<'_, BTreeMap<String, Template>>> {
        self.templates.write().map_err(|_| poisoned())
    }

    fn with_template<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Template) -> SwatchResult<T>,
    ) -> SwatchResult<T> {
        let mut all = self.templates_mut()?;
        let t = all
            .get_mut(id)
            .ok_or_else(|| SwatchError::storage(format!("template {id} not found")))?;
        f(t)
    }
}

fn poisoned() -> SwatchError {
    SwatchError::storage("memory store lock poisoned")
}

fn oldest_first<T>(
    mut items: Vec<T>,
    key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, String),
) -> Vec<T> {
    items.sort_by_cached_key(key);
    items
}

impl JobStore for MemoryStore {
    fn insert_job(&self, job: &Job) -> SwatchResult<()> {
        let mut jobs = self.jobs_mut()?;
        if jobs.contains_key(&job.id) {
            return Err(SwatchError::storage(format!("job {} already exists", job.id)));
        }
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    fn get_job(&self, id: &str) -> SwatchResult<Option<Job>> {
        Ok(self.jobs()?.get(id).cloned())
    }

    fn update_job(&self, job: &Job) -> SwatchResult<()> {
        let mut jobs = self.jobs_mut()?;
        match jobs.get_mut(&job.id) {
            Some(slot) => {
                *slot = job.clone();
                Ok(())
            }
            None => Err(SwatchError::job_not_found(&job.id)),
        }
    }

    fn jobs_with_status(&self, status: JobStatus) -> SwatchResult<Vec<Job>> {
        let found: Vec<Job> = self
            .jobs()?
            .values()
            .filter(|j| j.status == status)
            .cloned()
            .collect();
        Ok(oldest_first(found, |j| (j.created_at, j.id.clone())))
    }

    fn dependents_of(&self, parent_id: &str) -> SwatchResult<Vec<Job>> {
        let found: Vec<Job> = self
            .jobs()?
            .values()
            .filter(|j| j.depends_on.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        Ok(oldest_first(found, |j| (j.created_at, j.id.clone())))
    }
}

impl TemplateStore for MemoryStore {
    fn insert(&self, template: &Template) -> SwatchResult<()> {
        let mut all = self.templates_mut()?;
        if all.contains_key(&template.id) {
            return Err(SwatchError::storage(format!(
                "template {} already exists",
                template.id
            )));
        }
        all.insert(template.id.clone(), template.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> SwatchResult<Option<Template>> {
        Ok(self.templates()?.get(id).cloned())
    }

    fn update_canvas(&self, id: &str, canvas_data: CanvasData) -> SwatchResult<Template> {
        self.with_template(id, |t| {
            t.replace_canvas(canvas_data)?;
            Ok(t.clone())
        })
    }

    fn set_thumbnail(&self, id: &str, url: &str) -> SwatchResult<()> {
        self.with_template(id, |t| {
            t.set_thumbnail(url);
            Ok(())
        })
    }

    fn bind_variants(
        &self,
        id: &str,
        product_id: &str,
        variant_ids: &[String],
    ) -> SwatchResult<()> {
        self.with_template(id, |t| {
            t.bind(product_id, variant_ids.to_vec());
            Ok(())
        })
    }

    fn variants_of(&self, master_id: &str) -> SwatchResult<Vec<Template>> {
        let found: Vec<Template> = self
            .templates()?
            .values()
            .filter(|t| t.master_template_id.as_deref() == Some(master_id))
            .cloned()
            .collect();
        Ok(oldest_first(found, |t| (t.created_at, t.id.clone())))
    }

    fn delete_variants_of(&self, master_id: &str) -> SwatchResult<usize> {
        let mut all = self.templates_mut()?;
        let before = all.len();
        all.retain(|_, t| t.master_template_id.as_deref() != Some(master_id));
        Ok(before - all.len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storage/memory.rs"]
mod tests;
