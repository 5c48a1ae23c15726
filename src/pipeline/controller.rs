use std::sync::Arc;

use serde_json::Value;

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    jobs::model::{Job, JobType, JobView},
    jobs::orchestrator::JobOrchestrator,
    templates::store::TemplateStore,
};

/// Payload of a `generate-variants` job.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Master template to generate from.
    pub master_template_id: String,
    /// Platform product whose variants are generated.
    pub product_id: String,
}

/// Payload of a `render-thumbnails` job.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRequest {
    /// Templates to render, master first.
    pub template_ids: Vec<String>,
}

pub(crate) fn decode_payload<T: serde::de::DeserializeOwned>(job: &Job) -> SwatchResult<T> {
    serde_json::from_value(job.data.clone()).map_err(|e| {
        SwatchError::validation(format!("job {} has a malformed payload: {e}", job.id))
    })
}

pub(crate) fn encode_payload<T: serde::Serialize>(payload: &T) -> SwatchResult<Value> {
    Ok(serde_json::to_value(payload)?)
}

/// Entry point for callers: validates requests and hands them to the job queue.
#[derive(Clone)]
pub struct PipelineController {
    orchestrator: Arc<JobOrchestrator>,
    templates: Arc<dyn TemplateStore>,
}

impl PipelineController {
    /// Controller over the shared orchestrator and template store.
    pub fn new(orchestrator: Arc<JobOrchestrator>, templates: Arc<dyn TemplateStore>) -> Self {
        Self {
            orchestrator,
            templates,
        }
    }

    /// Queue generation of every color variant of `master_id` for `product_id`.
    ///
    /// The master must exist, belong to `shop` and name its color chip.
    #[tracing::instrument(skip(self))]
    pub async fn enqueue_generation(
        &self,
        shop: &str,
        master_id: &str,
        product_id: &str,
    ) -> SwatchResult<Job> {
        let master = self
            .templates
            .get(master_id)?
            .filter(|t| t.shop == shop)
            .ok_or_else(|| SwatchError::validation(format!("template {master_id} not found")))?;
        if master.is_variant() {
            return Err(SwatchError::validation(format!(
                "template {master_id} is a generated variant, not a master"
            )));
        }
        if master.color_variant.is_none() {
            return Err(SwatchError::validation(format!(
                "template {master_id} has no color chip"
            )));
        }
        if product_id.trim().is_empty() {
            return Err(SwatchError::validation("product id must not be empty"));
        }

        let data = encode_payload(&GenerationRequest {
            master_template_id: master_id.to_string(),
            product_id: product_id.trim().to_string(),
        })?;
        self.orchestrator
            .create(shop, JobType::GenerateVariants, data, None)
            .await
    }

    /// Polling view of a job.
    pub fn status(&self, job_id: &str, shop: &str) -> SwatchResult<JobView> {
        self.orchestrator.view(job_id, shop)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/controller.rs"]
mod tests;
