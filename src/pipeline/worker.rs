//! Background execution of pipeline jobs.
//!
//! A `generate-variants` job runs three phases in order: enumerate the product's sellable
//! combinations, persist one substituted variant template per combination, then bind every
//! template to its platform variants. Only when all of that, remote calls included, has
//! finished does it create the dependent `render-thumbnails` job, so rendering (and the render
//! sandbox) never overlaps the platform calls of the same request.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use serde_json::Value;

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    jobs::model::{Job, JobType},
    jobs::orchestrator::JobOrchestrator,
    palette::model::{Palette, PaletteBook},
    palette::substitute::substitute_canvas,
    pipeline::config::PipelineConfig,
    pipeline::controller::{GenerationRequest, ThumbnailRequest, decode_payload, encode_payload},
    pipeline::report::{GenerationReport, ItemFailure, Phase, ThumbnailReport},
    platform::assets::AssetStore,
    platform::commerce::{CommercePlatform, Metafield},
    render::thumbnails::ThumbnailRenderer,
    templates::model::Template,
    templates::store::TemplateStore,
    variants::matcher::{
        GeneratedVariant, Offering, VariantCatalog, VariantMatch, match_templates,
    },
};

/// Everything a [`Worker`] talks to.
#[derive(Clone)]
pub struct WorkerContext {
    /// Job queue.
    pub orchestrator: Arc<JobOrchestrator>,
    /// Template rows.
    pub templates: Arc<dyn TemplateStore>,
    /// Chip palettes.
    pub palettes: Arc<PaletteBook>,
    /// Commerce platform.
    pub platform: Arc<dyn CommercePlatform>,
    /// Thumbnail destination.
    pub assets: Arc<dyn AssetStore>,
    /// Thumbnail renderer.
    pub thumbnails: ThumbnailRenderer,
    /// Tunables.
    pub config: PipelineConfig,
}

/// Claims runnable jobs and executes them.
pub struct Worker {
    ctx: WorkerContext,
}

impl Worker {
    /// Worker over `ctx`; the config is validated.
    pub fn new(ctx: WorkerContext) -> SwatchResult<Self> {
        ctx.config.validate()?;
        Ok(Self { ctx })
    }

    /// Run until `shutdown` resolves.
    ///
    /// Jobs a previous process left in `processing` are failed first. Shutdown is observed
    /// between jobs; a job in flight runs to its end.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> SwatchResult<()> {
        tokio::pin!(shutdown);
        self.ctx.orchestrator.recover_interrupted().await?;
        tracing::info!("worker started");
        loop {
            self.drain().await?;
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.ctx.orchestrator.wait_for_work(self.ctx.config.worker_poll()) => {}
            }
        }
        tracing::info!("worker stopped");
        Ok(())
    }

    /// Execute runnable jobs until none is left, including dependents that become runnable on
    /// the way. Returns how many jobs ran.
    pub async fn drain(&self) -> SwatchResult<usize> {
        let mut ran = 0;
        while let Some(job) = self.ctx.orchestrator.claim_next().await? {
            self.run_job(&job).await?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Execute one claimed job and record its outcome.
    ///
    /// Failures of the job itself land on the job; only orchestrator errors are returned.
    #[tracing::instrument(
        skip(self, job),
        fields(job_id = %job.id, job_type = job.job_type.as_str())
    )]
    pub async fn run_job(&self, job: &Job) -> SwatchResult<()> {
        let outcome = match job.job_type {
            JobType::GenerateVariants => self.generate(job).await.and_then(|r| to_value(&r)),
            JobType::RenderThumbnails => {
                self.render_thumbnails(job).await.and_then(|r| to_value(&r))
            }
        };
        match outcome {
            Ok(result) => {
                self.ctx.orchestrator.complete(&job.id, result).await?;
            }
            Err(e) => {
                self.ctx.orchestrator.fail(&job.id, e.to_string()).await?;
            }
        }
        Ok(())
    }

    async fn generate(&self, job: &Job) -> SwatchResult<GenerationReport> {
        let req: GenerationRequest = decode_payload(job)?;
        let master_id = req.master_template_id.clone();
        let master = self
            .with_templates(move |store| store.get(&master_id))
            .await?
            .filter(|t| t.shop == job.shop && !t.is_variant())
            .ok_or_else(|| {
                SwatchError::validation(format!(
                    "master template {} not found",
                    req.master_template_id
                ))
            })?;
        let chip = master.color_variant.as_deref().ok_or_else(|| {
            SwatchError::validation(format!("template {} has no color chip", master.id))
        })?;
        let source = self.ctx.palettes.require(chip)?;

        let catalog = self.enumerate(&req.product_id).await?;
        let mut report = GenerationReport {
            combinations: catalog.len(),
            ..GenerationReport::default()
        };
        for skipped in &catalog.skipped {
            tracing::warn!(
                variant_id = %skipped.variant_id,
                reason = %skipped.reason,
                "variant skipped"
            );
        }
        self.ctx
            .orchestrator
            .set_total(&job.id, catalog.len() as u64 * 2)
            .await?;

        let generated = self
            .persist_variants(job, &master, source, &catalog, &mut report)
            .await?;

        let matches = match_templates(&catalog, &generated);
        report.unmatched = matches
            .unmatched_offerings
            .iter()
            .map(|o| o.key.to_string())
            .collect();
        for orphan in &matches.orphan_templates {
            tracing::warn!(
                template_id = %orphan.template_id,
                key = %orphan.key,
                "template without offering"
            );
        }

        let bound = self.bind_variants(job, &req.product_id, &matches.matched, &mut report).await?;
        report.bound = bound;
        // Offerings that never got a template still count as processed.
        let unbound = catalog.len().saturating_sub(matches.matched.len());
        if unbound > 0 {
            self.ctx.orchestrator.advance(&job.id, unbound as u64).await?;
        }

        let mut template_ids = vec![master.id.clone()];
        template_ids.extend(
            generated
                .iter()
                .filter(|g| g.template_id != master.id)
                .map(|g| g.template_id.clone()),
        );
        let total = template_ids.len() as u64;
        let thumbs = self
            .ctx
            .orchestrator
            .create_dependent(
                &job.id,
                JobType::RenderThumbnails,
                encode_payload(&ThumbnailRequest { template_ids })?,
                Some(total),
            )
            .await?;
        report.thumbnail_job_id = Some(thumbs.id);

        let report = report.summarize();
        tracing::info!(
            summary = %report.summary,
            failures = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }

    #[tracing::instrument(skip(self))]
    async fn enumerate(&self, product_id: &str) -> SwatchResult<VariantCatalog> {
        let variants = self
            .bounded(
                format!("list variants of {product_id}"),
                self.ctx.platform.list_variants(product_id),
            )
            .await?;
        let catalog = VariantCatalog::from_variants(&variants, &self.ctx.config.option_names());
        tracing::info!(
            variants = variants.len(),
            combinations = catalog.len(),
            "variants enumerated"
        );
        Ok(catalog)
    }

    #[tracing::instrument(skip_all, fields(master_id = %master.id))]
    async fn persist_variants(
        &self,
        job: &Job,
        master: &Template,
        source: &Palette,
        catalog: &VariantCatalog,
        report: &mut GenerationReport,
    ) -> SwatchResult<Vec<GeneratedVariant>> {
        let master_id = master.id.clone();
        let removed = self
            .with_templates(move |store| store.delete_variants_of(&master_id))
            .await?;
        if removed > 0 {
            tracing::info!(removed, "previous variants deleted");
        }

        let master_key = master.variant_key();
        let mut generated = Vec::with_capacity(catalog.len());
        for offering in catalog.offerings() {
            if master_key.as_ref() == Some(&offering.key) {
                generated.push(GeneratedVariant {
                    template_id: master.id.clone(),
                    key: offering.key.clone(),
                });
            } else {
                match self.persist_variant(master, source, offering).await {
                    Ok(t) => {
                        report.created += 1;
                        generated.push(GeneratedVariant {
                            template_id: t.id,
                            key: offering.key.clone(),
                        });
                    }
                    Err(e) => report.failures.push(ItemFailure::new(
                        offering.key.to_string(),
                        Phase::Persist,
                        &e,
                    )),
                }
            }
            self.ctx.orchestrator.advance(&job.id, 1).await?;
        }
        Ok(generated)
    }

    async fn persist_variant(
        &self,
        master: &Template,
        source: &Palette,
        offering: &Offering,
    ) -> SwatchResult<Template> {
        let target = self.ctx.palettes.require(&offering.color_name)?;
        let (canvas, stats) = substitute_canvas(&master.canvas_data, source, target);
        let canvas = match &offering.image_url {
            Some(url) => canvas.with_base_image(url),
            None => canvas,
        };
        let variant = Template::new_variant(
            master,
            &offering.color_name,
            offering.pattern_name.as_deref(),
            canvas,
        );
        let row = variant.clone();
        self.with_templates(move |store| store.insert(&row)).await?;
        tracing::debug!(
            template_id = %variant.id,
            chip = %offering.key.color,
            replaced = stats.replaced,
            "variant persisted"
        );
        Ok(variant)
    }

    /// Write the template id on every platform variant of every matched combination.
    ///
    /// At most `batch_size` metafield writes are in flight at once, however many platform
    /// variants a combination groups. A combination counts as bound only when all of its writes
    /// succeed.
    #[tracing::instrument(skip(self, job, matched, report))]
    async fn bind_variants(
        &self,
        job: &Job,
        product_id: &str,
        matched: &[VariantMatch],
        report: &mut GenerationReport,
    ) -> SwatchResult<usize> {
        let limit = self.ctx.config.batch_size;
        let mut bound = 0;
        for batch in matched.chunks(limit) {
            let writes = batch
                .iter()
                .enumerate()
                .flat_map(|(i, m)| m.variant_ids.iter().map(move |v| (i, m, v)));
            let outcomes: Vec<_> = futures::stream::iter(writes)
                .map(|(i, m, variant_id)| async move {
                    (i, variant_id, self.write_metafield(m, variant_id).await)
                })
                .buffer_unordered(limit)
                .collect()
                .await;

            let mut errors = vec![Vec::<String>::new(); batch.len()];
            for (i, variant_id, outcome) in outcomes {
                if let Err(e) = outcome {
                    tracing::warn!(variant_id = %variant_id, error = %e, "metafield write failed");
                    errors[i].push(format!("{variant_id}: {e}"));
                }
            }

            for (m, errors) in batch.iter().zip(errors) {
                match self.record_binding(product_id, m, errors).await {
                    Ok(()) => bound += 1,
                    Err(e) => {
                        report.unmatched.push(m.key.to_string());
                        report
                            .failures
                            .push(ItemFailure::new(m.key.to_string(), Phase::Bind, &e));
                    }
                }
            }
            self.ctx
                .orchestrator
                .advance(&job.id, batch.len() as u64)
                .await?;
        }
        Ok(bound)
    }

    async fn write_metafield(&self, m: &VariantMatch, variant_id: &str) -> SwatchResult<()> {
        let metafield = Metafield {
            namespace: self.ctx.config.metafield_namespace.clone(),
            key: self.ctx.config.metafield_key.clone(),
            value: m.template_id.clone(),
        };
        self.bounded(
            format!("metafield on {variant_id}"),
            self.ctx.platform.set_variant_metafield(variant_id, &metafield),
        )
        .await
    }

    async fn record_binding(
        &self,
        product_id: &str,
        m: &VariantMatch,
        errors: Vec<String>,
    ) -> SwatchResult<()> {
        if !errors.is_empty() {
            return Err(SwatchError::remote(format!(
                "{} of {} variants not bound ({})",
                errors.len(),
                m.variant_ids.len(),
                errors.join("; ")
            )));
        }
        let (template_id, product_id, variant_ids) =
            (m.template_id.clone(), product_id.to_string(), m.variant_ids.clone());
        self.with_templates(move |store| {
            store.bind_variants(&template_id, &product_id, &variant_ids)
        })
        .await?;
        tracing::debug!(
            template_id = %m.template_id,
            variants = m.variant_ids.len(),
            "template bound"
        );
        Ok(())
    }

    async fn render_thumbnails(&self, job: &Job) -> SwatchResult<ThumbnailReport> {
        let req: ThumbnailRequest = decode_payload(job)?;
        let mut report = ThumbnailReport {
            total: req.template_ids.len(),
            ..ThumbnailReport::default()
        };

        for batch in req.template_ids.chunks(self.ctx.config.batch_size) {
            // Render the whole batch before any upload starts.
            let rendered = join_all(batch.iter().map(|id| self.render_one(job, id))).await;
            let mut ready = Vec::new();
            for (id, outcome) in batch.iter().zip(rendered) {
                match outcome {
                    Ok(png) => ready.push((id, png)),
                    Err(e) => {
                        report
                            .failures
                            .push(ItemFailure::new(id.as_str(), Phase::Render, &e));
                    }
                }
            }

            let uploads = join_all(ready.into_iter().map(|(id, png)| async move {
                (id, self.publish(id, png).await)
            }))
            .await;
            for (id, outcome) in uploads {
                match outcome {
                    Ok(()) => report.rendered += 1,
                    Err(e) => {
                        report
                            .failures
                            .push(ItemFailure::new(id.as_str(), Phase::Upload, &e));
                    }
                }
            }
            self.ctx
                .orchestrator
                .advance(&job.id, batch.len() as u64)
                .await?;
        }

        let report = report.summarize();
        tracing::info!(summary = %report.summary, "thumbnails finished");
        Ok(report)
    }

    async fn render_one(&self, job: &Job, template_id: &str) -> SwatchResult<Vec<u8>> {
        let id = template_id.to_string();
        let template = self
            .with_templates(move |store| store.get(&id))
            .await?
            .filter(|t| t.shop == job.shop)
            .ok_or_else(|| SwatchError::validation(format!("template {template_id} not found")))?;
        self.ctx
            .thumbnails
            .render(template.canvas_data.front())
            .await
    }

    async fn publish(&self, template_id: &str, png: Vec<u8>) -> SwatchResult<()> {
        let url = self
            .bounded(
                format!("thumbnail upload for {template_id}"),
                self.ctx.assets.upload(png, "image/png"),
            )
            .await?;
        let (id, stored_url) = (template_id.to_string(), url.clone());
        self.with_templates(move |store| store.set_thumbnail(&id, &stored_url))
            .await?;
        tracing::debug!(template_id, url = %url, "thumbnail recorded");
        Ok(())
    }

    /// Run a template-store call on the blocking pool; the stores do synchronous IO.
    async fn with_templates<T, F>(&self, f: F) -> SwatchResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TemplateStore) -> SwatchResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.ctx.templates);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| SwatchError::storage(format!("template store task failed: {e}")))?
    }

    async fn bounded<T>(
        &self,
        what: String,
        fut: impl Future<Output = SwatchResult<T>>,
    ) -> SwatchResult<T> {
        let limit = self.ctx.config.remote_timeout();
        match tokio::time::timeout(limit, fut).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SwatchError::remote(format!(
                "{what} timed out after {}ms",
                limit.as_millis()
            ))),
        }
    }
}

fn to_value<T: serde::Serialize>(report: &T) -> SwatchResult<Value> {
    Ok(serde_json::to_value(report)?)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/worker.rs"]
mod tests;
