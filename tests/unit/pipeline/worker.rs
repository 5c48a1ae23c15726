use super::*;
use crate::geometry::measure::AdvanceMeasure;
use crate::jobs::model::JobStatus;
use crate::jobs::orchestrator::INTERRUPTED;
use crate::jobs::store::JobStore;
use crate::platform::images::ImageSource;
use crate::render::headless::HeadlessRenderer;
use crate::scene::canvas::CanvasData;
use crate::scene::model::SceneDocument;
use crate::storage::memory::MemoryStore;
use crate::variants::matcher::{PlatformVariant, SelectedOption};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use usvg::fontdb;

const PALETTES: &str = include_str!("../../fixtures/palettes.json");

#[derive(Default)]
struct FakePlatform {
    variants: Vec<PlatformVariant>,
    list_error: Option<String>,
    rejected: Vec<String>,
    lists: AtomicUsize,
    writes: Mutex<Vec<(String, Metafield)>>,
    write_delay_ms: u64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

#[async_trait]
impl CommercePlatform for FakePlatform {
    async fn list_variants(&self, _product_id: &str) -> SwatchResult<Vec<PlatformVariant>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        match &self.list_error {
            Some(msg) => Err(SwatchError::remote(msg.clone())),
            None => Ok(self.variants.clone()),
        }
    }

    async fn set_variant_metafield(
        &self,
        variant_id: &str,
        metafield: &Metafield,
    ) -> SwatchResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.write_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.write_delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.rejected.iter().any(|v| v == variant_id) {
            return Err(SwatchError::remote(format!("{variant_id} rejected")));
        }
        self.writes
            .lock()
            .unwrap()
            .push((variant_id.to_string(), metafield.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct MemAssets {
    uploads: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl AssetStore for MemAssets {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SwatchResult<String> {
        assert_eq!(content_type, "image/png");
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(bytes);
        Ok(format!("mem://thumb-{}", uploads.len()))
    }
}

struct FaceImages;

#[async_trait]
impl ImageSource for FaceImages {
    async fn fetch(&self, url: &str) -> SwatchResult<Vec<u8>> {
        if url.contains("missing") {
            return Err(SwatchError::remote(format!("404 {url}")));
        }
        let mut out = Vec::new();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| SwatchError::render(e.to_string()))?;
        Ok(out)
    }
}

fn variant(id: &str, color: &str, image: Option<&str>) -> PlatformVariant {
    PlatformVariant {
        id: id.to_string(),
        title: color.to_string(),
        selected_options: vec![
            SelectedOption { name: "Color".to_string(), value: color.to_string() },
            SelectedOption { name: "Size".to_string(), value: "M".to_string() },
        ],
        image_url: image.map(str::to_string),
    }
}

fn catalog() -> Vec<PlatformVariant> {
    vec![
        variant("v-red-s", "Red", Some("https://cdn/red.png")),
        variant("v-red-m", "red", None),
        variant("v-blue", "Blue", Some("https://cdn/blue.png")),
        variant("v-light-blue", "light-blue", Some("https://cdn/light-blue.png")),
        variant("v-green", "Green", None),
    ]
}

fn master_doc() -> SceneDocument {
    SceneDocument::from_value(json!({
        "dimensions": { "width": 120, "height": 80 },
        "backgroundColor": "#ffffff",
        "designableArea": { "x": 10, "y": 10, "width": 100, "height": 60, "cornerRadius": 6, "visible": true },
        "elements": {
            "text": [
                { "id": "name", "x": 20, "y": 20, "text": "TEAM", "fontSize": 14, "fill": "#c8102e" },
                { "id": "gold", "x": 20, "y": 40, "text": "GOLD", "fontSize": 14, "fill": "gold-gradient" }
            ],
            "shape": [
                { "id": "band", "x": 10, "y": 60, "shapeType": "rect", "width": 100, "height": 10,
                  "fillLinearGradientColorStops": [0, "#c8102e", 1, "#ffd100"] }
            ]
        },
        "assets": { "baseImage": "https://cdn/red.png" }
    }))
    .unwrap()
}

struct Harness {
    store: Arc<MemoryStore>,
    orchestrator: Arc<JobOrchestrator>,
    platform: Arc<FakePlatform>,
    assets: Arc<MemAssets>,
    worker: Worker,
    master: Template,
}

fn harness(platform: FakePlatform, chip: &str) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = Arc::new(JobOrchestrator::new(store.clone()));
    let platform = Arc::new(platform);
    let assets = Arc::new(MemAssets::default());
    let fonts = Arc::new(fontdb::Database::new());
    let renderer = HeadlessRenderer::new(fonts, Arc::new(AdvanceMeasure))
        .with_max_px(Some(60));
    let config = PipelineConfig {
        batch_size: 2,
        remote_timeout_ms: 2_000,
        worker_poll_ms: 20,
        ..PipelineConfig::default()
    };
    let ctx = WorkerContext {
        orchestrator: orchestrator.clone(),
        templates: store.clone(),
        palettes: Arc::new(PaletteBook::from_json(PALETTES).unwrap()),
        platform: platform.clone(),
        assets: assets.clone(),
        thumbnails: ThumbnailRenderer::new(
            Arc::new(renderer),
            Arc::new(FaceImages),
            Duration::from_secs(2),
        ),
        config,
    };
    let master = Template::new_master(
        "shop-a",
        "Tee",
        CanvasData::Single(master_doc()),
        Some(chip.to_string()),
        None,
    )
    .unwrap();
    store.insert(&master).unwrap();
    Harness {
        store,
        orchestrator,
        platform,
        assets,
        worker: Worker::new(ctx).unwrap(),
        master,
    }
}

impl Harness {
    async fn enqueue(&self) -> Job {
        let data = json!({ "masterTemplateId": self.master.id, "productId": "gid://shopify/Product/1" });
        self.orchestrator
            .create("shop-a", JobType::GenerateVariants, data, None)
            .await
            .unwrap()
    }

    fn job(&self, id: &str) -> Job {
        self.orchestrator.get(id, "shop-a").unwrap().unwrap()
    }

    fn variant_for(&self, chip: &str) -> Template {
        self.store
            .variants_of(&self.master.id)
            .unwrap()
            .into_iter()
            .find(|t| t.color_variant.as_deref() == Some(chip))
            .unwrap()
    }
}

fn report_of(job: &Job) -> GenerationReport {
    serde_json::from_value(job.result.clone().unwrap()).unwrap()
}

#[tokio::test]
async fn generates_binds_and_renders_every_combination() {
    let h = harness(FakePlatform { variants: catalog(), ..FakePlatform::default() }, "Red");
    let job = h.enqueue().await;

    assert_eq!(h.worker.drain().await.unwrap(), 2);

    let done = h.job(&job.id);
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!((done.progress, done.total), (8, Some(8)));
    let report = report_of(&done);
    assert_eq!(report.combinations, 4);
    assert_eq!(report.created, 2);
    assert_eq!(report.bound, 3);
    assert_eq!(report.unmatched, vec!["green".to_string()]);
    assert_eq!(report.summary, "Synced 3 of 4 variants");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].item, "green");
    assert_eq!(report.failures[0].phase, Phase::Persist);
    assert!(report.failures[0].message.contains("no palette mapping for chip 'Green'"));

    // Substitution and base image on the generated variant.
    let blue = h.variant_for("Blue");
    let doc = blue.canvas_data.front();
    assert_eq!(doc.elements.text[0].style.fill.as_deref(), Some("#0057b8"));
    assert_eq!(doc.elements.text[1].style.fill.as_deref(), Some("gold-gradient"));
    let stops = doc.elements.shape[0].fill_linear_gradient_color_stops.as_ref().unwrap();
    assert_eq!(stops.0[0].color, "#0057b8");
    assert_eq!(stops.0[1].color, "#f1c400");
    assert_eq!(doc.assets.base_image, "https://cdn/blue.png");
    assert_eq!(blue.shopify_variant_ids, vec!["v-blue".to_string()]);
    assert_eq!(blue.name, "Tee - Blue");

    // Light blue has no color3, so white stays white.
    let light = h.variant_for("light-blue");
    assert_eq!(light.canvas_data.front().background_color.as_str(), "#ffffff");

    // Every platform variant of every bound combination carries its template id.
    let writes = h.platform.writes.lock().unwrap().clone();
    let mut written: Vec<(String, String)> =
        writes.iter().map(|(v, m)| (v.clone(), m.value.clone())).collect();
    written.sort();
    let mut expected = vec![
        ("v-blue".to_string(), blue.id.clone()),
        ("v-light-blue".to_string(), light.id.clone()),
        ("v-red-m".to_string(), h.master.id.clone()),
        ("v-red-s".to_string(), h.master.id.clone()),
    ];
    expected.sort();
    assert_eq!(written, expected);
    assert!(writes.iter().all(|(_, m)| m.namespace == "swatchforge" && m.key == "template_id"));

    let master = h.store.get(&h.master.id).unwrap().unwrap();
    assert_eq!(master.shopify_variant_ids.len(), 2);
    assert_eq!(master.canvas_data, h.master.canvas_data);

    // The dependent thumbnail job ran after the parent.
    let thumbs_id = report.thumbnail_job_id.unwrap();
    let thumbs = h.job(&thumbs_id);
    assert_eq!(thumbs.depends_on.as_deref(), Some(job.id.as_str()));
    assert_eq!(thumbs.status, JobStatus::Completed);
    assert_eq!((thumbs.progress, thumbs.total), (3, Some(3)));
    let thumb_report: ThumbnailReport = serde_json::from_value(thumbs.result.unwrap()).unwrap();
    assert_eq!(thumb_report.summary, "Rendered 3 of 3 thumbnails");
    assert_eq!(h.assets.uploads.lock().unwrap().len(), 3);
    for id in [&h.master.id, &blue.id, &light.id] {
        let t = h.store.get(id).unwrap().unwrap();
        assert!(t.thumbnail_url.unwrap().starts_with("mem://thumb-"));
    }
}

#[tokio::test]
async fn failing_enumeration_fails_the_job() {
    let platform = FakePlatform {
        list_error: Some("product not found".to_string()),
        ..FakePlatform::default()
    };
    let h = harness(platform, "Red");
    let job = h.enqueue().await;
    h.worker.drain().await.unwrap();

    let failed = h.job(&job.id);
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(failed.error.unwrap().contains("product not found"));
    assert!(h.store.variants_of(&h.master.id).unwrap().is_empty());
    assert!(h.store.dependents_of(&job.id).unwrap().is_empty());
}

#[tokio::test]
async fn missing_source_palette_fails_before_any_remote_call() {
    let h = harness(FakePlatform { variants: catalog(), ..FakePlatform::default() }, "Purple");
    let job = h.enqueue().await;
    h.worker.drain().await.unwrap();

    let failed = h.job(&job.id);
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(
        failed.error.as_deref(),
        Some("validation error: no palette mapping for chip 'Purple'")
    );
    assert_eq!(h.platform.lists.load(Ordering::SeqCst), 0);
    assert!(h.store.variants_of(&h.master.id).unwrap().is_empty());
}

#[tokio::test]
async fn a_rejected_metafield_leaves_that_combination_unbound() {
    let platform = FakePlatform {
        variants: catalog(),
        rejected: vec!["v-red-m".to_string()],
        ..FakePlatform::default()
    };
    let h = harness(platform, "Red");
    let job = h.enqueue().await;
    h.worker.drain().await.unwrap();

    let report = report_of(&h.job(&job.id));
    assert_eq!(report.bound, 2);
    assert_eq!(report.summary, "Synced 2 of 4 variants");
    assert!(report.unmatched.contains(&"red".to_string()));
    let bind = report.failures.iter().find(|f| f.phase == Phase::Bind).unwrap();
    assert_eq!(bind.item, "red");
    assert!(bind.message.contains("v-red-m rejected"));

    let master = h.store.get(&h.master.id).unwrap().unwrap();
    assert!(master.shopify_variant_ids.is_empty());
    assert!(h.variant_for("Blue").is_bound());
}

#[tokio::test]
async fn regeneration_replaces_previous_variants() {
    let h = harness(FakePlatform { variants: catalog(), ..FakePlatform::default() }, "Red");
    h.enqueue().await;
    h.worker.drain().await.unwrap();
    let first: Vec<String> = h
        .store
        .variants_of(&h.master.id)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();

    h.enqueue().await;
    h.worker.drain().await.unwrap();
    let second = h.store.variants_of(&h.master.id).unwrap();

    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|t| !first.contains(&t.id)));
}

#[tokio::test]
async fn run_recovers_interrupted_jobs_and_stops_on_shutdown() {
    let h = harness(FakePlatform { variants: catalog(), ..FakePlatform::default() }, "Red");
    let stale = h.enqueue().await;
    h.orchestrator.start(&stale.id).await.unwrap();
    let fresh = h.enqueue().await;

    let orchestrator = h.orchestrator.clone();
    let fresh_id = fresh.id.clone();
    let shutdown = async move {
        loop {
            let job = orchestrator.get(&fresh_id, "shop-a").unwrap().unwrap();
            if job.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(30), h.worker.run(shutdown))
        .await
        .unwrap()
        .unwrap();

    let stale = h.job(&stale.id);
    assert_eq!(stale.status, JobStatus::Failed);
    assert_eq!(stale.error.as_deref(), Some(INTERRUPTED));
    assert_eq!(h.job(&fresh.id).status, JobStatus::Completed);
}

#[tokio::test]
async fn thumbnail_failures_are_per_template() {
    let h = harness(FakePlatform::default(), "Red");
    let broken = Template::new_variant(
        &h.master,
        "Blue",
        None,
        h.master.canvas_data.with_base_image("https://cdn/missing.png"),
    );
    h.store.insert(&broken).unwrap();

    let data = json!({ "templateIds": [h.master.id, broken.id, "nope"] });
    let job = h
        .orchestrator
        .create("shop-a", JobType::RenderThumbnails, data, Some(3))
        .await
        .unwrap();
    h.worker.drain().await.unwrap();

    let done = h.job(&job.id);
    assert_eq!(done.status, JobStatus::Completed);
    let report: ThumbnailReport = serde_json::from_value(done.result.unwrap()).unwrap();
    assert_eq!(report.summary, "Rendered 1 of 3 thumbnails");
    let items: Vec<&str> = report.failures.iter().map(|f| f.item.as_str()).collect();
    assert_eq!(items, vec![broken.id.as_str(), "nope"]);
    assert!(report.failures.iter().all(|f| f.phase == Phase::Render));
    assert!(h.store.get(&broken.id).unwrap().unwrap().thumbnail_url.is_none());
}

fn sized_catalog(colors: &[&str], sizes: usize) -> Vec<PlatformVariant> {
    let mut out = Vec::new();
    for color in colors {
        for size in 0..sizes {
            out.push(PlatformVariant {
                id: format!("v-{color}-{size}"),
                title: format!("{color} / {size}"),
                selected_options: vec![
                    SelectedOption { name: "Color".to_string(), value: color.to_string() },
                    SelectedOption { name: "Size".to_string(), value: size.to_string() },
                ],
                image_url: None,
            });
        }
    }
    out
}

#[tokio::test]
async fn metafield_writes_never_exceed_the_batch_size() {
    let platform = FakePlatform {
        variants: sized_catalog(&["Red", "Blue", "Light Blue"], 10),
        write_delay_ms: 10,
        ..FakePlatform::default()
    };
    let h = harness(platform, "Red");
    let job = h.enqueue().await;
    h.worker.drain().await.unwrap();

    let report = report_of(&h.job(&job.id));
    assert_eq!(report.summary, "Synced 3 of 3 variants");
    assert_eq!(h.platform.writes.lock().unwrap().len(), 30);
    let peak = h.platform.peak_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 2, "peak concurrent metafield writes = {peak}");
    assert!(peak >= 1);
}

#[tokio::test]
async fn one_failed_size_leaves_its_whole_color_unbound() {
    let platform = FakePlatform {
        variants: sized_catalog(&["Red", "Blue"], 4),
        rejected: vec!["v-Blue-2".to_string()],
        ..FakePlatform::default()
    };
    let h = harness(platform, "Red");
    let job = h.enqueue().await;
    h.worker.drain().await.unwrap();

    let report = report_of(&h.job(&job.id));
    assert_eq!(report.bound, 1);
    assert_eq!(report.unmatched, vec!["blue".to_string()]);
    assert_eq!(report.failures[0].phase, Phase::Bind);
    let message = &report.failures[0].message;
    assert!(message.contains("1 of 4 variants not bound"), "{message}");
    assert!(h.variant_for("Blue").shopify_variant_ids.is_empty());
    assert_eq!(h.store.get(&h.master.id).unwrap().unwrap().shopify_variant_ids.len(), 4);
}
