//! Color-variant generation and headless thumbnail rendering for customizable product designs.
//!
//! A master design (a [`SceneDocument`] per printable side) is re-colored once per sellable
//! (color, pattern) combination of a commerce product, bound to the matching platform variants,
//! and rendered to a PNG preview. Long-running work goes through durable [`Job`]s that a
//! [`Worker`] executes in the background.

#![forbid(unsafe_code)]

pub mod foundation;
pub mod geometry;
pub mod jobs;
pub mod palette;
pub mod pipeline;
pub mod platform;
pub mod render;
pub mod scene;
pub mod storage;
pub mod templates;
pub mod variants;

pub use foundation::core::{Dimensions, Rgba8};
pub use foundation::error::{SwatchError, SwatchResult};
pub use geometry::arc::{ArcGeometry, Sweep};
pub use geometry::measure::{AdvanceMeasure, TextMeasure};
pub use jobs::model::{Job, JobStatus, JobType, JobView};
pub use jobs::orchestrator::JobOrchestrator;
pub use jobs::store::JobStore;
pub use palette::model::{Palette, PaletteBook};
pub use palette::substitute::{SubstitutionStats, substitute, substitute_canvas};
pub use pipeline::config::PipelineConfig;
pub use pipeline::controller::PipelineController;
pub use pipeline::report::{GenerationReport, ItemFailure, ThumbnailReport};
pub use pipeline::worker::{Worker, WorkerContext};
pub use platform::assets::{AssetStore, DirAssetStore};
pub use platform::commerce::{CommercePlatform, Metafield};
pub use platform::images::{HttpImageSource, ImageSource};
pub use platform::shopify::{ShopifyClient, ShopifyConfig};
pub use render::headless::HeadlessRenderer;
pub use render::raster::ImageBundle;
pub use render::sandbox::RenderSandbox;
pub use render::thumbnails::ThumbnailRenderer;
pub use scene::canvas::CanvasData;
pub use scene::model::SceneDocument;
pub use storage::memory::MemoryStore;
pub use storage::sqlite::SqliteStore;
pub use templates::model::Template;
pub use templates::store::TemplateStore;
pub use variants::matcher::{PlatformVariant, VariantCatalog, VariantKey, match_templates};
pub use variants::normalize::{ChipKey, normalize_chip_key};
