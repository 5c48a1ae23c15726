use std::sync::Arc;

use usvg::fontdb;

use crate::{
    foundation::error::SwatchResult,
    geometry::measure::{AdvanceMeasure, TextMeasure},
    render::fonts::default_fontdb,
    render::raster::{FONTDB_SLOT, IMAGES_SLOT, ImageBundle, RasterScale, SCALE_SLOT, rasterize_png},
    render::sandbox::RenderSandbox,
    render::svg::scene_to_svg,
    scene::model::SceneDocument,
};

/// Renders scene documents to PNG inside a [`RenderSandbox`].
///
/// Rendering is synchronous and serialized process-wide; async callers should run it on a
/// blocking thread (see [`crate::render::thumbnails::ThumbnailRenderer`]).
#[derive(Clone)]
pub struct HeadlessRenderer {
    fontdb: Arc<fontdb::Database>,
    measure: Arc<dyn TextMeasure>,
    max_px: Option<u32>,
}

impl HeadlessRenderer {
    /// Renderer over an explicit font database and text measure.
    pub fn new(fontdb: Arc<fontdb::Database>, measure: Arc<dyn TextMeasure>) -> Self {
        Self {
            fontdb,
            measure,
            max_px: None,
        }
    }

    /// Renderer over system fonts and [`AdvanceMeasure`].
    pub fn with_default_fonts() -> Self {
        Self::new(default_fontdb(), Arc::new(AdvanceMeasure))
    }

    /// Limit the longer output side to `max_px` pixels.
    pub fn with_max_px(mut self, max_px: Option<u32>) -> Self {
        self.max_px = max_px;
        self
    }

    /// Text measure shared with arc layout.
    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// Render `doc` with prefetched `images` to PNG bytes.
    #[tracing::instrument(skip_all, fields(images = images.len()))]
    pub fn render(&self, doc: &SceneDocument, images: ImageBundle) -> SwatchResult<Vec<u8>> {
        let svg = scene_to_svg(doc, self.measure())?;
        let scale = RasterScale::fit(doc.dimensions.width, doc.dimensions.height, self.max_px);

        let mut sandbox = RenderSandbox::enter();
        sandbox.install(FONTDB_SLOT, Arc::clone(&self.fontdb));
        sandbox.install(IMAGES_SLOT, Arc::new(images));
        sandbox.install(SCALE_SLOT, Arc::new(scale));
        let png = rasterize_png(&svg);
        drop(sandbox);

        let png = png?;
        tracing::debug!(bytes = png.len(), "rendered");
        Ok(png)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/headless.rs"]
mod tests;
