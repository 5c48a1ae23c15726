//! SVG to PNG rasterization through `usvg`/`resvg`.
//!
//! The backend reads its environment from the global slots below; callers install them through
//! a [`RenderSandbox`](crate::render::sandbox::RenderSandbox).

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use usvg::fontdb;

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    render::fonts::font_resolver,
    render::sandbox::global,
    render::svg::image_key,
};

/// Slot holding the `fontdb::Database` used for text.
pub const FONTDB_SLOT: &str = "swatchforge.render.fontdb";
/// Slot holding the [`ImageBundle`] that image references resolve against.
pub const IMAGES_SLOT: &str = "swatchforge.render.images";
/// Slot holding the [`RasterScale`] applied to the canvas.
pub const SCALE_SLOT: &str = "swatchforge.render.scale";

/// Largest raster side accepted.
pub const MAX_DIM: u32 = 8_192;

/// Output scale factor relative to the document's canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterScale(pub f64);

impl RasterScale {
    /// Scale so the longer canvas side is at most `max_px`; never enlarges.
    pub fn fit(width: f64, height: f64, max_px: Option<u32>) -> Self {
        match max_px {
            Some(max) if max > 0 => Self((f64::from(max) / width.max(height)).min(1.0)),
            _ => Self(1.0),
        }
    }
}

/// Image bytes prefetched before rendering, keyed by [`image_key`] and normalized to PNG.
#[derive(Clone, Debug, Default)]
pub struct ImageBundle {
    images: HashMap<String, Arc<Vec<u8>>>,
}

impl ImageBundle {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` fetched from `url` and store them as PNG.
    pub fn insert(&mut self, url: &str, bytes: &[u8]) -> SwatchResult<()> {
        let img = image::load_from_memory(bytes)
            .with_context(|| format!("decode image '{url}'"))
            .map_err(|e| SwatchError::render(format!("{e:#}")))?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| SwatchError::render(format!("re-encode image '{url}': {e}")))?;
        self.images.insert(image_key(url), Arc::new(png));
        Ok(())
    }

    /// PNG bytes for a key emitted by the SVG lowering.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.images.get(key).cloned()
    }

    /// `true` when an image for `url` is present.
    pub fn contains_url(&self, url: &str) -> bool {
        self.images.contains_key(&image_key(url))
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when no image is present.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Rasterize `svg` and encode it as PNG, using the installed environment.
///
/// A missing font database slot is an error. A missing image bundle renders without images and
/// a missing scale renders at 1:1.
pub fn rasterize_png(svg: &str) -> SwatchResult<Vec<u8>> {
    let fontdb = global::<fontdb::Database>(FONTDB_SLOT)
        .ok_or_else(|| SwatchError::render("no font database installed"))?;
    let images = global::<ImageBundle>(IMAGES_SLOT).unwrap_or_default();
    let scale = global::<RasterScale>(SCALE_SLOT).map_or(1.0, |s| s.0);

    let mut opts = usvg::Options {
        fontdb,
        font_resolver: font_resolver(),
        ..usvg::Options::default()
    };
    opts.image_href_resolver = usvg::ImageHrefResolver {
        resolve_data: usvg::ImageHrefResolver::default_data_resolver(),
        resolve_string: Box::new(move |href: &str, _: &usvg::Options| {
            images.get(href).map(usvg::ImageKind::PNG)
        }),
    };

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| SwatchError::render(format!("parse lowered svg: {e}")))?;

    let size = tree.size();
    let width = raster_side(f64::from(size.width()) * scale)?;
    let height = raster_side(f64::from(size.height()) * scale)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SwatchError::render("failed to allocate pixmap"))?;
    let sx = width as f32 / size.width();
    let sy = height as f32 / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    encode_png(&pixmap)
}

fn raster_side(v: f64) -> SwatchResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(SwatchError::render("raster size must be finite and > 0"));
    }
    let px = v.round().max(1.0);
    if px > f64::from(MAX_DIM) {
        return Err(SwatchError::render(format!(
            "raster size too large: {px} (max {MAX_DIM})"
        )));
    }
    Ok(px as u32)
}

fn encode_png(pixmap: &resvg::tiny_skia::Pixmap) -> SwatchResult<Vec<u8>> {
    let mut straight = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        straight.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), straight)
        .ok_or_else(|| SwatchError::render("pixel buffer size mismatch"))?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| SwatchError::render(format!("encode png: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
