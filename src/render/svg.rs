//! Lowering of a [`SceneDocument`] to SVG markup for the raster backend.
//!
//! Layering is fixed: the base photograph covers the canvas first, then one group clipped to
//! the designable area holds the background and every element in layer order. Every color is
//! parsed and re-emitted as `#rrggbb` plus an opacity and all text is escaped, so document
//! content never reaches the markup verbatim. Image URLs are replaced by [`image_key`]s that the
//! raster backend resolves against prefetched bytes.

use crate::{
    foundation::core::Rgba8,
    foundation::error::SwatchResult,
    foundation::math::digest_hex,
    geometry::arc::ArcGeometry,
    geometry::measure::TextMeasure,
    scene::model::{
        Background, CurvedTextElement, DesignableArea, ElementBase, ElementRef,
        GOLD_GRADIENT, GradientTextElement, ImageElement, SceneDocument, ShapeElement, ShapeType,
        TextElement, TextStyle,
    },
    scene::stops::ColorStops,
};

/// Fixed stops of the gold gradient used by `gold-gradient` fills and gradient text.
pub const GOLD_STOPS: [(f64, &str); 3] = [(0.0, "#f6e27a"), (0.5, "#cb9b51"), (1.0, "#f6f2c0")];

/// Baseline offset of top-left positioned text, in ems.
pub const ASCENT_EM: f64 = 0.8;

/// Distance between consecutive lines of text, in ems.
pub const LINE_HEIGHT_EM: f64 = 1.0;

const CLIP_ID: &str = "designable-area";
const GOLD_ID: &str = "gold-gradient";
const BACKGROUND_ID: &str = "background-gradient";

/// Reference under which the bytes of `url` are looked up at raster time.
pub fn image_key(url: &str) -> String {
    format!("image-{}", digest_hex(url.as_bytes()))
}

/// Every image URL the document draws: base photograph first, then image elements in layer
/// order, without duplicates.
pub fn referenced_images(doc: &SceneDocument) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let base = doc.assets.base_image.trim();
    if !base.is_empty() {
        out.push(base.to_string());
    }
    for el in doc.layers() {
        if let ElementRef::Image(img) = el
            && !out.iter().any(|u| u == &img.url)
        {
            out.push(img.url.clone());
        }
    }
    out
}

/// Lower a validated copy of `doc` to a standalone SVG document.
#[tracing::instrument(skip_all, fields(elements = doc.elements.len()))]
pub fn scene_to_svg(doc: &SceneDocument, measure: &dyn TextMeasure) -> SwatchResult<String> {
    doc.validate()?;
    let mut w = SvgWriter {
        measure,
        defs: String::new(),
        body: String::new(),
        next_id: 0,
    };
    w.document(doc)?;

    let (width, height) = (num(doc.dimensions.width), num(doc.dimensions.height));
    Ok(format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink""#,
            r#" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs>{defs}</defs>{body}</svg>"#
        ),
        w = width,
        h = height,
        defs = w.defs,
        body = w.body,
    ))
}

struct SvgWriter<'a> {
    measure: &'a dyn TextMeasure,
    defs: String,
    body: String,
    next_id: usize,
}

impl SvgWriter<'_> {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn document(&mut self, doc: &SceneDocument) -> SwatchResult<()> {
        self.defs.push_str(&linear_gradient(
            GOLD_ID,
            r#"x1="0" y1="0" x2="0" y2="1""#,
            &gold_stops(),
        ));
        self.defs.push_str(&clip_path(&doc.designable_area));

        let (w, h) = (num(doc.dimensions.width), num(doc.dimensions.height));
        let base = doc.assets.base_image.trim();
        if !base.is_empty() {
            self.body.push_str(&format!(
                r#"<image xlink:href="{}" x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="xMidYMid slice"/>"#,
                image_key(base)
            ));
        }

        self.body
            .push_str(&format!(r#"<g clip-path="url(#{CLIP_ID})">"#));
        self.background(doc)?;
        for el in doc.layers() {
            match el {
                ElementRef::Text(e) => self.text(e)?,
                ElementRef::CurvedText(e) => self.curved_text(e)?,
                ElementRef::GradientText(e) => self.gradient_text(e),
                ElementRef::Image(e) => self.image(e),
                ElementRef::Shape(e) => self.shape(e)?,
            }
        }
        self.body.push_str("</g>");
        Ok(())
    }

    fn background(&mut self, doc: &SceneDocument) -> SwatchResult<()> {
        let fill = match (&doc.background_color, &doc.background_gradient) {
            (Background::Transparent, _) => return Ok(()),
            (Background::Solid(c), _) => paint("fill", c)?,
            (Background::LinearGradient, Some(g)) => {
                let a = &doc.designable_area;
                let geom = format!(
                    r#"gradientUnits="userSpaceOnUse" x1="{x}" y1="{y1}" x2="{x}" y2="{y2}""#,
                    x = num(a.x),
                    y1 = num(a.y),
                    y2 = num(a.y + a.height),
                );
                self.defs
                    .push_str(&linear_gradient(BACKGROUND_ID, &geom, &stops(&g.color_stops)?));
                format!(r#"fill="url(#{BACKGROUND_ID})""#)
            }
            (Background::RadialGradient, Some(g)) => {
                let a = &doc.designable_area;
                let geom = format!(
                    r#"gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}""#,
                    num(a.x + a.width / 2.0),
                    num(a.y + a.height / 2.0),
                    num(a.width.max(a.height) / 2.0),
                );
                self.defs
                    .push_str(&radial_gradient(BACKGROUND_ID, &geom, &stops(&g.color_stops)?));
                format!(r#"fill="url(#{BACKGROUND_ID})""#)
            }
            // Validation guarantees a gradient is present for gradient sentinels.
            (_, None) => return Ok(()),
        };
        self.body.push_str(&format!(
            r#"<rect x="0" y="0" width="{}" height="{}" {fill}/>"#,
            num(doc.dimensions.width),
            num(doc.dimensions.height),
        ));
        Ok(())
    }

    fn text(&mut self, e: &TextElement) -> SwatchResult<()> {
        let attrs = text_attrs(&e.style)?;
        let mut lines = String::new();
        for (i, line) in e.text.split('\n').enumerate() {
            let y = e.style.font_size * (ASCENT_EM + LINE_HEIGHT_EM * i as f64);
            lines.push_str(&format!(
                r#"<tspan x="0" y="{}">{}</tspan>"#,
                num(y),
                escape(line)
            ));
        }
        self.group(&e.base, e.base.y, &format!("<text {attrs}>{lines}</text>"));
        Ok(())
    }

    fn curved_text(&mut self, e: &CurvedTextElement) -> SwatchResult<()> {
        if e.text.is_empty() {
            return Ok(());
        }
        let arc = ArcGeometry::for_element(e, self.measure)?;
        let id = self.fresh_id("arc");
        self.defs
            .push_str(&format!(r#"<path id="{id}" d="{}"/>"#, arc.svg_path()));
        let attrs = text_attrs(&e.style)?;
        let inner = format!(
            r##"<text {attrs} text-anchor="middle"><textPath xlink:href="#{id}" startOffset="50%">{}</textPath></text>"##,
            escape(&e.text)
        );
        self.group(&e.base, arc.center_y, &inner);
        Ok(())
    }

    fn gradient_text(&mut self, e: &GradientTextElement) {
        let inner = format!(
            r#"<text x="0" y="{}" font-family="{}" font-size="{}" fill="url(#{GOLD_ID})">{}</text>"#,
            num(e.font_size * ASCENT_EM),
            escape(&e.font_family),
            num(e.font_size),
            escape(&e.text)
        );
        self.group(&e.base, e.base.y, &inner);
    }

    fn image(&mut self, e: &ImageElement) {
        let inner = format!(
            r#"<image xlink:href="{}" x="0" y="0" width="{}" height="{}" preserveAspectRatio="none"/>"#,
            image_key(&e.url),
            num(e.width),
            num(e.height)
        );
        self.group(&e.base, e.base.y, &inner);
    }

    fn shape(&mut self, e: &ShapeElement) -> SwatchResult<()> {
        let fill = if let Some(s) = &e.fill_radial_gradient_color_stops {
            let id = self.fresh_id("fill");
            self.defs.push_str(&radial_gradient(
                &id,
                r#"cx="0.5" cy="0.5" r="0.5""#,
                &stops(s)?,
            ));
            format!(r#"fill="url(#{id})""#)
        } else if let Some(s) = &e.fill_linear_gradient_color_stops {
            let id = self.fresh_id("fill");
            self.defs.push_str(&linear_gradient(
                &id,
                r#"x1="0" y1="0" x2="1" y2="0""#,
                &stops(s)?,
            ));
            format!(r#"fill="url(#{id})""#)
        } else {
            match &e.fill {
                Some(c) => paint("fill", c)?,
                None => r#"fill="none""#.to_string(),
            }
        };
        let stroke = stroke_attrs(e.stroke.as_deref(), e.stroke_width)?;

        let geometry = match e.shape_type {
            ShapeType::Rect => {
                let r = num(e.corner_radius.unwrap_or(0.0));
                format!(
                    r#"<rect x="0" y="0" width="{}" height="{}" rx="{r}" ry="{r}" {fill}{stroke}/>"#,
                    num(e.width),
                    num(e.height),
                )
            }
            ShapeType::Ellipse => format!(
                r#"<ellipse cx="0" cy="0" rx="{}" ry="{}" {fill}{stroke}/>"#,
                num(e.width / 2.0),
                num(e.height / 2.0),
            ),
            ShapeType::Ring => {
                let d = format!(
                    "{} {}",
                    circle_path(e.outer_radius.unwrap_or(0.0)),
                    circle_path(e.inner_radius.unwrap_or(0.0))
                );
                format!(r#"<path fill-rule="evenodd" d="{d}" {fill}{stroke}/>"#)
            }
        };
        self.group(&e.base, e.base.y, &geometry);
        Ok(())
    }

    fn group(&mut self, base: &ElementBase, y: f64, inner: &str) {
        let mut transform = format!("translate({} {})", num(base.x), num(y));
        if base.rotation != 0.0 {
            transform.push_str(&format!(" rotate({})", num(base.rotation)));
        }
        if base.scale_x != 1.0 || base.scale_y != 1.0 {
            transform.push_str(&format!(" scale({} {})", num(base.scale_x), num(base.scale_y)));
        }
        let opacity = if base.opacity < 1.0 {
            format!(r#" opacity="{}""#, num(base.opacity))
        } else {
            String::new()
        };
        self.body
            .push_str(&format!(r#"<g transform="{transform}"{opacity}>{inner}</g>"#));
    }
}

fn text_attrs(style: &TextStyle) -> SwatchResult<String> {
    let fill = match style.fill.as_deref() {
        Some(GOLD_GRADIENT) => format!(r#"fill="url(#{GOLD_ID})""#),
        Some(c) => paint("fill", c)?,
        None => r##"fill="#000000""##.to_string(),
    };
    Ok(format!(
        r#"font-family="{}" font-size="{}" font-weight="{}" {fill}{}"#,
        escape(&style.font_family),
        num(style.font_size),
        escape(&style.font_weight),
        stroke_attrs(style.stroke.as_deref(), style.stroke_width)?,
    ))
}

fn stroke_attrs(stroke: Option<&str>, width: Option<f64>) -> SwatchResult<String> {
    let width = width.unwrap_or(1.0);
    match stroke {
        Some(c) if width > 0.0 => Ok(format!(
            r#" {} stroke-width="{}""#,
            paint("stroke", c)?,
            num(width)
        )),
        _ => Ok(String::new()),
    }
}

/// `fill="#rrggbb"` (or `stroke=`) with an opacity attribute when translucent.
fn paint(attr: &str, color: &str) -> SwatchResult<String> {
    let c = Rgba8::parse(color)?;
    if c.a == 0 {
        return Ok(format!(r#"{attr}="none""#));
    }
    let mut out = format!(r#"{attr}="{}""#, c.to_hex_rgb());
    if c.a < 255 {
        out.push_str(&format!(r#" {attr}-opacity="{}""#, num(c.opacity())));
    }
    Ok(out)
}

fn stops(stops: &ColorStops) -> SwatchResult<String> {
    let mut out = String::new();
    for s in stops.iter() {
        out.push_str(&stop(s.offset, Rgba8::parse(&s.color)?));
    }
    Ok(out)
}

fn gold_stops() -> String {
    GOLD_STOPS
        .iter()
        .filter_map(|(offset, color)| Rgba8::parse(color).ok().map(|c| stop(*offset, c)))
        .collect()
}

fn stop(offset: f64, c: Rgba8) -> String {
    format!(
        r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
        num(offset),
        c.to_hex_rgb(),
        num(c.opacity())
    )
}

fn linear_gradient(id: &str, geometry: &str, stops: &str) -> String {
    format!(r#"<linearGradient id="{id}" {geometry}>{stops}</linearGradient>"#)
}

fn radial_gradient(id: &str, geometry: &str, stops: &str) -> String {
    format!(r#"<radialGradient id="{id}" {geometry}>{stops}</radialGradient>"#)
}

fn clip_path(a: &DesignableArea) -> String {
    let r = num(a.corner_radius);
    format!(
        r#"<clipPath id="{CLIP_ID}"><rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}"/></clipPath>"#,
        num(a.x),
        num(a.y),
        num(a.width),
        num(a.height),
    )
}

/// Closed circle around the origin as two half arcs.
fn circle_path(r: f64) -> String {
    let (p, n) = (num(r), num(-r));
    format!("M {p} 0 A {p} {p} 0 1 0 {n} 0 A {p} {p} 0 1 0 {p} 0 Z")
}

/// Shortest decimal form with at most three fractional digits.
pub(crate) fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape text for use in element content and double-quoted attributes.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
