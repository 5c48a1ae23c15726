//! Palette substitution: re-color a scene by slot position.
//!
//! Known fields are visited through the typed model. Editor data the model does not interpret
//! (every `extra` map) goes through a generic JSON walk that applies the same rules, so a color
//! nested anywhere in the document is treated alike.

use serde_json::{Map, Value};

use crate::{
    palette::model::Palette,
    scene::canvas::CanvasData,
    scene::model::{Background, SceneDocument},
    scene::stops::ColorStops,
};

/// JSON keys whose string value is a paint.
const PAINT_KEYS: [&str; 2] = ["fill", "stroke"];

/// JSON keys holding alternating `[offset, color, ...]` arrays.
const STOP_KEYS: [&str; 3] = [
    "fillLinearGradientColorStops",
    "fillRadialGradientColorStops",
    "colorStops",
];

/// What a substitution pass touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionStats {
    /// Color values inspected.
    pub visited: usize,
    /// Color values replaced.
    pub replaced: usize,
}

impl std::ops::AddAssign for SubstitutionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.visited += rhs.visited;
        self.replaced += rhs.replaced;
    }
}

/// Re-color `doc` from `source` to `target`.
///
/// A color equal to `source.colorN` becomes `target.colorN`. Colors that match no source slot,
/// or whose target slot is empty, are left as they are; sentinels such as `gold-gradient` and
/// `transparent` therefore pass through. Gradient offsets are never touched.
pub fn substitute(
    doc: &SceneDocument,
    source: &Palette,
    target: &Palette,
) -> (SceneDocument, SubstitutionStats) {
    let mut out = doc.clone();
    let mut pass = Recolor::new(source, target);
    pass.document(&mut out);
    (out, pass.stats)
}

/// [`substitute`] applied to every side of a template's canvas.
pub fn substitute_canvas(
    canvas: &CanvasData,
    source: &Palette,
    target: &Palette,
) -> (CanvasData, SubstitutionStats) {
    let mut stats = SubstitutionStats::default();
    let out = canvas.map_sides(|doc| {
        let (side, s) = substitute(doc, source, target);
        stats += s;
        side
    });
    (out, stats)
}

struct Recolor<'a> {
    source: &'a Palette,
    target: &'a Palette,
    stats: SubstitutionStats,
}

impl<'a> Recolor<'a> {
    fn new(source: &'a Palette, target: &'a Palette) -> Self {
        Self {
            source,
            target,
            stats: SubstitutionStats::default(),
        }
    }

    fn lookup(&self, color: &str) -> Option<&'a str> {
        let slot = self.source.slot_of(color)?;
        self.target.slot(slot)
    }

    fn color(&mut self, value: &mut String) {
        self.stats.visited += 1;
        if let Some(replacement) = self.lookup(value) {
            if replacement != value.as_str() {
                *value = replacement.to_string();
            }
            self.stats.replaced += 1;
        }
    }

    fn paint(&mut self, value: &mut Option<String>) {
        if let Some(v) = value {
            self.color(v);
        }
    }

    fn stops(&mut self, stops: &mut ColorStops) {
        for stop in stops.iter_mut() {
            self.color(&mut stop.color);
        }
    }

    fn document(&mut self, doc: &mut SceneDocument) {
        if let Background::Solid(c) = &mut doc.background_color {
            self.color(c);
        }
        if let Some(g) = &mut doc.background_gradient {
            self.stops(&mut g.color_stops);
            self.extra(&mut g.extra);
        }

        let els = &mut doc.elements;
        for e in &mut els.text {
            self.paint(&mut e.style.fill);
            self.paint(&mut e.style.stroke);
            self.extra(&mut e.extra);
        }
        for e in &mut els.curved_text {
            self.paint(&mut e.style.fill);
            self.paint(&mut e.style.stroke);
            self.extra(&mut e.extra);
        }
        for e in &mut els.gradient_text {
            self.extra(&mut e.extra);
        }
        for e in &mut els.image {
            self.extra(&mut e.extra);
        }
        for e in &mut els.shape {
            self.paint(&mut e.fill);
            self.paint(&mut e.stroke);
            if let Some(stops) = &mut e.fill_linear_gradient_color_stops {
                self.stops(stops);
            }
            if let Some(stops) = &mut e.fill_radial_gradient_color_stops {
                self.stops(stops);
            }
            self.extra(&mut e.extra);
        }

        self.extra(&mut doc.assets.extra);
        self.extra(&mut doc.extra);
    }

    fn extra(&mut self, map: &mut Map<String, Value>) {
        for (key, value) in map.iter_mut() {
            self.entry(key, value);
        }
    }

    fn entry(&mut self, key: &str, value: &mut Value) {
        match value {
            Value::String(s) if PAINT_KEYS.contains(&key) => self.color(s),
            Value::Array(items) if STOP_KEYS.contains(&key) => {
                // Odd entries are colors, even entries offsets.
                for item in items.iter_mut().skip(1).step_by(2) {
                    match item {
                        Value::String(s) => self.color(s),
                        other => self.value(other),
                    }
                }
            }
            other => self.value(other),
        }
    }

    fn value(&mut self, value: &mut Value) {
        match value {
            Value::Object(map) => self.extra(map),
            Value::Array(items) => {
                for item in items {
                    self.value(item);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/palette/substitute.rs"]
mod tests;
