//! Circular-arc geometry for curved text.
//!
//! The arc is expressed in the element's local frame: the origin sits on the circle's center
//! horizontally at the element's `x`, vertically at [`ArcGeometry::center_y`]. Text is laid on
//! the arc with `startOffset = 50%` so it stays centered at the apex.
//!
//! Two rules keep the arc visually anchored while the user edits it:
//!
//! - Unflipped text pins the top edge: `top_y` is that edge, `center_y = top_y + radius`, and a
//!   radius change leaves `top_y` alone.
//! - Flipped text pins the bottom edge: `center_y = top_y - radius`, and a radius change moves
//!   `top_y` by `2 * (new - old)`.

use std::f64::consts::PI;

use kurbo::Shape as _;

use crate::{
    foundation::core::{Point, Rect, Vec2},
    foundation::error::{SwatchError, SwatchResult},
    geometry::measure::TextMeasure,
    scene::model::CurvedTextElement,
};

/// Largest angle an arc may span (270°).
pub const MAX_ANGLE_SPAN: f64 = 1.5 * PI;

/// Drawing direction of the arc in y-down screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Sweep {
    /// SVG sweep flag 1.
    Clockwise,
    /// SVG sweep flag 0.
    CounterClockwise,
}

impl Sweep {
    /// SVG `sweep-flag` value.
    pub fn flag(self) -> u8 {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => 0,
        }
    }
}

/// Resolved arc for one curved-text element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcGeometry {
    /// Arc radius.
    pub radius: f64,
    /// Angle covered by the text, clamped to [`MAX_ANGLE_SPAN`].
    pub angle_span: f64,
    /// Angle of the path's first point (radians, y-down).
    pub start_angle: f64,
    /// Angle of the path's last point.
    pub end_angle: f64,
    /// First point, relative to the local origin.
    pub start: Point,
    /// Last point, relative to the local origin.
    pub end: Point,
    /// SVG `large-arc-flag`.
    pub large_arc: bool,
    /// Drawing direction.
    pub sweep: Sweep,
    /// Vertical position of the circle's center in document space.
    pub center_y: f64,
}

impl ArcGeometry {
    /// Compute the arc for text of rendered length `text_len`.
    pub fn compute(text_len: f64, radius: f64, flipped: bool, top_y: f64) -> SwatchResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SwatchError::validation(
                "arc radius must be finite and > 0",
            ));
        }
        if !text_len.is_finite() || text_len < 0.0 {
            return Err(SwatchError::validation(
                "arc text length must be finite and >= 0",
            ));
        }
        if !top_y.is_finite() {
            return Err(SwatchError::validation("arc topY must be finite"));
        }

        let angle_span = (text_len / radius).min(MAX_ANGLE_SPAN);
        let (start_angle, end_angle, sweep, center_y) = if flipped {
            (
                PI / 2.0 + angle_span / 2.0,
                PI / 2.0 - angle_span / 2.0,
                Sweep::CounterClockwise,
                top_y - radius,
            )
        } else {
            (
                -PI / 2.0 - angle_span / 2.0,
                -PI / 2.0 + angle_span / 2.0,
                Sweep::Clockwise,
                top_y + radius,
            )
        };

        let at = |a: f64| Point::new(a.cos() * radius, a.sin() * radius);
        Ok(Self {
            radius,
            angle_span,
            start_angle,
            end_angle,
            start: at(start_angle),
            end: at(end_angle),
            large_arc: angle_span > PI,
            sweep,
            center_y,
        })
    }

    /// Arc for a curved-text element, measured with `measure`.
    pub fn for_element(el: &CurvedTextElement, measure: &dyn TextMeasure) -> SwatchResult<Self> {
        Self::compute(el.text_length(measure), el.radius, el.flipped, el.top_y)
    }

    /// SVG path data for the arc in local coordinates.
    ///
    /// Coordinates use fixed three-decimal formatting so every caller emits byte-identical
    /// paths for the same input.
    pub fn svg_path(&self) -> String {
        format!(
            "M {:.3} {:.3} A {:.3} {:.3} 0 {} {} {:.3} {:.3}",
            self.start.x,
            self.start.y,
            self.radius,
            self.radius,
            u8::from(self.large_arc),
            self.sweep.flag(),
            self.end.x,
            self.end.y
        )
    }

    /// Local bounding box of the arc stroke itself.
    pub fn bounds(&self) -> Rect {
        let svg = kurbo::SvgArc {
            from: self.start,
            to: self.end,
            radii: Vec2::new(self.radius, self.radius),
            x_rotation: 0.0,
            large_arc: self.large_arc,
            sweep: self.sweep == Sweep::Clockwise,
        };
        match kurbo::Arc::from_svg_arc(&svg) {
            Some(arc) => arc.bounding_box(),
            None => Rect::from_points(self.start, self.end),
        }
    }
}

impl CurvedTextElement {
    /// Rendered length of the element's text.
    pub fn text_length(&self, measure: &dyn TextMeasure) -> f64 {
        measure.text_width(
            &self.text,
            &self.style.font_family,
            self.style.font_size,
            self.style.is_bold(),
        )
    }

    /// Copy with a new radius, keeping the pinned edge in place.
    pub fn with_radius(&self, new_radius: f64) -> SwatchResult<Self> {
        if !new_radius.is_finite() || new_radius <= 0.0 {
            return Err(SwatchError::validation(
                "arc radius must be finite and > 0",
            ));
        }
        let mut out = self.clone();
        if self.flipped {
            out.top_y = self.top_y + 2.0 * (new_radius - self.radius);
        }
        out.radius = new_radius;
        Ok(out)
    }

    /// Copy with the flip state toggled, keeping the same circle.
    ///
    /// Flipping twice returns the original `top_y`.
    pub fn toggled_flip(&self) -> Self {
        let mut out = self.clone();
        if self.flipped {
            out.top_y = self.top_y - 2.0 * self.radius;
        } else {
            out.top_y = self.top_y + 2.0 * self.radius;
        }
        out.flipped = !self.flipped;
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/arc.rs"]
mod tests;
