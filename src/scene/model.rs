use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::{
    foundation::core::{Dimensions, Rgba8},
    foundation::error::{SwatchError, SwatchResult},
    scene::stops::ColorStops,
};

/// Fill sentinel for text drawn with the fixed gold gradient.
pub const GOLD_GRADIENT: &str = "gold-gradient";

/// Background sentinel: transparent canvas.
pub const TRANSPARENT: &str = "transparent";

/// One printable side of a product.
///
/// This is the JSON document the editor reads and writes. It is validated only at the boundary
/// ([`SceneDocument::from_json`]); every transform in this crate returns a new document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// Canvas extent; fixed once the document is first persisted.
    pub dimensions: Dimensions,
    /// Literal color, `transparent`, or a gradient sentinel.
    #[serde(default)]
    pub background_color: Background,
    /// Present only when [`SceneDocument::background_color`] is a gradient sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<BackgroundGradient>,
    /// Clip region for every element.
    pub designable_area: DesignableArea,
    /// Element collections, one per kind.
    #[serde(default)]
    pub elements: Elements,
    /// Referenced assets.
    #[serde(default)]
    pub assets: SceneAssets,
    /// Editor fields this crate does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Canvas background as authored.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Background {
    /// No background fill.
    #[default]
    Transparent,
    /// Plain CSS color, stored exactly as authored.
    Solid(String),
    /// Use [`SceneDocument::background_gradient`] as a linear gradient.
    LinearGradient,
    /// Use [`SceneDocument::background_gradient`] as a radial gradient.
    RadialGradient,
}

impl Background {
    /// Wire form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transparent => TRANSPARENT,
            Self::Solid(c) => c,
            Self::LinearGradient => "linear-gradient",
            Self::RadialGradient => "radial-gradient",
        }
    }

    /// `true` for the two gradient sentinels.
    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::LinearGradient | Self::RadialGradient)
    }
}

impl serde::Serialize for Background {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Background {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "" | TRANSPARENT => Self::Transparent,
            "linear-gradient" => Self::LinearGradient,
            "radial-gradient" => Self::RadialGradient,
            _ => Self::Solid(s),
        })
    }
}

/// Gradient geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    /// Top-to-bottom across the designable area.
    Linear,
    /// Centered on the designable area.
    Radial,
}

/// Canvas background gradient.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundGradient {
    /// Linear or radial.
    #[serde(rename = "type")]
    pub kind: GradientKind,
    /// Alternating `[offset, color, ...]` stops.
    pub color_stops: ColorStops,
    /// Unrecognized gradient fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rounded-rectangle clip region inside which all elements render.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignableArea {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Corner radius; at most half the shorter side.
    #[serde(default)]
    pub corner_radius: f64,
    /// Whether the editor shows the outline (the clip applies regardless).
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// Assets referenced by the document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneAssets {
    /// Product-face photograph drawn beneath everything; empty when absent.
    #[serde(default)]
    pub base_image: String,
    /// Unrecognized asset fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The five disjoint, ordered element collections.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elements {
    /// Straight text.
    #[serde(default)]
    pub text: Vec<TextElement>,
    /// Text along a circular arc.
    #[serde(default)]
    pub curved_text: Vec<CurvedTextElement>,
    /// Text with the fixed gold gradient fill.
    #[serde(default)]
    pub gradient_text: Vec<GradientTextElement>,
    /// Raster images.
    #[serde(default)]
    pub image: Vec<ImageElement>,
    /// Rectangles, ellipses, rings.
    #[serde(default)]
    pub shape: Vec<ShapeElement>,
}

/// Fields shared by every element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    /// Unique across the whole document.
    pub id: String,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    /// Horizontal scale.
    #[serde(default = "default_one")]
    pub scale_x: f64,
    /// Vertical scale.
    #[serde(default = "default_one")]
    pub scale_y: f64,
    /// Layer order; assigned on save when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Element opacity in `[0, 1]`.
    #[serde(default = "default_one")]
    pub opacity: f64,
}

/// Font and paint settings shared by text and curved text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Font family name.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS font weight (`normal`, `bold`, `100`..`900`).
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    /// Fill color, or [`GOLD_GRADIENT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

/// Straight text, positioned by its top-left corner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Common fields.
    #[serde(flatten)]
    pub base: ElementBase,
    /// Text content.
    pub text: String,
    /// Styling.
    #[serde(flatten)]
    pub style: TextStyle,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text laid along a circular arc.
///
/// `base.x` is the arc's horizontal center. `top_y` is derived from the pinned visual edge and
/// the radius; see [`crate::geometry::arc`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvedTextElement {
    /// Common fields.
    #[serde(flatten)]
    pub base: ElementBase,
    /// Text content.
    pub text: String,
    /// Pinned-edge coordinate.
    pub top_y: f64,
    /// Arc radius.
    pub radius: f64,
    /// `true` when the arc bows downward.
    #[serde(default)]
    pub flipped: bool,
    /// Styling.
    #[serde(flatten)]
    pub style: TextStyle,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text whose fill is always the fixed gold gradient.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientTextElement {
    /// Common fields.
    #[serde(flatten)]
    pub base: ElementBase,
    /// Text content.
    pub text: String,
    /// Font family name.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raster image, positioned by its top-left corner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    /// Common fields.
    #[serde(flatten)]
    pub base: ElementBase,
    /// Source URL or path.
    pub url: String,
    /// Drawn width.
    pub width: f64,
    /// Drawn height.
    pub height: f64,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geometry of a [`ShapeElement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    /// Rectangle, positioned by top-left corner.
    Rect,
    /// Ellipse, positioned by center.
    Ellipse,
    /// Annulus, positioned by center.
    Ring,
}

/// Filled/stroked vector shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    /// Common fields.
    #[serde(flatten)]
    pub base: ElementBase,
    /// Geometry kind.
    pub shape_type: ShapeType,
    /// Width (rect) or diameter along x (ellipse).
    #[serde(default)]
    pub width: f64,
    /// Height (rect) or diameter along y (ellipse).
    #[serde(default)]
    pub height: f64,
    /// Rect corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Ring inner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<f64>,
    /// Ring outer radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_radius: Option<f64>,
    /// Fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Horizontal linear gradient fill; wins over `fill`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_linear_gradient_color_stops: Option<ColorStops>,
    /// Radial gradient fill; wins over `fill` and the linear gradient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_radial_gradient_color_stops: Option<ColorStops>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_weight() -> String {
    "normal".to_string()
}

impl SceneDocument {
    /// Empty document with a full-canvas designable area.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            background_color: Background::Transparent,
            background_gradient: None,
            designable_area: DesignableArea {
                x: 0.0,
                y: 0.0,
                width: dimensions.width,
                height: dimensions.height,
                corner_radius: 0.0,
                visible: true,
            },
            elements: Elements::default(),
            assets: SceneAssets::default(),
            extra: Map::new(),
        }
    }

    /// Parse and validate a document from JSON text.
    pub fn from_json(s: &str) -> SwatchResult<Self> {
        let doc: Self = serde_json::from_str(s)
            .map_err(|e| SwatchError::validation(format!("parse scene document JSON: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Parse and validate a document from an already-decoded JSON value.
    pub fn from_value(v: Value) -> SwatchResult<Self> {
        let doc: Self = serde_json::from_value(v)
            .map_err(|e| SwatchError::validation(format!("parse scene document JSON: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize with default z-indices assigned.
    pub fn to_json(&self) -> SwatchResult<String> {
        Ok(serde_json::to_string(&self.with_default_z_indices())?)
    }

    /// Reject a document whose canvas extent differs from the persisted one.
    pub fn ensure_same_dimensions(&self, previous: &SceneDocument) -> SwatchResult<()> {
        if self.dimensions != previous.dimensions {
            return Err(SwatchError::validation(format!(
                "scene dimensions are fixed at {}x{}, got {}x{}",
                previous.dimensions.width,
                previous.dimensions.height,
                self.dimensions.width,
                self.dimensions.height
            )));
        }
        Ok(())
    }

    /// Validate document invariants.
    pub fn validate(&self) -> SwatchResult<()> {
        self.dimensions.validate()?;
        self.designable_area.validate()?;

        match &self.background_color {
            Background::Solid(c) => {
                Rgba8::parse(c)
                    .map_err(|e| SwatchError::validation(format!("backgroundColor: {e}")))?;
            }
            Background::LinearGradient | Background::RadialGradient => {
                let Some(g) = &self.background_gradient else {
                    return Err(SwatchError::validation(format!(
                        "backgroundColor '{}' requires backgroundGradient",
                        self.background_color.as_str()
                    )));
                };
                g.color_stops.validate("backgroundGradient.colorStops")?;
            }
            Background::Transparent => {}
        }

        let mut ids = BTreeSet::new();
        for el in self.elements.iter() {
            let base = el.base();
            base.validate()?;
            if !ids.insert(base.id.as_str()) {
                return Err(SwatchError::validation(format!(
                    "duplicate element id '{}'",
                    base.id
                )));
            }
            el.validate_kind()?;
        }
        Ok(())
    }
}

impl DesignableArea {
    /// Validate extent and corner radius.
    pub fn validate(&self) -> SwatchResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("cornerRadius", self.corner_radius),
        ] {
            if !v.is_finite() {
                return Err(SwatchError::validation(format!(
                    "designableArea.{name} must be finite"
                )));
            }
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SwatchError::validation(
                "designableArea width/height must be > 0",
            ));
        }
        let max_radius = self.width.min(self.height) / 2.0;
        if self.corner_radius < 0.0 || self.corner_radius > max_radius {
            return Err(SwatchError::validation(format!(
                "designableArea.cornerRadius must be within [0, {max_radius}]"
            )));
        }
        Ok(())
    }
}

impl ElementBase {
    /// Element with identity transform at `(x, y)`.
    pub fn at(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index: None,
            opacity: 1.0,
        }
    }

    fn validate(&self) -> SwatchResult<()> {
        if self.id.trim().is_empty() {
            return Err(SwatchError::validation("element id must be non-empty"));
        }
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("scaleX", self.scale_x),
            ("scaleY", self.scale_y),
            ("opacity", self.opacity),
        ] {
            if !v.is_finite() {
                return Err(SwatchError::validation(format!(
                    "element '{}' {name} must be finite",
                    self.id
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(SwatchError::validation(format!(
                "element '{}' opacity must be within [0, 1]",
                self.id
            )));
        }
        Ok(())
    }
}

impl TextStyle {
    /// Style with the default family and weight.
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_family: default_font_family(),
            font_size,
            font_weight: default_font_weight(),
            fill: None,
            stroke: None,
            stroke_width: None,
        }
    }

    /// `true` for `bold`, `bolder`, and numeric weights of 600 and above.
    pub fn is_bold(&self) -> bool {
        is_bold_weight(&self.font_weight)
    }

    fn validate(&self, id: &str) -> SwatchResult<()> {
        validate_font_size(id, self.font_size)?;
        if let Some(fill) = &self.fill
            && fill != GOLD_GRADIENT
        {
            validate_paint(id, "fill", fill)?;
        }
        if let Some(stroke) = &self.stroke {
            validate_paint(id, "stroke", stroke)?;
        }
        validate_stroke_width(id, self.stroke_width)
    }
}

pub(crate) fn is_bold_weight(weight: &str) -> bool {
    let w = weight.trim().to_ascii_lowercase();
    match w.as_str() {
        "bold" | "bolder" => true,
        _ => w.parse::<u32>().map(|n| n >= 600).unwrap_or(false),
    }
}

fn validate_font_size(id: &str, size: f64) -> SwatchResult<()> {
    if !size.is_finite() || size <= 0.0 {
        return Err(SwatchError::validation(format!(
            "element '{id}' fontSize must be finite and > 0"
        )));
    }
    Ok(())
}

fn validate_paint(id: &str, field: &str, value: &str) -> SwatchResult<()> {
    Rgba8::parse(value)
        .map(|_| ())
        .map_err(|e| SwatchError::validation(format!("element '{id}' {field}: {e}")))
}

fn validate_stroke_width(id: &str, w: Option<f64>) -> SwatchResult<()> {
    if let Some(w) = w
        && (!w.is_finite() || w < 0.0)
    {
        return Err(SwatchError::validation(format!(
            "element '{id}' strokeWidth must be finite and >= 0"
        )));
    }
    Ok(())
}

fn validate_extent(id: &str, width: f64, height: f64) -> SwatchResult<()> {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(SwatchError::validation(format!(
            "element '{id}' width/height must be finite and > 0"
        )));
    }
    Ok(())
}

/// Element collection discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// [`ImageElement`].
    Image,
    /// [`TextElement`].
    Text,
    /// [`GradientTextElement`].
    GradientText,
    /// [`CurvedTextElement`].
    CurvedText,
    /// [`ShapeElement`].
    Shape,
}

impl ElementKind {
    /// Fixed category order used for default z-index assignment and tie-breaking.
    pub const ORDER: [ElementKind; 5] = [
        ElementKind::Image,
        ElementKind::Text,
        ElementKind::GradientText,
        ElementKind::CurvedText,
        ElementKind::Shape,
    ];

    /// Position within [`ElementKind::ORDER`].
    pub fn rank(self) -> usize {
        match self {
            Self::Image => 0,
            Self::Text => 1,
            Self::GradientText => 2,
            Self::CurvedText => 3,
            Self::Shape => 4,
        }
    }
}

/// Borrowed, kind-tagged view of one element.
#[derive(Clone, Copy, Debug)]
pub enum ElementRef<'a> {
    /// Straight text.
    Text(&'a TextElement),
    /// Curved text.
    CurvedText(&'a CurvedTextElement),
    /// Gold gradient text.
    GradientText(&'a GradientTextElement),
    /// Image.
    Image(&'a ImageElement),
    /// Shape.
    Shape(&'a ShapeElement),
}

impl<'a> ElementRef<'a> {
    /// Shared fields.
    pub fn base(&self) -> &'a ElementBase {
        match *self {
            Self::Text(e) => &e.base,
            Self::CurvedText(e) => &e.base,
            Self::GradientText(e) => &e.base,
            Self::Image(e) => &e.base,
            Self::Shape(e) => &e.base,
        }
    }

    /// Collection this element lives in.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::CurvedText(_) => ElementKind::CurvedText,
            Self::GradientText(_) => ElementKind::GradientText,
            Self::Image(_) => ElementKind::Image,
            Self::Shape(_) => ElementKind::Shape,
        }
    }

    fn validate_kind(&self) -> SwatchResult<()> {
        let id = self.base().id.as_str();
        match *self {
            Self::Text(e) => e.style.validate(id),
            Self::CurvedText(e) => {
                e.style.validate(id)?;
                if !e.top_y.is_finite() {
                    return Err(SwatchError::validation(format!(
                        "element '{id}' topY must be finite"
                    )));
                }
                if !e.radius.is_finite() || e.radius <= 0.0 {
                    return Err(SwatchError::validation(format!(
                        "element '{id}' radius must be finite and > 0"
                    )));
                }
                Ok(())
            }
            Self::GradientText(e) => validate_font_size(id, e.font_size),
            Self::Image(e) => {
                if e.url.trim().is_empty() {
                    return Err(SwatchError::validation(format!(
                        "image element '{id}' url must be non-empty"
                    )));
                }
                validate_extent(id, e.width, e.height)
            }
            Self::Shape(e) => e.validate(),
        }
    }
}

impl ShapeElement {
    fn validate(&self) -> SwatchResult<()> {
        let id = self.base.id.as_str();
        match self.shape_type {
            ShapeType::Rect | ShapeType::Ellipse => validate_extent(id, self.width, self.height)?,
            ShapeType::Ring => {
                let (Some(inner), Some(outer)) = (self.inner_radius, self.outer_radius) else {
                    return Err(SwatchError::validation(format!(
                        "ring '{id}' requires innerRadius and outerRadius"
                    )));
                };
                if !inner.is_finite() || !outer.is_finite() || inner <= 0.0 || inner >= outer {
                    return Err(SwatchError::validation(format!(
                        "ring '{id}' radii must satisfy 0 < innerRadius < outerRadius"
                    )));
                }
            }
        }
        if let Some(r) = self.corner_radius
            && (!r.is_finite() || r < 0.0)
        {
            return Err(SwatchError::validation(format!(
                "shape '{id}' cornerRadius must be finite and >= 0"
            )));
        }
        if let Some(fill) = &self.fill {
            validate_paint(id, "fill", fill)?;
        }
        if let Some(stroke) = &self.stroke {
            validate_paint(id, "stroke", stroke)?;
        }
        validate_stroke_width(id, self.stroke_width)?;
        if let Some(stops) = &self.fill_linear_gradient_color_stops {
            stops.validate("fillLinearGradientColorStops")?;
        }
        if let Some(stops) = &self.fill_radial_gradient_color_stops {
            stops.validate("fillRadialGradientColorStops")?;
        }
        Ok(())
    }
}

impl Elements {
    /// Every element, collection by collection in [`ElementKind::ORDER`], declaration order
    /// within each.
    pub fn iter(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.image
            .iter()
            .map(ElementRef::Image)
            .chain(self.text.iter().map(ElementRef::Text))
            .chain(self.gradient_text.iter().map(ElementRef::GradientText))
            .chain(self.curved_text.iter().map(ElementRef::CurvedText))
            .chain(self.shape.iter().map(ElementRef::Shape))
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.text.len()
            + self.curved_text.len()
            + self.gradient_text.len()
            + self.image.len()
            + self.shape.len()
    }

    /// `true` when every collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn bases_mut(&mut self, kind: ElementKind) -> Vec<&mut ElementBase> {
        match kind {
            ElementKind::Image => self.image.iter_mut().map(|e| &mut e.base).collect(),
            ElementKind::Text => self.text.iter_mut().map(|e| &mut e.base).collect(),
            ElementKind::GradientText => {
                self.gradient_text.iter_mut().map(|e| &mut e.base).collect()
            }
            ElementKind::CurvedText => self.curved_text.iter_mut().map(|e| &mut e.base).collect(),
            ElementKind::Shape => self.shape.iter_mut().map(|e| &mut e.base).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
