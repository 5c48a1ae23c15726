use chrono::{DateTime, Utc};

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    scene::canvas::CanvasData,
    variants::matcher::VariantKey,
};

/// A persisted design: an interactively authored master, or a generated color variant of one.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// UUID v4.
    pub id: String,
    /// Owning shop.
    pub shop: String,
    /// Display name.
    pub name: String,
    /// The design itself.
    pub canvas_data: CanvasData,
    /// Set on generated variants only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_template_id: Option<String>,
    /// Color chip display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_variant: Option<String>,
    /// Pattern chip display name, for products with a pattern option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Platform product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopify_product_id: Option<String>,
    /// Platform variants bound to this template.
    #[serde(default)]
    pub shopify_variant_ids: Vec<String>,
    /// Rendered preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// New master template. The canvas is validated and gets its default z-indices.
    pub fn new_master(
        shop: impl Into<String>,
        name: impl Into<String>,
        canvas_data: CanvasData,
        color_variant: Option<String>,
        pattern: Option<String>,
    ) -> SwatchResult<Self> {
        canvas_data.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            shop: shop.into(),
            name: name.into(),
            canvas_data: canvas_data.with_default_z_indices(),
            master_template_id: None,
            color_variant,
            pattern,
            shopify_product_id: None,
            shopify_variant_ids: Vec::new(),
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Generated variant of `master` for one (color, pattern) combination.
    ///
    /// This is the only way variant rows come into existence.
    pub fn new_variant(
        master: &Template,
        color: &str,
        pattern: Option<&str>,
        canvas_data: CanvasData,
    ) -> Self {
        let now = Utc::now();
        let label = match pattern {
            Some(p) => format!("{color} / {p}"),
            None => color.to_string(),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            shop: master.shop.clone(),
            name: format!("{} - {label}", master.name),
            canvas_data: canvas_data.with_default_z_indices(),
            master_template_id: Some(master.id.clone()),
            color_variant: Some(color.to_string()),
            pattern: pattern.map(str::to_string),
            shopify_product_id: master.shopify_product_id.clone(),
            shopify_variant_ids: Vec::new(),
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `true` for generated variants.
    pub fn is_variant(&self) -> bool {
        self.master_template_id.is_some()
    }

    /// `true` once platform variants are bound.
    pub fn is_bound(&self) -> bool {
        !self.shopify_variant_ids.is_empty()
    }

    /// Normalized (color, pattern) of this template, if it names a color.
    pub fn variant_key(&self) -> Option<VariantKey> {
        VariantKey::new(self.color_variant.as_deref()?, self.pattern.as_deref())
    }

    /// Replace the design, keeping every side's dimensions.
    ///
    /// Variants bound to the platform are frozen apart from their thumbnail.
    pub fn replace_canvas(&mut self, canvas_data: CanvasData) -> SwatchResult<()> {
        if self.is_variant() && self.is_bound() {
            return Err(SwatchError::validation(format!(
                "template {} is a bound variant and cannot be edited",
                self.id
            )));
        }
        canvas_data.validate()?;
        canvas_data.ensure_same_dimensions(&self.canvas_data)?;
        self.canvas_data = canvas_data.with_default_z_indices();
        self.touch();
        Ok(())
    }

    /// Record the rendered preview.
    pub fn set_thumbnail(&mut self, url: impl Into<String>) {
        self.thumbnail_url = Some(url.into());
        self.touch();
    }

    /// Record the platform product and variants this template is bound to.
    pub fn bind(&mut self, product_id: impl Into<String>, variant_ids: Vec<String>) {
        self.shopify_product_id = Some(product_id.into());
        self.shopify_variant_ids = variant_ids;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/templates/model.rs"]
mod tests;
