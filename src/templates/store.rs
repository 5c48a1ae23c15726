use crate::{
    foundation::error::SwatchResult, scene::canvas::CanvasData, templates::model::Template,
};

/// Durable template storage.
pub trait TemplateStore: Send + Sync {
    /// Persist a new template. Fails when the id already exists.
    fn insert(&self, template: &Template) -> SwatchResult<()>;

    /// Load a template by id.
    fn get(&self, id: &str) -> SwatchResult<Option<Template>>;

    /// Replace a template's design under [`Template::replace_canvas`] rules.
    fn update_canvas(&self, id: &str, canvas_data: CanvasData) -> SwatchResult<Template>;

    /// Record a rendered thumbnail URL.
    fn set_thumbnail(&self, id: &str, url: &str) -> SwatchResult<()>;

    /// Record the platform product and variants bound to a template.
    fn bind_variants(&self, id: &str, product_id: &str, variant_ids: &[String])
    -> SwatchResult<()>;

    /// Generated variants of `master_id`, oldest first.
    fn variants_of(&self, master_id: &str) -> SwatchResult<Vec<Template>>;

    /// Delete every generated variant of `master_id`. Returns how many were removed.
    fn delete_variants_of(&self, master_id: &str) -> SwatchResult<usize>;
}
