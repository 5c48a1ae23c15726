use async_trait::async_trait;

use crate::{foundation::error::SwatchResult, variants::matcher::PlatformVariant};

/// One metadata key-value pair scoped to a platform variant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metafield {
    /// Namespace owned by this application.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Stored value.
    pub value: String,
}

/// Remote commerce platform.
///
/// Both calls are opaque remote operations; callers bound them with a timeout and treat any
/// error as a per-item failure.
#[async_trait]
pub trait CommercePlatform: Send + Sync {
    /// Every variant of `product_id` with its selected options and face image.
    async fn list_variants(&self, product_id: &str) -> SwatchResult<Vec<PlatformVariant>>;

    /// Write `metafield` on variant `variant_id`.
    async fn set_variant_metafield(&self, variant_id: &str, metafield: &Metafield)
    -> SwatchResult<()>;
}
