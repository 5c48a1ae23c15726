//! Shopify Admin GraphQL implementation of [`CommercePlatform`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    platform::commerce::{CommercePlatform, Metafield},
    variants::matcher::{PlatformVariant, SelectedOption},
};

const PAGE_SIZE: u32 = 100;

const VARIANTS_QUERY: &str = "query($id: ID!, $first: Int!, $after: String) { \
product(id: $id) { variants(first: $first, after: $after) { \
pageInfo { hasNextPage endCursor } \
nodes { id title selectedOptions { name value } image { url } } } } }";

const METAFIELDS_SET: &str = "mutation($metafields: [MetafieldsSetInput!]!) { \
metafieldsSet(metafields: $metafields) { metafields { id } userErrors { field message } } }";

/// Connection settings for one shop.
#[derive(clap::Args, Clone, Debug)]
pub struct ShopifyConfig {
    /// Shop domain, e.g. `example.myshopify.com`.
    #[arg(long = "shopify-shop", env = "SHOPIFY_SHOP")]
    pub shop: String,
    /// Admin API version.
    #[arg(long = "shopify-api-version", env = "SHOPIFY_API_VERSION", default_value = "2024-10")]
    pub api_version: String,
    /// Admin API access token.
    #[arg(long = "shopify-access-token", env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,
}

impl ShopifyConfig {
    /// GraphQL endpoint for this shop.
    pub fn endpoint(&self) -> String {
        let shop = self
            .shop
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/');
        format!("https://{shop}/admin/api/{}/graphql.json", self.api_version)
    }
}

/// Global id for `kind`; ids that are already global pass through.
pub fn to_gid(kind: &str, id: &str) -> String {
    if id.starts_with("gid://") {
        id.to_string()
    } else {
        format!("gid://shopify/{kind}/{id}")
    }
}

#[derive(serde::Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(serde::Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(serde::Deserialize)]
pub(crate) struct ProductData {
    product: Option<ProductNode>,
}

#[derive(serde::Deserialize)]
struct ProductNode {
    variants: VariantConnection,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantConnection {
    page_info: PageInfo,
    nodes: Vec<VariantNode>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selected_options: Vec<SelectedOption>,
    image: Option<ImageNode>,
}

#[derive(serde::Deserialize)]
struct ImageNode {
    url: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetafieldsSetData {
    metafields_set: Option<MetafieldsSetPayload>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetafieldsSetPayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(serde::Deserialize)]
struct UserError {
    #[serde(default)]
    field: Option<Vec<String>>,
    message: String,
}

/// One page of variants plus the cursor of the next page.
pub(crate) struct VariantPage {
    pub variants: Vec<PlatformVariant>,
    pub next: Option<String>,
}

pub(crate) fn decode_response<T: DeserializeOwned>(body: &[u8]) -> SwatchResult<T> {
    let resp: GraphqlResponse<T> = serde_json::from_slice(body)
        .map_err(|e| SwatchError::remote(format!("malformed graphql response: {e}")))?;
    if !resp.errors.is_empty() {
        let msgs: Vec<&str> = resp.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(SwatchError::remote(format!(
            "graphql errors: {}",
            msgs.join("; ")
        )));
    }
    resp.data
        .ok_or_else(|| SwatchError::remote("graphql response without data"))
}

pub(crate) fn variant_page(data: ProductData, product_id: &str) -> SwatchResult<VariantPage> {
    let product = data
        .product
        .ok_or_else(|| SwatchError::remote(format!("product '{product_id}' not found")))?;
    let conn = product.variants;
    let variants = conn
        .nodes
        .into_iter()
        .map(|n| PlatformVariant {
            id: n.id,
            title: n.title,
            selected_options: n.selected_options,
            image_url: n.image.map(|i| i.url),
        })
        .collect();
    let next = if conn.page_info.has_next_page {
        conn.page_info.end_cursor
    } else {
        None
    };
    Ok(VariantPage { variants, next })
}

pub(crate) fn check_user_errors(data: MetafieldsSetData) -> SwatchResult<()> {
    let payload = data
        .metafields_set
        .ok_or_else(|| SwatchError::remote("metafieldsSet returned no payload"))?;
    if payload.user_errors.is_empty() {
        return Ok(());
    }
    let msgs: Vec<String> = payload
        .user_errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect();
    Err(SwatchError::remote(format!(
        "metafieldsSet rejected: {}",
        msgs.join("; ")
    )))
}

/// Admin API client.
#[derive(Clone, Debug)]
pub struct ShopifyClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ShopifyClient {
    /// Client for `config` with a per-request `timeout`.
    pub fn new(config: &ShopifyConfig, timeout: Duration) -> SwatchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwatchError::remote(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
            token: config.access_token.clone(),
        })
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> SwatchResult<T> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.token)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| SwatchError::remote(format!("graphql request: {e}")))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| SwatchError::remote(format!("graphql body: {e}")))?;
        if !status.is_success() {
            return Err(SwatchError::remote(format!("graphql http {status}")));
        }
        decode_response(&body)
    }
}

#[async_trait]
impl CommercePlatform for ShopifyClient {
    #[tracing::instrument(skip(self))]
    async fn list_variants(&self, product_id: &str) -> SwatchResult<Vec<PlatformVariant>> {
        let gid = to_gid("Product", product_id);
        let mut out = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let data: ProductData = self
                .graphql(
                    VARIANTS_QUERY,
                    serde_json::json!({ "id": gid, "first": PAGE_SIZE, "after": after }),
                )
                .await?;
            let page = variant_page(data, &gid)?;
            out.extend(page.variants);
            match page.next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }
        tracing::debug!(variants = out.len(), "listed product variants");
        Ok(out)
    }

    #[tracing::instrument(skip(self, metafield), fields(key = %metafield.key))]
    async fn set_variant_metafield(
        &self,
        variant_id: &str,
        metafield: &Metafield,
    ) -> SwatchResult<()> {
        let input = serde_json::json!([{
            "ownerId": to_gid("ProductVariant", variant_id),
            "namespace": metafield.namespace,
            "key": metafield.key,
            "value": metafield.value,
            "type": "single_line_text_field",
        }]);
        let data: MetafieldsSetData = self
            .graphql(METAFIELDS_SET, serde_json::json!({ "metafields": input }))
            .await?;
        check_user_errors(data)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/platform/shopify.rs"]
mod tests;
