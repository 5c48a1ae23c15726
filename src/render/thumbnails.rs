use std::sync::Arc;
use std::time::Duration;

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    platform::images::ImageSource,
    render::headless::HeadlessRenderer,
    render::raster::ImageBundle,
    render::svg::referenced_images,
    scene::model::SceneDocument,
};

/// Async front end of [`HeadlessRenderer`]: prefetches images, then renders on a blocking thread.
#[derive(Clone)]
pub struct ThumbnailRenderer {
    renderer: Arc<HeadlessRenderer>,
    images: Arc<dyn ImageSource>,
    image_timeout: Duration,
}

impl ThumbnailRenderer {
    /// Renderer fetching images from `images`, each fetch bounded by `image_timeout`.
    pub fn new(
        renderer: Arc<HeadlessRenderer>,
        images: Arc<dyn ImageSource>,
        image_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            images,
            image_timeout,
        }
    }

    /// Fetch every image `doc` references, concurrently.
    ///
    /// Any failed or timed-out fetch fails the whole bundle.
    pub async fn prefetch(&self, doc: &SceneDocument) -> SwatchResult<ImageBundle> {
        let urls = referenced_images(doc);
        let fetches = urls.iter().map(|url| async move {
            match tokio::time::timeout(self.image_timeout, self.images.fetch(url)).await {
                Ok(Ok(bytes)) => Ok((url.as_str(), bytes)),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(SwatchError::remote(format!(
                    "image '{url}' timed out after {}ms",
                    self.image_timeout.as_millis()
                ))),
            }
        });

        let mut bundle = ImageBundle::new();
        for fetched in futures::future::join_all(fetches).await {
            let (url, bytes) = fetched?;
            bundle.insert(url, &bytes)?;
        }
        Ok(bundle)
    }

    /// Prefetch images and render `doc` to PNG bytes.
    #[tracing::instrument(skip_all)]
    pub async fn render(&self, doc: &SceneDocument) -> SwatchResult<Vec<u8>> {
        let bundle = self.prefetch(doc).await?;
        let renderer = Arc::clone(&self.renderer);
        let doc = doc.clone();
        tokio::task::spawn_blocking(move || renderer.render(&doc, bundle))
            .await
            .map_err(|e| SwatchError::render(format!("render task failed: {e}")))?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnails.rs"]
mod tests;
