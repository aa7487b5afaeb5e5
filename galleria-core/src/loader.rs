use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{GalleryError, Result};
use crate::models::{LoadedImage, DISPLAY_SLOTS};
use crate::sources::ArtworkSource;

/// Resolves artwork URLs into images for one search session. Every URL is
/// downloaded at most once; later requests are served from memory.
pub struct ImageLoader {
    source: Arc<dyn ArtworkSource>,
    cache: Mutex<HashMap<String, LoadedImage>>,
}

impl ImageLoader {
    pub fn new(source: Arc<dyn ArtworkSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, url: &str) -> Result<LoadedImage> {
        if let Some(img) = self.cache.lock().await.get(url) {
            return Ok(img.clone());
        }

        let bytes = self
            .source
            .download(url)
            .await
            .map_err(|e| GalleryError::ImageResolution {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let img = decode(url.to_string(), bytes).await?;
        debug!(url, width = img.width, height = img.height, "image resolved");

        // a concurrent resolve of the same url may have won; keep the first
        let mut cache = self.cache.lock().await;
        let img = cache.entry(url.to_string()).or_insert(img).clone();
        Ok(img)
    }

    /// Resolves the first `DISPLAY_SLOTS` urls in order, reporting
    /// `(i + 1) / DISPLAY_SLOTS` after each one. The first failure aborts.
    pub async fn resolve_initial<F>(
        &self,
        urls: &[String],
        mut on_progress: F,
    ) -> Result<Vec<LoadedImage>>
    where
        F: FnMut(f32) + Send,
    {
        let urls = &urls[..urls.len().min(DISPLAY_SLOTS)];
        let mut images = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            images.push(self.resolve(url).await?);
            on_progress((i + 1) as f32 / DISPLAY_SLOTS as f32);
        }
        info!(count = images.len(), "initial images resolved");
        Ok(images)
    }

    pub async fn cached(&self) -> usize {
        self.cache.lock().await.len()
    }
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

async fn decode(url: String, bytes: bytes::Bytes) -> Result<LoadedImage> {
    let task_url = url.clone();
    tokio::task::spawn_blocking(move || {
        let dims = image::ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()
            .map_err(GalleryError::from)
            .and_then(|r| r.into_dimensions().map_err(GalleryError::from));
        match dims {
            Ok((width, height)) => Ok(LoadedImage {
                url,
                bytes,
                width,
                height,
            }),
            Err(e) => Err(GalleryError::ImageResolution {
                url,
                reason: e.to_string(),
            }),
        }
    })
    .await
    .map_err(|e| GalleryError::ImageResolution {
        url: task_url,
        reason: format!("decode task failed: {e}"),
    })?
}
