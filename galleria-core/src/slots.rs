use std::collections::HashSet;

use tracing::debug;

use crate::error::{GalleryError, Result};
use crate::models::{LoadedImage, DISPLAY_SLOTS};

/// The fixed grid of display cells. A `None` cell shows the placeholder.
///
/// `shown` mirrors the URLs currently in `cells` so duplicate checks during
/// play are O(1); both are updated together by every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySlots {
    cells: Vec<Option<LoadedImage>>,
    shown: HashSet<String>,
}

impl DisplaySlots {
    pub fn new() -> Self {
        Self {
            cells: vec![None; DISPLAY_SLOTS],
            shown: HashSet::with_capacity(DISPLAY_SLOTS),
        }
    }

    /// Replaces every cell. Requires exactly `DISPLAY_SLOTS` images with
    /// pairwise distinct URLs; on error nothing changes.
    pub fn fill_all(&mut self, images: Vec<LoadedImage>) -> Result<()> {
        if images.len() != DISPLAY_SLOTS {
            return Err(GalleryError::SlotOutOfRange(images.len()));
        }
        let mut shown = HashSet::with_capacity(DISPLAY_SLOTS);
        for img in &images {
            if !shown.insert(img.url.clone()) {
                return Err(GalleryError::DuplicateSlotUrl(img.url.clone()));
            }
        }
        self.cells = images.into_iter().map(Some).collect();
        self.shown = shown;
        debug!("all display slots filled");
        Ok(())
    }

    /// Overwrites one cell. Rejects an index outside the grid and a URL that
    /// another cell already shows. Re-assigning a cell its own URL is allowed.
    pub fn replace(&mut self, index: usize, image: LoadedImage) -> Result<()> {
        let Some(cell) = self.cells.get_mut(index) else {
            return Err(GalleryError::SlotOutOfRange(index));
        };
        let current = cell.as_ref().map(|c| c.url.as_str());
        if current != Some(image.url.as_str()) && self.shown.contains(&image.url) {
            return Err(GalleryError::DuplicateSlotUrl(image.url));
        }
        if let Some(old) = cell.take() {
            self.shown.remove(&old.url);
        }
        self.shown.insert(image.url.clone());
        *cell = Some(image);
        Ok(())
    }

    pub fn is_shown(&self, url: &str) -> bool {
        self.shown.contains(url)
    }

    pub fn get(&self, index: usize) -> Option<&LoadedImage> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn shown_url(&self, index: usize) -> Option<&str> {
        self.get(index).map(|img| img.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&LoadedImage>> {
        self.cells.iter().map(Option::as_ref)
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    pub fn is_placeholder(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for DisplaySlots {
    fn default() -> Self {
        Self::new()
    }
}
