use std::collections::HashSet;

use tracing::debug;

use crate::error::{GalleryError, Result};
use crate::models::{SearchResultRecord, DISPLAY_SLOTS, MIN_DISTINCT_RESULTS};

/// Unique artwork URLs in first-seen order. Always holds at least
/// `MIN_DISTINCT_RESULTS` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctImageSet {
    urls: Vec<String>,
}

impl DistinctImageSet {
    pub fn from_records(records: &[SearchResultRecord]) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        let urls: Vec<String> = records
            .iter()
            .filter(|r| seen.insert(r.artwork_url.as_str()))
            .map(|r| r.artwork_url.clone())
            .collect();

        debug!(raw = records.len(), distinct = urls.len(), "deduplicated results");

        if urls.len() < MIN_DISTINCT_RESULTS {
            return Err(GalleryError::InsufficientResults {
                found: urls.len(),
                required: MIN_DISTINCT_RESULTS,
            });
        }
        Ok(Self { urls })
    }

    /// The URLs shown by the initial fill.
    pub fn initial(&self) -> &[String] {
        &self.urls[..DISPLAY_SLOTS]
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.urls.get(idx).map(String::as_str)
    }
}
