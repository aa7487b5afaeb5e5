use url::form_urlencoded;

use crate::error::Result;
use crate::models::{MediaType, RESULT_LIMIT};

/// A validated search request. Built once per "get images" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    media: MediaType,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, media: MediaType) -> Self {
        Self {
            term: term.into(),
            media,
        }
    }

    /// Builds a query from the raw selector value. The GUI only offers
    /// `MediaType::ALL`, so a failure here means the selector and the enum
    /// have drifted apart.
    pub fn parse(term: &str, media: &str) -> Result<Self> {
        let media: MediaType = media.parse()?;
        Ok(Self::new(term, media))
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn media(&self) -> MediaType {
        self.media
    }

    pub fn limit(&self) -> u32 {
        RESULT_LIMIT
    }

    /// Percent-encoded `term=..&limit=..&media=..` string.
    pub fn encode(&self) -> String {
        format!(
            "term={}&limit={}&media={}",
            encode_component(&self.term),
            self.limit(),
            encode_component(self.media.as_str()),
        )
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{endpoint}?{}", self.encode())
    }
}

fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
