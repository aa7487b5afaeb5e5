use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

/// Number of cells in the image grid.
pub const DISPLAY_SLOTS: usize = 20;

/// A search needs strictly more distinct images than slots so that a
/// replacement candidate always exists.
pub const MIN_DISTINCT_RESULTS: usize = DISPLAY_SLOTS + 1;

/// Results requested per search.
pub const RESULT_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "podcast")]
    Podcast,
    #[default]
    #[serde(rename = "music")]
    Music,
    #[serde(rename = "musicVideo")]
    MusicVideo,
    #[serde(rename = "audiobook")]
    Audiobook,
    #[serde(rename = "shortFilm")]
    ShortFilm,
    #[serde(rename = "tvShow")]
    TvShow,
    #[serde(rename = "software")]
    Software,
    #[serde(rename = "eBook")]
    EBook,
    #[serde(rename = "all")]
    All,
}

impl MediaType {
    pub const ALL: &[MediaType] = &[
        Self::Movie,
        Self::Podcast,
        Self::Music,
        Self::MusicVideo,
        Self::Audiobook,
        Self::ShortFilm,
        Self::TvShow,
        Self::Software,
        Self::EBook,
        Self::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Podcast => "podcast",
            Self::Music => "music",
            Self::MusicVideo => "musicVideo",
            Self::Audiobook => "audiobook",
            Self::ShortFilm => "shortFilm",
            Self::TvShow => "tvShow",
            Self::Software => "software",
            Self::EBook => "eBook",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = GalleryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| GalleryError::InvalidQuery(format!("unknown media type: {s}")))
    }
}

/// One item returned by a search. Only the artwork URL is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub artwork_url: String,
}

impl SearchResultRecord {
    pub fn new(artwork_url: impl Into<String>) -> Self {
        Self {
            artwork_url: artwork_url.into(),
        }
    }
}

/// A downloaded and validated image bound to the URL it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub url: String,
    pub bytes: bytes::Bytes,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("url", &self.url)
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Searching,
    Displaying,
    Playing,
    Error,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Searching => write!(f, "searching"),
            Self::Displaying => write!(f, "displaying"),
            Self::Playing => write!(f, "playing"),
            Self::Error => write!(f, "error"),
        }
    }
}
