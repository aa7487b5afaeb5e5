use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("{found} distinct results found, but {required} or more are needed")]
    InsufficientResults { found: usize, required: usize },

    #[error("failed to load image {url}: {reason}")]
    ImageResolution { url: String, reason: String },

    #[error("slot index {0} out of range")]
    SlotOutOfRange(usize),

    #[error("url already shown in another slot: {0}")]
    DuplicateSlotUrl(String),

    #[error("a search is already in progress")]
    SearchInProgress,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
}

impl GalleryError {
    /// Short, user-facing name of the failure category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "invalid query",
            Self::Transport(_) => "transport failure",
            Self::MalformedResponse(_) | Self::Json(_) => "malformed response",
            Self::InsufficientResults { .. } => "insufficient results",
            Self::ImageResolution { .. } | Self::Image(_) => "image resolution failure",
            Self::SlotOutOfRange(_) | Self::DuplicateSlotUrl(_) => "display slot error",
            Self::SearchInProgress => "search in progress",
            Self::Config(_) | Self::Toml(_) | Self::FileNotFound(_) => "configuration error",
            Self::Io(_) => "io error",
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
