//! Error types for Coursecast Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Source errors
    #[error("No sources available for this video")]
    NoSourcesAvailable,

    #[error("Unknown resolution menu entry: {index}")]
    UnknownMenuEntry { index: usize },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Video API errors
    #[error("Video not found: {video_id}")]
    VideoNotFound { video_id: String },

    #[error("Authentication error")]
    Authentication,

    #[error("Video API returned status {status}")]
    ApiStatus { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::ApiStatus { status: 500..=599 })
    }

    /// Returns the error code reported to the host
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NoSourcesAvailable => "NO_SOURCES",
            Error::UnknownMenuEntry { .. } => "UNKNOWN_MENU_ENTRY",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::VideoNotFound { .. } => "VIDEO_NOT_FOUND",
            Error::Authentication => "AUTHENTICATION",
            Error::ApiStatus { .. } => "API_STATUS",
            Error::Network(_) => "NETWORK",
            Error::Url(_) => "URL",
            Error::Json(_) => "JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NoSourcesAvailable.error_code(), "NO_SOURCES");
        assert_eq!(Error::Authentication.error_code(), "AUTHENTICATION");
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::ApiStatus { status: 503 }.is_recoverable());
        assert!(!Error::ApiStatus { status: 404 }.is_recoverable());
        assert!(!Error::NoSourcesAvailable.is_recoverable());
    }
}
