//! Unified error types for seokit.
//!
//! Display strings carry a stable uppercase code so log lines and HTTP
//! messages can be grepped independently of the free-form detail.

use crate::config::ConfigError;

/// Unified error types for the seokit service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an unknown image format).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// OG image generation is administratively disabled.
    #[error("OG_DISABLED")]
    OgDisabled,

    /// Headless browser render failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// Screenshot could not be transcoded into the requested format.
    #[error("TRANSCODE_FAILED: {0}")]
    TranscodeFailed(String),

    /// Cache directory or cache file I/O failed.
    #[error("CACHE_ERROR: {0}")]
    Cache(#[from] std::io::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the failure belongs to the render pipeline (render or transcode).
    ///
    /// Only these are eligible for the fallback-image redirect.
    pub fn is_render_fatal(&self) -> bool {
        matches!(self, Error::RenderFailed(_) | Error::TranscodeFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RenderFailed("no browser".to_string());
        assert!(err.to_string().contains("RENDER_FAILED"));
        assert!(err.to_string().contains("no browser"));
    }

    #[test]
    fn test_error_disabled_display() {
        assert_eq!(Error::OgDisabled.to_string(), "OG_DISABLED");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = io.into();
        assert!(matches!(err, Error::Cache(_)));
        assert!(err.to_string().starts_with("CACHE_ERROR"));
    }

    #[test]
    fn test_error_render_fatal() {
        assert!(Error::RenderFailed("x".into()).is_render_fatal());
        assert!(Error::TranscodeFailed("x".into()).is_render_fatal());
        assert!(!Error::OgDisabled.is_render_fatal());
        assert!(!Error::InvalidInput("x".into()).is_render_fatal());
    }
}
