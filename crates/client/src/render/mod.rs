//! Headless browser capture of OG images.
//!
//! This module provides the [`Renderer`] seam the orchestrator drives and,
//! behind the `render` feature, a chromiumoxide implementation that launches
//! one headless Chrome/Chromium process per capture.

use seokit_core::profile::RenderProfile;
use thiserror::Error;

pub mod browser;
pub mod target;

#[cfg(feature = "render")]
mod headless;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

/// Errors that can occur while capturing a page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// No Chrome/Chromium executable could be located.
    #[error("no browser executable found: {0}")]
    BrowserNotFound(String),

    /// Failed to open a page or navigate to the target.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Screenshot capture failed.
    #[error("capture failed: {0}")]
    Capture(String),
}

impl From<RenderError> for seokit_core::Error {
    fn from(err: RenderError) -> Self {
        seokit_core::Error::RenderFailed(err.to_string())
    }
}

/// Raw screenshot of the profile viewport.
///
/// Always PNG-encoded; transient and dropped once transcoded.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Renderer trait for capturing a page as a raster screenshot.
///
/// Implementations must release every browser resource they acquire before
/// returning, on success and on error.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Capture `target` (a fully qualified URL, or a bare path when no origin
    /// resolved) using the viewport and timings of `profile`.
    async fn capture(&self, target: &str, profile: &RenderProfile) -> Result<RenderedImage, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_into_core() {
        let err: seokit_core::Error = RenderError::BrowserNotFound("none on PATH".into()).into();
        assert!(err.is_render_fatal());
        assert_eq!(err.to_string(), "RENDER_FAILED: no browser executable found: none on PATH");
    }
}
