//! Client code for seokit.
//!
//! This crate holds everything that drives external machinery on behalf of
//! the OG image pipeline: the headless browser adapter, render target
//! resolution, browser discovery, and the image transcoder.

pub mod render;
pub mod transcode;

#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::target::{RequestOrigin, cache_host, normalize_path, resolve_origin, resolve_target};
pub use render::{RenderError, RenderedImage, Renderer};
pub use transcode::{TranscodeError, TranscodeOutput, Transcoder};
