//! Core types and shared functionality for seokit.
//!
//! This crate provides:
//! - Layered configuration and validation
//! - Unified error types
//! - Content-addressed two-tier (memory + disk) image cache
//! - Render profiles and preview-crawler classification
//! - Pure generators for robots.txt, sitemap.xml, the web manifest and head tags

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod profile;
pub mod seo;

pub use cache::{CacheKey, CacheSettings, TwoTierCache};
pub use classify::{Classification, classify};
pub use config::AppConfig;
pub use error::Error;
pub use format::ImageFormat;
pub use profile::{ProfileKind, ProfileSet, RenderProfile};
