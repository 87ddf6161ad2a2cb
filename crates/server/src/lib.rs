//! seokit HTTP service.
//!
//! Serves robots.txt, sitemap.xml, the web manifest, resolved head metadata,
//! and on-demand OG images rendered by a headless browser.

pub mod error;
pub mod og;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;

pub use error::WebError;
pub use og::{OgImageService, OgOutcome, OgRequest};
pub use routes::router;
pub use state::AppState;
