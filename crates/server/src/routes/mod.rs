//! Route definitions for the seokit service.
//!
//! ## Routes
//!
//! - `GET /robots.txt` - Crawl policy (when `robots.enabled`)
//! - `GET <robots.sitemap_path>` - Sitemap (when `robots.sitemap`)
//! - `GET /site.webmanifest` - Web app manifest
//! - `GET <og_image.route>?path=` - OG image (when `og_image.enabled`)
//! - `GET /api/seo/meta?path=` - Resolved head tags (JSON)
//! - `GET /health` - Health check (JSON)

mod health;
mod manifest;
mod meta;
mod og;
mod robots;
mod sitemap;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete router; mounting follows the resolved configuration.
pub fn router(state: AppState) -> Router {
    let config = &state.config;
    let mut router = Router::new()
        .route("/site.webmanifest", get(manifest::web_manifest))
        .route("/api/seo/meta", get(meta::page_meta))
        .route("/health", get(health::health_check));

    if config.robots.enabled {
        router = router.route("/robots.txt", get(robots::robots_txt));
    }
    if config.robots.sitemap {
        router = router.route(&config.robots.sitemap_path, get(sitemap::sitemap_xml));
    }
    if config.og_image.enabled {
        router = router.route(&config.og_image.route, get(og::og_image));
    }

    router.with_state(state)
}
