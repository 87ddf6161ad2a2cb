//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, Dimensions};
use thiserror::Error;

/// Sitemap protocol `changefreq` values.
const CHANGEFREQ_VALUES: &[&str] = &["always", "hourly", "daily", "weekly", "monthly", "yearly", "never"];

/// Routes the server always mounts; configurable routes must not shadow them.
pub const FIXED_ROUTES: &[&str] = &["/health", "/robots.txt", "/site.webmanifest", "/api/seo/meta"];

/// Largest accepted viewport or output edge in pixels.
const MAX_DIMENSION: u32 = 4096;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_quality(field: &str, quality: u8) -> Result<(), ConfigError> {
    if quality == 0 || quality > 100 {
        return Err(invalid(field, "must be between 1 and 100"));
    }
    Ok(())
}

fn check_dimensions(field: &str, dims: Dimensions) -> Result<(), ConfigError> {
    if dims.width == 0 || dims.height == 0 {
        return Err(invalid(field, "width and height must be greater than 0"));
    }
    if dims.width > MAX_DIMENSION || dims.height > MAX_DIMENSION {
        return Err(invalid(field, format!("width and height must not exceed {MAX_DIMENSION}px")));
    }
    Ok(())
}

fn check_timeout(field: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if timeout_ms < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if timeout_ms > 300_000 {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

fn check_route(field: &str, route: &str) -> Result<(), ConfigError> {
    if !route.starts_with('/') {
        return Err(invalid(field, "must start with '/'"));
    }
    if FIXED_ROUTES.contains(&route) {
        return Err(invalid(field, format!("collides with the built-in {route} route")));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a quality is outside 1..=100
    /// - a viewport or output dimension is 0 or larger than 4096
    /// - a navigation/settle timeout is below 100ms or above 5 minutes
    /// - a cache TTL or `max_bytes` is 0
    /// - a page priority is outside 0.0..=1.0 or its changefreq is unknown
    /// - a route does not start with '/', shadows a built-in route, or
    ///   `og_image.route` equals `robots.sitemap_path`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let og = &self.og_image;

        check_quality("og_image.quality", og.quality)?;
        check_quality("og_image.crawler.quality", og.crawler.quality)?;

        check_dimensions("og_image.viewport", og.viewport)?;
        check_dimensions("og_image.output", og.output)?;
        check_dimensions("og_image.crawler.viewport", og.crawler.viewport)?;

        check_timeout("og_image.navigation_timeout_ms", og.navigation_timeout_ms)?;
        check_timeout("og_image.crawler.navigation_timeout_ms", og.crawler.navigation_timeout_ms)?;
        check_timeout("og_image.crawler.ready_timeout_ms", og.crawler.ready_timeout_ms)?;
        if og.settle_ms > 60_000 || og.crawler.settle_ms > 60_000 {
            return Err(invalid("og_image.settle_ms", "must not exceed 60000ms"));
        }

        if og.cache.ttl_secs == 0 {
            return Err(invalid("og_image.cache.ttl_secs", "must be greater than 0"));
        }
        if og.cache.memory_ttl_secs == 0 {
            return Err(invalid("og_image.cache.memory_ttl_secs", "must be greater than 0"));
        }
        if og.max_bytes == 0 {
            return Err(invalid("og_image.max_bytes", "must be greater than 0"));
        }

        check_route("og_image.route", &og.route)?;
        check_route("robots.sitemap_path", &self.robots.sitemap_path)?;
        if og.route == self.robots.sitemap_path {
            return Err(invalid("og_image.route", "must differ from robots.sitemap_path"));
        }

        for (path, page) in &self.pages {
            if let Some(priority) = page.priority
                && !(0.0..=1.0).contains(&priority)
            {
                return Err(invalid(format!("pages.{path}.priority"), "must be between 0.0 and 1.0"));
            }
            if let Some(changefreq) = page.changefreq.as_deref()
                && !CHANGEFREQ_VALUES.contains(&changefreq)
            {
                return Err(invalid(
                    format!("pages.{path}.changefreq"),
                    format!("must be one of {}", CHANGEFREQ_VALUES.join(", ")),
                ));
            }
        }

        if og.enabled && self.site_origin().is_empty() {
            tracing::warn!(
                "OG image generation is enabled but neither site.url nor site.fallback_url is set; \
                 renders without a Host header will fail"
            );
        }

        Ok(())
    }
}
