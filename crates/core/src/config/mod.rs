//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SEOKIT_*, nested keys split on `__`)
//! 2. TOML config file (if SEOKIT_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The result is resolved once at startup and shared behind an `Arc`;
//! request handlers never re-merge sections.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::format::ImageFormat;

mod validation;

pub use validation::{ConfigError, FIXED_ROUTES};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_FILE_ENV: &str = "SEOKIT_CONFIG_FILE";

/// Fallback site origin for environments without a configured `site.url`.
pub const SITE_URL_ENV: &str = "PUBLIC_SITE_URL";

/// Fallback browser executable for environments without a configured path.
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SEOKIT_*)
/// 2. TOML config file (if SEOKIT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener and development-mode settings.
    pub server: ServerConfig,

    /// Global site identity and SEO defaults.
    pub site: SiteConfig,

    /// Per-page overrides keyed by request path.
    pub pages: BTreeMap<String, PageConfig>,

    /// robots.txt and sitemap policy.
    pub robots: RobotsConfig,

    /// Social network handles.
    pub social: SocialConfig,

    /// On-demand OG image generation policy.
    pub og_image: OgImageConfig,

    /// Web app manifest fields.
    pub webmanifest: WebManifestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    ///
    /// Set via SEOKIT_SERVER__BIND_ADDR environment variable.
    pub bind_addr: String,

    /// Local-development mode: renders always target `dev_origin`.
    ///
    /// Set via SEOKIT_SERVER__DEV_MODE environment variable.
    pub dev_mode: bool,

    /// Origin of the site's development server.
    pub dev_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".into(),
            dev_mode: false,
            dev_origin: "http://localhost:3000".into(),
        }
    }
}

/// Open Graph object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Website,
    Article,
    Product,
    Profile,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Website => "website",
            PageType::Article => "article",
            PageType::Product => "product",
            PageType::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Global SEO switch. When false robots.txt blocks everything and
    /// every page is marked `noindex, nofollow`.
    pub enabled: bool,

    /// Canonical site origin, e.g. `https://example.com`.
    pub url: String,

    /// Origin used when `url` is empty.
    ///
    /// Filled from the PUBLIC_SITE_URL environment variable when unset.
    pub fallback_url: Option<String>,

    pub name: String,
    pub description: String,
    pub locale: String,

    /// Default share image; absolute URL or site-relative path.
    pub default_image: String,

    pub default_type: PageType,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: String::new(),
            fallback_url: None,
            name: String::new(),
            description: String::new(),
            locale: "en".into(),
            default_image: String::new(),
            default_type: PageType::Website,
        }
    }
}

/// Generic SEO fields shared by page overrides and explicit per-request values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub page_type: Option<PageType>,
    pub author: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub site_name: Option<String>,
    pub locale: Option<String>,
    pub alternate_locales: Vec<String>,
    pub noindex: bool,
    pub nofollow: bool,
    pub canonical: Option<String>,
    pub structured_data: Option<serde_json::Value>,
}

/// Per-page configuration: sitemap hints plus SEO overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub changefreq: Option<String>,
    pub priority: Option<f64>,
    pub lastmod: Option<String>,

    #[serde(flatten)]
    pub seo: SeoFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    /// Mount `/robots.txt`.
    pub enabled: bool,
    pub disallow: Vec<String>,
    /// Mount the sitemap and reference it from robots.txt.
    pub sitemap: bool,
    pub sitemap_path: String,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disallow: vec!["/api/".into(), "/admin/".into()],
            sitemap: true,
            sitemap_path: "/sitemap.xml".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub twitter: TwitterConfig,
    pub facebook: FacebookConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub site: Option<String>,
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookConfig {
    pub app_id: Option<String>,
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OgImageConfig {
    /// Set via SEOKIT_OG_IMAGE__ENABLED environment variable.
    pub enabled: bool,

    /// Route the generator is mounted at.
    pub route: String,

    /// Browser viewport for the default profile.
    pub viewport: Dimensions,

    /// Final image dimensions after the cover-fit resize.
    pub output: Dimensions,

    pub quality: u8,
    pub format: ImageFormat,
    pub navigation_timeout_ms: u64,

    /// Fixed wait after load for late-painting content.
    pub settle_ms: u64,

    /// Output size ceiling that triggers a lower-quality re-encode.
    pub max_bytes: usize,

    /// Elements matching this selector are hidden before capture.
    pub hide_selector: String,

    pub cache: OgCacheConfig,
    pub crawler: CrawlerConfig,
    pub browser: BrowserSettings,
}

impl Default for OgImageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            route: "/api/og".into(),
            viewport: Dimensions::new(1440, 754),
            output: Dimensions::new(1200, 630),
            quality: 85,
            format: ImageFormat::Webp,
            navigation_timeout_ms: 20_000,
            settle_ms: 1_000,
            max_bytes: 8 * 1024 * 1024,
            hide_selector: ".og-hide".into(),
            cache: OgCacheConfig::default(),
            crawler: CrawlerConfig::default(),
            browser: BrowserSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OgCacheConfig {
    /// Directory holding one encoded image per cache key.
    pub dir: PathBuf,

    /// Disk tier lifetime.
    pub ttl_secs: u64,

    /// Memory tier lifetime.
    pub memory_ttl_secs: u64,

    /// `max-age` sent to clients for the default profile.
    pub max_age_secs: u64,
}

impl Default for OgCacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".seokit-og-cache"),
            ttl_secs: 24 * 60 * 60,
            memory_ttl_secs: 60 * 60,
            max_age_secs: 24 * 60 * 60,
        }
    }
}

/// Overrides applied when a known link-preview crawler asks for an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub viewport: Dimensions,
    pub format: ImageFormat,
    pub quality: u8,
    pub navigation_timeout_ms: u64,
    pub settle_ms: u64,

    /// Bound on polling for `document.readyState == "complete"`.
    pub ready_timeout_ms: u64,

    pub max_age_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            viewport: Dimensions::new(1200, 630),
            format: ImageFormat::Jpeg,
            quality: 90,
            navigation_timeout_ms: 30_000,
            settle_ms: 2_500,
            ready_timeout_ms: 5_000,
            max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Chrome/Chromium executable.
    ///
    /// Filled from the CHROME_PATH environment variable when unset.
    pub executable: Option<PathBuf>,

    /// Extra command-line arguments.
    pub args: Vec<String>,

    /// Keep the Chromium sandbox enabled (`--no-sandbox` is passed otherwise).
    pub sandbox: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebManifestConfig {
    pub start_url: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    pub icons: Vec<ManifestIcon>,
}

impl Default for WebManifestConfig {
    fn default() -> Self {
        Self {
            start_url: "/".into(),
            display: "standalone".into(),
            background_color: "#ffffff".into(),
            theme_color: "#000000".into(),
            icons: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SEOKIT_`
    /// 2. TOML file from `SEOKIT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// `PUBLIC_SITE_URL` and `CHROME_PATH` are applied afterwards as fallbacks.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Self::figment();

        if let Ok(config_path) = std::env::var(CONFIG_FILE_ENV) {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SEOKIT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let mut config = Self::extract(&figment)?;
        config.apply_fallbacks(std::env::var(SITE_URL_ENV).ok(), std::env::var(CHROME_PATH_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Base figment holding the built-in defaults.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    /// Extract a config from an already-layered figment, without validation.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }

    /// Parse a TOML document layered over the defaults, then validate.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = Self::extract(&Self::figment().merge(Toml::string(toml)))?;
        config.validate()?;
        Ok(config)
    }

    /// Fill unset site origin and browser path from environment fallbacks.
    pub fn apply_fallbacks(&mut self, site_url: Option<String>, chrome_path: Option<String>) {
        if self.site.fallback_url.is_none() {
            self.site.fallback_url = site_url.filter(|s| !s.trim().is_empty());
        }
        if self.og_image.browser.executable.is_none() {
            self.og_image.browser.executable = chrome_path.filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        }
    }

    /// Statically configured site origin without a trailing slash.
    ///
    /// Prefers `site.url`, then `site.fallback_url`; empty when neither is set.
    pub fn site_origin(&self) -> String {
        let url = if self.site.url.trim().is_empty() {
            self.site.fallback_url.as_deref().unwrap_or("")
        } else {
            self.site.url.as_str()
        };
        url.trim().trim_end_matches('/').to_string()
    }
}

impl OgCacheConfig {
    pub fn disk_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn memory_ttl(&self) -> Duration {
        Duration::from_secs(self.memory_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.site.enabled);
        assert_eq!(config.site.locale, "en");
        assert_eq!(config.robots.disallow, vec!["/api/", "/admin/"]);
        assert_eq!(config.robots.sitemap_path, "/sitemap.xml");
        assert!(!config.og_image.enabled);
        assert_eq!(config.og_image.route, "/api/og");
        assert_eq!(config.og_image.viewport, Dimensions::new(1440, 754));
        assert_eq!(config.og_image.format, ImageFormat::Webp);
        assert_eq!(config.og_image.quality, 85);
        assert_eq!(config.og_image.max_bytes, 8 * 1024 * 1024);
        assert_eq!(config.og_image.crawler.format, ImageFormat::Jpeg);
        assert!(config.pages.is_empty());
    }

    #[test]
    fn test_cache_durations() {
        let config = AppConfig::default();
        assert_eq!(config.og_image.cache.disk_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.og_image.cache.memory_ttl(), Duration::from_secs(3_600));
    }

    #[test]
    fn test_from_toml_layers_over_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [site]
            url = "https://x.test"
            name = "X"

            [og_image]
            enabled = true
            quality = 70

            [pages."/about"]
            priority = 0.5
            changefreq = "monthly"
            title = "About"
            type = "article"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.url, "https://x.test");
        assert!(config.og_image.enabled);
        assert_eq!(config.og_image.quality, 70);
        assert_eq!(config.og_image.format, ImageFormat::Webp);
        assert_eq!(config.og_image.cache.ttl_secs, 86_400);

        let about = &config.pages["/about"];
        assert_eq!(about.priority, Some(0.5));
        assert_eq!(about.changefreq.as_deref(), Some("monthly"));
        assert_eq!(about.seo.title.as_deref(), Some("About"));
        assert_eq!(about.seo.page_type, Some(PageType::Article));
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let result = AppConfig::from_toml_str("[og_image]\nquality = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "og_image.quality"));
    }

    #[test]
    fn test_from_toml_parse_error() {
        let result = AppConfig::from_toml_str("[og_image]\nformat = \"gif\"\n");
        assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
    }

    #[test]
    fn test_apply_fallbacks_fills_unset() {
        let mut config = AppConfig::default();
        config.apply_fallbacks(Some("https://fallback.test".into()), Some("/usr/bin/chromium".into()));
        assert_eq!(config.site.fallback_url.as_deref(), Some("https://fallback.test"));
        assert_eq!(config.og_image.browser.executable, Some(PathBuf::from("/usr/bin/chromium")));
    }

    #[test]
    fn test_apply_fallbacks_keeps_configured() {
        let mut config = AppConfig::default();
        config.og_image.browser.executable = Some(PathBuf::from("/opt/chrome"));
        config.apply_fallbacks(Some("  ".into()), Some("/usr/bin/chromium".into()));
        assert!(config.site.fallback_url.is_none());
        assert_eq!(config.og_image.browser.executable, Some(PathBuf::from("/opt/chrome")));
    }

    #[test]
    fn test_site_origin_precedence() {
        let mut config = AppConfig::default();
        assert_eq!(config.site_origin(), "");

        config.site.fallback_url = Some("https://fallback.test/".into());
        assert_eq!(config.site_origin(), "https://fallback.test");

        config.site.url = "https://x.test/".into();
        assert_eq!(config.site_origin(), "https://x.test");
    }
}
