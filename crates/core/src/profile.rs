//! Render profiles: viewport, format and cache policy per client class.

use std::time::Duration;

use crate::config::OgImageConfig;
use crate::format::ImageFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Default,
    /// Known link-preview crawler (Facebook, Twitter, Slack, ...).
    Crawler,
}

/// Everything a single OG render needs to know about its client class.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProfile {
    pub kind: ProfileKind,

    /// Browser viewport (width, height); also the screenshot clip.
    pub viewport: (u32, u32),

    /// Final image dimensions after the cover-fit resize.
    pub output: (u32, u32),

    pub format: ImageFormat,

    /// Encoder quality, 1-100. Ignored for PNG.
    pub quality: u8,

    pub navigation_timeout_ms: u64,

    /// Fixed wait after navigation for late-painting content.
    pub settle_ms: u64,

    /// Bound on polling for `document.readyState == "complete"`; crawler only.
    pub ready_timeout_ms: Option<u64>,

    pub cache_max_age_secs: u64,

    /// Whether `Cache-Control` carries `immutable`.
    pub immutable: bool,

    /// Elements matching this selector are hidden before capture.
    pub hide_selector: String,
}

impl RenderProfile {
    pub fn is_crawler(&self) -> bool {
        self.kind == ProfileKind::Crawler
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_ms.map(Duration::from_millis)
    }

    /// `Cache-Control` header value for images served under this profile.
    pub fn cache_control(&self) -> String {
        let max_age = self.cache_max_age_secs;
        if self.immutable {
            format!("public, max-age={max_age}, s-maxage={max_age}, immutable")
        } else {
            format!("public, max-age={max_age}, s-maxage={max_age}")
        }
    }
}

/// The two profiles, resolved once from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSet {
    pub default: RenderProfile,
    pub crawler: RenderProfile,
}

impl ProfileSet {
    pub fn from_config(config: &OgImageConfig) -> Self {
        let output = (config.output.width, config.output.height);

        let default = RenderProfile {
            kind: ProfileKind::Default,
            viewport: (config.viewport.width, config.viewport.height),
            output,
            format: config.format,
            quality: config.quality,
            navigation_timeout_ms: config.navigation_timeout_ms,
            settle_ms: config.settle_ms,
            ready_timeout_ms: None,
            cache_max_age_secs: config.cache.max_age_secs,
            immutable: false,
            hide_selector: config.hide_selector.clone(),
        };

        let crawler = &config.crawler;
        let crawler = RenderProfile {
            kind: ProfileKind::Crawler,
            viewport: (crawler.viewport.width, crawler.viewport.height),
            output,
            format: crawler.format,
            quality: crawler.quality,
            navigation_timeout_ms: crawler.navigation_timeout_ms,
            settle_ms: crawler.settle_ms,
            ready_timeout_ms: Some(crawler.ready_timeout_ms),
            cache_max_age_secs: crawler.max_age_secs,
            immutable: true,
            hide_selector: config.hide_selector.clone(),
        };

        Self { default, crawler }
    }
}
