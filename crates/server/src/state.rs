//! Application state shared across all request handlers.

use std::sync::Arc;

use seokit_client::Renderer;
use seokit_core::{AppConfig, CacheSettings, TwoTierCache};

use crate::og::OgImageService;

#[derive(Clone)]
pub struct AppState {
    /// Configuration resolved once at startup.
    pub config: Arc<AppConfig>,

    pub og: Arc<OgImageService>,
}

impl AppState {
    /// Build state around an explicit renderer.
    pub fn new(config: AppConfig, renderer: Arc<dyn Renderer>) -> Self {
        let config = Arc::new(config);
        let cache = Arc::new(TwoTierCache::new(CacheSettings::from_config(&config.og_image.cache)));
        let og = Arc::new(OgImageService::new(Arc::clone(&config), cache, renderer));
        Self { config, og }
    }

    /// Build state with the headless Chromium renderer.
    #[cfg(feature = "render")]
    pub fn with_browser(config: AppConfig) -> Self {
        let renderer = seokit_client::HeadlessRenderer::new(config.og_image.browser.clone());
        Self::new(config, Arc::new(renderer))
    }

    /// Without the `render` feature every capture fails and the fallback
    /// policy applies.
    #[cfg(not(feature = "render"))]
    pub fn with_browser(config: AppConfig) -> Self {
        Self::new(config, Arc::new(NoBrowser))
    }

    pub fn cache(&self) -> &Arc<TwoTierCache> {
        self.og.cache()
    }
}

#[cfg(not(feature = "render"))]
struct NoBrowser;

#[cfg(not(feature = "render"))]
#[async_trait::async_trait]
impl Renderer for NoBrowser {
    async fn capture(
        &self, _target: &str, _profile: &seokit_core::RenderProfile,
    ) -> Result<seokit_client::RenderedImage, seokit_client::RenderError> {
        Err(seokit_client::RenderError::BrowserNotFound("built without the render feature".into()))
    }
}
