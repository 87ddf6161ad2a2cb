//! Fake renderers and config for in-process tests.

use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgb, RgbImage};
use seokit_client::{RenderError, RenderedImage, Renderer};
use seokit_core::config::Dimensions;
use seokit_core::{AppConfig, RenderProfile};

/// OG-enabled config with small images and the cache under `dir`.
pub fn og_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.og_image.enabled = true;
    config.og_image.viewport = Dimensions::new(320, 168);
    config.og_image.output = Dimensions::new(240, 126);
    config.og_image.crawler.viewport = Dimensions::new(240, 126);
    config.og_image.cache.dir = dir.to_path_buf();
    config
}

/// Produces a real PNG of the profile viewport and counts launches.
#[derive(Default)]
pub struct PngRenderer {
    pub launches: AtomicUsize,
    targets: Mutex<Vec<String>>,
    garbage: bool,
}

impl PngRenderer {
    /// Returns bytes no decoder accepts.
    pub fn garbage() -> Self {
        Self { garbage: true, ..Default::default() }
    }

    pub fn last_target(&self) -> Option<String> {
        self.targets.lock().ok().and_then(|t| t.last().cloned())
    }
}

#[async_trait::async_trait]
impl Renderer for PngRenderer {
    async fn capture(&self, target: &str, profile: &RenderProfile) -> Result<RenderedImage, RenderError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target.to_string());
        }

        let (width, height) = profile.viewport;
        if self.garbage {
            return Ok(RenderedImage { bytes: b"not a png".to_vec(), width, height });
        }

        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| RenderError::Capture(e.to_string()))?;
        Ok(RenderedImage { bytes, width, height })
    }
}

/// Fails every capture as if no browser could be launched.
#[derive(Default)]
pub struct FailingRenderer {
    pub launches: AtomicUsize,
}

#[async_trait::async_trait]
impl Renderer for FailingRenderer {
    async fn capture(&self, _target: &str, _profile: &RenderProfile) -> Result<RenderedImage, RenderError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Err(RenderError::BrowserLaunch("chrome exited during startup".into()))
    }
}
