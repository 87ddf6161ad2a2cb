//! chromiumoxide-backed [`Renderer`].

use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport as ClipRegion};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::StreamExt;
use seokit_core::config::BrowserSettings;
use seokit_core::profile::RenderProfile;
use tokio::task::JoinHandle;

use super::{RenderError, RenderedImage, Renderer, browser};

/// Interval between `document.readyState` polls.
const READY_POLL: Duration = Duration::from_millis(100);

/// Headless Chrome/Chromium renderer using chromiumoxide.
///
/// Every capture launches its own browser process and tears it down before
/// returning, whatever the outcome.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    settings: BrowserSettings,
}

impl HeadlessRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl Renderer for HeadlessRenderer {
    async fn capture(&self, target: &str, profile: &RenderProfile) -> Result<RenderedImage, RenderError> {
        let start = Instant::now();
        let mut session = Session::launch(&self.settings, profile.viewport).await?;

        let result = session.screenshot(target, profile).await;
        session.close().await;

        let image = result?;
        tracing::info!(
            target_url = target,
            render_ms = start.elapsed().as_millis() as u64,
            bytes = image.bytes.len(),
            "page captured"
        );
        Ok(image)
    }
}

/// One browser process plus the task pumping its CDP events.
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Session {
    async fn launch(settings: &BrowserSettings, (width, height): (u32, u32)) -> Result<Self, RenderError> {
        let executable = browser::find_executable(settings);

        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: width >= height,
                has_touch: false,
            })
            .args(browser::launch_args(settings));
        if let Some(path) = &executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|e| match executable {
            Some(_) => RenderError::BrowserLaunch(e),
            None => RenderError::BrowserNotFound(e),
        })?;

        let (browser, mut handler) =
            Browser::launch(config).await.map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    async fn screenshot(&self, target: &str, profile: &RenderProfile) -> Result<RenderedImage, RenderError> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| RenderError::Navigation(e.to_string()))?;

        navigate(&page, target, profile).await?;
        hide_chrome(&page, &profile.hide_selector).await;
        tokio::time::sleep(profile.settle()).await;

        if let Some(ready_timeout) = profile.ready_timeout() {
            wait_for_ready(&page, ready_timeout).await;
        }

        let (width, height) = profile.viewport;
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(ClipRegion { x: 0.0, y: 0.0, width: f64::from(width), height: f64::from(height), scale: 1.0 })
            .build();

        let bytes = page.screenshot(params).await.map_err(|e| RenderError::Capture(e.to_string()))?;
        if bytes.is_empty() {
            return Err(RenderError::Capture("empty screenshot".into()));
        }

        Ok(RenderedImage { bytes, width, height })
    }

    /// Close the browser, reap the process and stop the event pump.
    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("browser wait failed: {e}");
        }
        self.handler.abort();
    }
}

/// Navigate with a bounded wait; a timeout leaves the page as loaded so far.
async fn navigate(page: &Page, target: &str, profile: &RenderProfile) -> Result<(), RenderError> {
    match tokio::time::timeout(profile.navigation_timeout(), page.goto(target)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(CdpError::Timeout)) | Err(_) => {
            tracing::warn!(
                target_url = target,
                timeout_ms = profile.navigation_timeout_ms,
                "navigation timed out, capturing current state"
            );
            Ok(())
        }
        Ok(Err(e)) => Err(RenderError::Navigation(e.to_string())),
    }
}

/// Suppress scrollbars, margins and elements flagged for exclusion.
async fn hide_chrome(page: &Page, hide_selector: &str) {
    let mut css = String::from("html,body{margin:0!important;overflow:hidden!important}::-webkit-scrollbar{display:none!important}");
    if !hide_selector.trim().is_empty() {
        css.push_str(&format!("{hide_selector}{{display:none!important}}"));
    }

    let literal = match serde_json::to_string(&css) {
        Ok(literal) => literal,
        Err(e) => {
            tracing::warn!("capture stylesheet encoding failed: {e}");
            return;
        }
    };
    let script = format!(
        "(() => {{ const s = document.createElement('style'); s.textContent = {literal}; \
         (document.head || document.documentElement).appendChild(s); }})()"
    );

    if let Err(e) = page.evaluate(script).await {
        tracing::warn!("capture stylesheet injection failed: {e}");
    }
}

/// Poll `document.readyState` until `complete` or the bound elapses.
async fn wait_for_ready(page: &Page, bound: Duration) {
    let poll = async {
        loop {
            let state = page.evaluate("document.readyState").await.ok().and_then(|r| r.into_value::<String>().ok());
            if state.as_deref() == Some("complete") {
                return;
            }
            tokio::time::sleep(READY_POLL).await;
        }
    };

    if tokio::time::timeout(bound, poll).await.is_err() {
        tracing::warn!(timeout_ms = bound.as_millis() as u64, "document not ready, capturing anyway");
    }
}
