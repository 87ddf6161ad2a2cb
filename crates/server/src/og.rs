//! OG image orchestrator.
//!
//! Composes classification, cache key derivation, the two-tier cache, the
//! renderer and the transcoder into one request-scoped pipeline:
//!
//! ```text
//! Disabled ──> reject
//! CacheCheck ──hit──> Served
//!     └─miss─> Render ──ok──> Transcode ──> Persist ──> Served
//!                 └─err─> Fallback ──default image──> Redirect
//!                            └──────────none───────> Failed
//! ```

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use seokit_client::{RequestOrigin, Renderer, TranscodeOutput, Transcoder, cache_host, normalize_path, resolve_origin, resolve_target};
use seokit_core::cache::{Tier, content_etag};
use seokit_core::{AppConfig, CacheKey, Error, ImageFormat, ProfileSet, RenderProfile, TwoTierCache, classify};
use url::Url;

/// Inputs the orchestrator needs from an HTTP request.
#[derive(Debug, Clone, Default)]
pub struct OgRequest {
    /// Page path to render; empty means `/`.
    pub path: String,
    pub user_agent: Option<String>,
    pub origin: RequestOrigin,
}

/// Where a served image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Cache(Tier),
    Rendered,
}

/// Image bytes plus the headers they are served with.
#[derive(Debug, Clone)]
pub struct OgImage {
    pub bytes: Bytes,
    pub format: ImageFormat,
    pub etag: String,
    pub cache_control: String,
    pub source: ImageSource,
}

/// Result of one OG request; the HTTP layer maps each variant to a response.
#[derive(Debug, Clone)]
pub enum OgOutcome {
    /// Generation is administratively off.
    Disabled,
    Served(OgImage),
    /// Render or transcode failed and a fallback image is configured.
    Redirect(String),
    /// Render or transcode failed with no fallback.
    Failed(String),
}

pub struct OgImageService {
    config: Arc<AppConfig>,
    profiles: ProfileSet,
    cache: Arc<TwoTierCache>,
    renderer: Arc<dyn Renderer>,
    transcoder: Transcoder,
}

impl OgImageService {
    pub fn new(config: Arc<AppConfig>, cache: Arc<TwoTierCache>, renderer: Arc<dyn Renderer>) -> Self {
        let profiles = ProfileSet::from_config(&config.og_image);
        let transcoder = Transcoder::new(config.og_image.max_bytes);
        Self { config, profiles, cache, renderer, transcoder }
    }

    pub fn cache(&self) -> &Arc<TwoTierCache> {
        &self.cache
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    /// Run the pipeline for one request.
    pub async fn handle(&self, request: &OgRequest) -> OgOutcome {
        if !self.config.og_image.enabled {
            return OgOutcome::Disabled;
        }

        let classification = classify(request.user_agent.as_deref(), &self.profiles);
        let profile = classification.profile;
        let path = normalize_path(&request.path);
        let host = cache_host(&self.config, &request.origin);
        let key = CacheKey::derive(&path, &host, profile.format);

        if let Some(hit) = self.cache.lookup(&key).await {
            tracing::debug!(key = %key, tier = hit.tier.as_str(), path = %path, "serving cached OG image");
            return OgOutcome::Served(served(hit.buffer, hit.format, profile, ImageSource::Cache(hit.tier)));
        }

        tracing::info!(key = %key, path = %path, crawler = classification.crawler, "OG cache miss, rendering");

        match self.generate(&path, &request.origin, profile).await {
            Ok(output) => {
                let bytes = Bytes::from(output.bytes);
                self.cache.put(&key, bytes.clone(), output.format).await;
                OgOutcome::Served(served(bytes, output.format, profile, ImageSource::Rendered))
            }
            Err(err) => {
                tracing::error!(error = %err, path = %path, "OG image generation failed");
                self.fallback(&request.origin, &err)
            }
        }
    }

    /// Render then transcode; the renderer has released the browser by the
    /// time this returns.
    async fn generate(
        &self, path: &str, origin: &RequestOrigin, profile: &RenderProfile,
    ) -> Result<TranscodeOutput, Error> {
        let target = resolve_target(&self.config, origin, path);
        let start = Instant::now();

        let raw = self.renderer.capture(&target, profile).await?;
        let output = self
            .transcoder
            .transcode_blocking(raw.bytes, profile.format, profile.output, profile.quality)
            .await?;

        tracing::info!(
            target_url = %target,
            render_ms = start.elapsed().as_millis() as u64,
            bytes = output.bytes.len(),
            recompressed = output.recompressed,
            "OG image generated"
        );
        Ok(output)
    }

    fn fallback(&self, origin: &RequestOrigin, err: &Error) -> OgOutcome {
        let default = self.config.site.default_image.trim();
        if default.is_empty() {
            return OgOutcome::Failed(err.to_string());
        }
        if default.starts_with("http://") || default.starts_with("https://") {
            return OgOutcome::Redirect(default.to_string());
        }

        let redirect = match resolve_origin(&self.config, origin) {
            Some(base) => match Url::parse(&base).and_then(|base| base.join(default)) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::warn!(origin = %base, error = %e, "could not join default image onto origin");
                    format!("{base}{}", normalize_path(default))
                }
            },
            None => normalize_path(default),
        };
        OgOutcome::Redirect(redirect)
    }
}

fn served(bytes: Bytes, format: ImageFormat, profile: &RenderProfile, source: ImageSource) -> OgImage {
    OgImage { etag: content_etag(&bytes), bytes, format, cache_control: profile.cache_control(), source }
}
