//! Render target resolution.
//!
//! Decides which origin the headless browser navigates to for a given OG
//! request, and which host participates in the cache key.

use seokit_core::config::AppConfig;

/// Origin-relevant request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    /// `Host`
    pub host: Option<String>,
    /// `X-Forwarded-Host`
    pub forwarded_host: Option<String>,
    /// `X-Forwarded-Proto`
    pub forwarded_proto: Option<String>,
}

impl RequestOrigin {
    /// Host as seen by the client: forwarded host first, then `Host`.
    ///
    /// Only the first entry of a comma-separated forwarded list is used.
    pub fn effective_host(&self) -> Option<&str> {
        first_value(self.forwarded_host.as_deref()).or_else(|| first_value(self.host.as_deref()))
    }

    fn protocol(&self, host: &str) -> &str {
        match first_value(self.forwarded_proto.as_deref()) {
            Some(proto) => proto,
            None if host.contains("localhost") => "http",
            None => "https",
        }
    }
}

fn first_value(value: Option<&str>) -> Option<&str> {
    value.and_then(|v| v.split(',').next()).map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the origin a render navigates to.
///
/// Development mode always targets `server.dev_origin`; otherwise the
/// request's forwarded/`Host` headers win over the configured site origin.
pub fn resolve_origin(config: &AppConfig, request: &RequestOrigin) -> Option<String> {
    if config.server.dev_mode {
        return Some(config.server.dev_origin.trim_end_matches('/').to_string());
    }

    if let Some(host) = request.effective_host() {
        return Some(format!("{}://{host}", request.protocol(host)));
    }

    let origin = config.site_origin();
    if origin.is_empty() { None } else { Some(origin) }
}

/// Fully qualified render target for `path`.
///
/// An unresolved origin yields the bare path, which fails later at
/// navigation rather than here.
pub fn resolve_target(config: &AppConfig, request: &RequestOrigin, path: &str) -> String {
    let path = normalize_path(path);
    match resolve_origin(config, request) {
        Some(origin) => format!("{origin}{path}"),
        None => path,
    }
}

/// Host folded into the cache key; matches the host the render targets.
pub fn cache_host(config: &AppConfig, request: &RequestOrigin) -> String {
    resolve_origin(config, request)
        .map(|origin| match origin.split_once("://") {
            Some((_, host)) => host.to_string(),
            None => origin,
        })
        .unwrap_or_default()
}

/// Ensure a leading `/`; empty becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') { path.to_string() } else { format!("/{path}") }
}
