//! OG image endpoint.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use seokit_client::RequestOrigin;
use serde::Deserialize;

use crate::error::WebError;
use crate::og::{OgImage, OgOutcome, OgRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OgQuery {
    /// Page path to render (default `/`).
    #[serde(default)]
    path: Option<String>,
}

/// Handle a request for an OG image.
///
/// Route: `GET <og_image.route>?path=<page path>`
pub async fn og_image(
    State(state): State<AppState>, Query(query): Query<OgQuery>, headers: HeaderMap,
) -> Result<Response, WebError> {
    let request = OgRequest {
        path: query.path.unwrap_or_else(|| "/".into()),
        user_agent: header_str(&headers, header::USER_AGENT.as_str()),
        origin: RequestOrigin {
            host: header_str(&headers, header::HOST.as_str()),
            forwarded_host: header_str(&headers, "x-forwarded-host"),
            forwarded_proto: header_str(&headers, "x-forwarded-proto"),
        },
    };

    match state.og.handle(&request).await {
        OgOutcome::Disabled => Err(WebError::NotFound("OG image generation is disabled".into())),
        OgOutcome::Served(image) if matches_etag(&headers, &image.etag) => Ok(not_modified(image)),
        OgOutcome::Served(image) => Ok(image_response(image)),
        OgOutcome::Redirect(location) => Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response()),
        OgOutcome::Failed(reason) => Err(WebError::Internal(reason)),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    let header_value = match headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => return false,
    };
    if header_value.trim() == "*" {
        return true;
    }
    header_value.split(',').map(str::trim).any(|value| value == etag || value.strip_prefix("W/") == Some(etag))
}

fn image_response(image: OgImage) -> Response {
    (
        [
            (header::CONTENT_TYPE, image.format.mime().to_string()),
            (header::CACHE_CONTROL, image.cache_control),
            (header::ETAG, image.etag),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        image.bytes,
    )
        .into_response()
}

fn not_modified(image: OgImage) -> Response {
    (StatusCode::NOT_MODIFIED, [(header::ETAG, image.etag), (header::CACHE_CONTROL, image.cache_control)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_if_none_match(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_matches_etag() {
        assert!(!matches_etag(&HeaderMap::new(), "\"abc\""));
        assert!(matches_etag(&with_if_none_match("\"abc\""), "\"abc\""));
        assert!(matches_etag(&with_if_none_match("\"x\", \"abc\""), "\"abc\""));
        assert!(matches_etag(&with_if_none_match("W/\"abc\""), "\"abc\""));
        assert!(matches_etag(&with_if_none_match("*"), "\"abc\""));
        assert!(!matches_etag(&with_if_none_match("\"abd\""), "\"abc\""));
    }
}
