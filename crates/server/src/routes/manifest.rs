use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::WebError;
use crate::state::AppState;

/// Serve `site.webmanifest`; always mounted so browsers never 404 on it.
pub async fn web_manifest(State(state): State<AppState>) -> Result<impl IntoResponse, WebError> {
    let manifest = seokit_core::seo::web_manifest(&state.config);
    let body = serde_json::to_string(&manifest).map_err(|e| WebError::Internal(format!("manifest encoding failed: {e}")))?;

    Ok((
        [(header::CONTENT_TYPE, "application/manifest+json"), (header::CACHE_CONTROL, "public, max-age=3600")],
        body,
    ))
}
