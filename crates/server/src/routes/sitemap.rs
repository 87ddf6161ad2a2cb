use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;

use crate::state::AppState;

/// Serve sitemap.xml with today's date as the default `lastmod`.
pub async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    let body = seokit_core::seo::sitemap_xml(&state.config, Utc::now().date_naive());
    (
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600, s-maxage=3600"),
        ],
        body,
    )
}
