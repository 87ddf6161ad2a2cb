use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::state::AppState;

/// Serve the configured crawl policy.
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], seokit_core::seo::robots_txt(&state.config))
}
