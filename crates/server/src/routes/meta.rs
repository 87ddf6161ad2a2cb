use axum::Json;
use axum::extract::{Query, State};
use seokit_core::config::SeoFields;
use seokit_core::seo::{HeadTags, build_head, resolve_page};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MetaQuery {
    #[serde(default)]
    path: Option<String>,
}

/// Resolved head tags for a page, as JSON.
pub async fn page_meta(State(state): State<AppState>, Query(query): Query<MetaQuery>) -> Json<HeadTags> {
    let path = query.path.unwrap_or_else(|| "/".into());
    let page = resolve_page(&state.config, &path, &SeoFields::default());
    Json(build_head(&state.config, &page))
}
