//! Page metadata from Yoast, with fallbacks when the plugin has nothing.

use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use epoch_core::{MetadataBuilder, PageMetadata, Section};
use utoipa::OpenApi;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/seo/home", get(home_metadata))
        .route("/api/seo/category/{slug}", get(category_metadata))
        .route("/api/seo/post/{slug}", get(post_metadata))
}

#[derive(OpenApi)]
#[openapi(paths(home_metadata, category_metadata, post_metadata))]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/api/seo/home",
    tag = "seo",
    responses((status = 200, description = "Homepage metadata", body = PageMetadata))
)]
pub async fn home_metadata(State(state): State<AppState>) -> impl IntoResponse {
    let builder = MetadataBuilder::new(&state.config);
    let metadata = match state.yoast.homepage().await {
        Some(yoast) => builder.to_page_metadata(Some(&yoast), None, None),
        None => builder.fallback_metadata(None, None, None),
    };
    Json(metadata)
}

#[utoipa::path(
    get,
    path = "/api/seo/category/{slug}",
    tag = "seo",
    params(("slug" = String, Path, description = "Category slug")),
    responses((status = 200, description = "Category page metadata", body = PageMetadata))
)]
pub async fn category_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let builder = MetadataBuilder::new(&state.config);
    let title = match Section::from_slug(&slug) {
        Some(section) => format!("{} - {}", section.title(), state.config.site_name),
        None => format!("{} - {}", slug, state.config.site_name),
    };

    let metadata = match state.yoast.category(&slug).await {
        Some(yoast) => builder.to_page_metadata(Some(&yoast), Some(&title), None),
        None => {
            let mut metadata = builder.to_page_metadata(None, Some(&title), None);
            metadata.canonical = Some(builder.canonical_for(&slug));
            metadata
        }
    };
    Json(metadata)
}

#[utoipa::path(
    get,
    path = "/api/seo/post/{slug}",
    tag = "seo",
    params(("slug" = String, Path, description = "Post slug")),
    responses((status = 200, description = "Article metadata", body = PageMetadata))
)]
pub async fn post_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let builder = MetadataBuilder::new(&state.config);
    let metadata = match state.yoast.post(&slug).await {
        Some(yoast) => builder.to_page_metadata(Some(&yoast), None, None),
        None => builder.fallback_metadata(None, None, Some(&slug)),
    };
    Json(metadata)
}
