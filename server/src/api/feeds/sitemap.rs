use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use epoch_core::{GeneratedSitemap, SitemapKind};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{xml, CACHE_CATEGORIES, CACHE_DEGRADED, CACHE_NORMAL};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SitemapParams {
    /// posts, categories, static or full (default: full). Unknown values fall back to full.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn tiered(sitemap: GeneratedSitemap, max_age: u32) -> axum::response::Response {
    let max_age = if sitemap.degraded {
        CACHE_DEGRADED
    } else {
        max_age
    };
    xml(sitemap.xml, max_age)
}

#[utoipa::path(
    get,
    path = "/api/sitemap",
    tag = "sitemaps",
    params(SitemapParams),
    responses(
        (status = 200, description = "Sitemap XML; cached 1h, or 5m after an upstream failure", content_type = "application/xml", body = String)
    )
)]
pub async fn api_sitemap(
    State(state): State<AppState>,
    Query(params): Query<SitemapParams>,
) -> impl IntoResponse {
    let kind = match params.kind.as_deref() {
        None => SitemapKind::Full,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "unknown sitemap type, serving full sitemap");
            SitemapKind::Full
        }),
    };
    tiered(state.sitemaps.generate(kind).await, CACHE_NORMAL)
}

#[utoipa::path(
    get,
    path = "/sitemap.xml",
    tag = "sitemaps",
    responses(
        (status = 200, description = "Full sitemap", content_type = "application/xml", body = String)
    )
)]
pub async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    tiered(state.sitemaps.full().await, CACHE_NORMAL)
}

#[utoipa::path(
    get,
    path = "/sitemap-news.xml",
    tag = "sitemaps",
    responses(
        (status = 200, description = "Google News sitemap of the last 48 hours", content_type = "application/xml", body = String)
    )
)]
pub async fn news_xml(State(state): State<AppState>) -> impl IntoResponse {
    tiered(state.sitemaps.news().await, CACHE_NORMAL)
}

#[utoipa::path(
    get,
    path = "/sitemap-categories.xml",
    tag = "sitemaps",
    responses(
        (status = 200, description = "Category sitemap", content_type = "application/xml", body = String)
    )
)]
pub async fn categories_xml(State(state): State<AppState>) -> impl IntoResponse {
    tiered(state.sitemaps.categories().await, CACHE_CATEGORIES)
}

#[utoipa::path(
    get,
    path = "/sitemap-index.xml",
    tag = "sitemaps",
    responses(
        (status = 200, description = "Index of the site's sitemaps", content_type = "application/xml", body = String)
    )
)]
pub async fn index_xml(State(state): State<AppState>) -> impl IntoResponse {
    tiered(state.sitemaps.index(), CACHE_NORMAL)
}
