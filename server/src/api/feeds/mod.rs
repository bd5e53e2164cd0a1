//! Crawler-facing documents: sitemaps and robots.txt.

pub mod robots;
pub mod sitemap;

use crate::AppState;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use utoipa::OpenApi;

/// Cache lifetimes in seconds.
pub const CACHE_NORMAL: u32 = 3600;
pub const CACHE_CATEGORIES: u32 = 1800;
pub const CACHE_DEGRADED: u32 = 300;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sitemap", get(sitemap::api_sitemap))
        .route("/sitemap.xml", get(sitemap::sitemap_xml))
        .route("/sitemap-news.xml", get(sitemap::news_xml))
        .route("/sitemap-categories.xml", get(sitemap::categories_xml))
        .route("/sitemap-index.xml", get(sitemap::index_xml))
        .route("/robots.txt", get(robots::robots_txt))
}

#[derive(OpenApi)]
#[openapi(paths(
    sitemap::api_sitemap,
    sitemap::sitemap_xml,
    sitemap::news_xml,
    sitemap::categories_xml,
    sitemap::index_xml,
    robots::robots_txt,
))]
pub struct ApiDoc;

/// Always 200: upstream failures shrink the document and shorten its cache life.
fn cached(content_type: &'static str, body: String, max_age: u32) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CACHE_CONTROL, format!("public, max-age={}", max_age)),
        ],
        body,
    )
        .into_response()
}

pub(crate) fn xml(body: String, max_age: u32) -> Response {
    cached("application/xml", body, max_age)
}

pub(crate) fn text(body: String, max_age: u32) -> Response {
    cached("text/plain; charset=utf-8", body, max_age)
}
