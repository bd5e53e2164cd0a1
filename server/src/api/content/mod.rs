//! Listing and article JSON for the page renderer.

pub mod articles;
pub mod home;
pub mod sections;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/home", get(home::home))
        .route("/api/sections/{slug}", get(sections::get_section))
        .route("/api/articles/{slug}", get(articles::get_article))
}

#[derive(OpenApi)]
#[openapi(
    paths(home::home, sections::get_section, articles::get_article),
    components(schemas(
        epoch_core::HomepageFeed,
        epoch_core::SectionFeed,
        epoch_core::Section,
        sections::SectionResponse,
        articles::ArticleResponse,
    ))
)]
pub struct ApiDoc;
