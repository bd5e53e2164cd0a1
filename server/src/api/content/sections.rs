use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use epoch_core::{Section, TransformedPost};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Listing pages that are not a single category.
const EDITORS_PICKS: &str = "editors-picks";
const LATEST: &str = "latest";

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SectionParams {
    /// Number of posts (default: 20, max: 100)
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SectionResponse {
    pub slug: String,
    pub title: String,
    pub posts: Vec<TransformedPost>,
}

#[utoipa::path(
    get,
    path = "/api/sections/{slug}",
    tag = "content",
    params(
        ("slug" = String, Path, description = "Section slug, `editors-picks` or `latest`"),
        SectionParams
    ),
    responses(
        (status = 200, description = "Newest posts in the section; empty when WordPress is unavailable", body = SectionResponse),
        (status = 404, description = "Unknown section", body = ErrorResponse)
    )
)]
pub async fn get_section(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<SectionParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let (title, posts) = match slug.as_str() {
        EDITORS_PICKS => (
            "Editor's Picks".to_string(),
            state.sections.editors_picks(limit).await,
        ),
        LATEST => (
            "Latest Headlines".to_string(),
            state.sections.latest_headlines(limit).await,
        ),
        other => match Section::from_slug(other) {
            Some(section) => (
                section.title().to_string(),
                state.sections.section(section, limit).await,
            ),
            None => {
                return ErrorResponse::respond(
                    StatusCode::NOT_FOUND,
                    format!("Unknown section: {}", other),
                )
            }
        },
    };

    (
        StatusCode::OK,
        Json(SectionResponse { slug, title, posts }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_json, get};
    use crate::state::testing::state;
    use axum::http::StatusCode;
    use epoch_core::{MockClient, PostQuery};
    use serde_json::json;
    use std::sync::Arc;

    const CATEGORIES_URL: &str = "https://api.test/wp-json/wp/v2/categories?per_page=100";

    fn posts_url(query: &PostQuery) -> String {
        let config = epoch_core::SiteConfig::new(
            crate::state::testing::API_URL,
            crate::state::testing::FRONTEND_URL,
        )
        .unwrap();
        epoch_core::WordPressClient::new(Arc::new(MockClient::new()), Arc::new(config))
            .posts_url(query)
    }

    #[tokio::test]
    async fn test_unknown_section_is_404() {
        let mock = Arc::new(MockClient::new());
        let response = get(state(mock.clone()), "/api/sections/not-a-section").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unknown section: not-a-section");
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_section_fetches_at_least_twenty() {
        let query = PostQuery {
            categories: Some("12".to_string()),
            per_page: Some(20),
            ..PostQuery::default()
        };
        let mock = Arc::new(
            MockClient::new()
                .with_json(
                    CATEGORIES_URL,
                    json!([{"id": 12, "slug": "booknook", "name": "BookNook", "count": 4}]),
                )
                .with_json(
                    &posts_url(&query),
                    json!([{"id": 5, "slug": "a-novel", "title": {"rendered": "A Novel"}}]),
                ),
        );
        let response = get(state(mock), "/api/sections/booknook?limit=3").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "BookNook");
        assert_eq!(body["posts"][0]["slug"], "a-novel");
    }

    #[tokio::test]
    async fn test_editors_picks_are_featured() {
        let recent = posts_url(&PostQuery::latest(20));
        let mock = Arc::new(MockClient::new().with_json(
            &recent,
            json!([{"id": 9, "slug": "pick", "title": {"rendered": "Pick"}}]),
        ));
        let response = get(state(mock), "/api/sections/editors-picks?limit=3").await;

        let body = body_json(response).await;
        assert_eq!(body["slug"], "editors-picks");
        assert_eq!(body["posts"][0]["featured"], true);
    }
}
