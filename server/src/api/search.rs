use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use epoch_core::TransformedPost;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

const DEFAULT_PER_PAGE: u32 = 20;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search))
}

#[derive(OpenApi)]
#[openapi(
    paths(search),
    components(schemas(SearchResponse, SearchErrorResponse))
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Search terms (required, surrounding whitespace ignored)
    pub q: Option<String>,
    /// Page number (default: 1)
    pub page: Option<u32>,
    /// Results per page (default: 20)
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub posts: Vec<TransformedPost>,
    pub total: usize,
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

/// Error body that still carries an empty result set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchErrorResponse {
    pub posts: Vec<TransformedPost>,
    pub total: usize,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl SearchErrorResponse {
    fn new(error: &str, details: Option<String>) -> Self {
        Self {
            posts: Vec::new(),
            total: 0,
            error: error.to_string(),
            details,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/search",
    tag = "search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching posts, newest first", body = SearchResponse),
        (status = 400, description = "Missing search query or malformed paging", body = SearchErrorResponse),
        (status = 500, description = "WordPress search failed", body = SearchErrorResponse)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SearchErrorResponse::new(
                    "Invalid search parameters",
                    Some(rejection.body_text()),
                )),
            )
                .into_response();
        }
    };

    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(SearchErrorResponse::new("Search query is required", None)),
        )
            .into_response();
    }

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    tracing::debug!(query, page, per_page, "search");

    let posts = match state.wordpress.search(query, page, per_page).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!(query, error = %e, "search failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchErrorResponse::new("Search failed", Some(e.to_string()))),
            )
                .into_response();
        }
    };

    let posts = state.transformer().transform_all(&posts);
    (
        StatusCode::OK,
        Json(SearchResponse {
            total: posts.len(),
            posts,
            query: query.to_string(),
            page,
            per_page,
        }),
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

    fn search_url(search: &str, page: u32, per_page: u32) -> String {
        let config = epoch_core::SiteConfig::new(
            crate::state::testing::API_URL,
            crate::state::testing::FRONTEND_URL,
        )
        .unwrap();
        let wp = epoch_core::WordPressClient::new(Arc::new(MockClient::new()), Arc::new(config));
        wp.posts_url(&PostQuery {
            search: Some(search.to_string()),
            page: Some(page),
            per_page: Some(per_page),
            ..PostQuery::default()
        })
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let mock = Arc::new(MockClient::new());
        let response = get(state(mock.clone()), "/api/search?q=%20%20").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Search query is required");
        assert_eq!(body["total"], 0);
        assert_eq!(body["posts"], json!([]));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_transformed_posts() {
        let mock = Arc::new(MockClient::new().with_json(
            &search_url("maple", 2, 5),
            json!([
                {"id": 1, "slug": "maple-syrup", "title": {"rendered": "Maple &amp; Syrup"}},
                {"id": 2, "slug": "maple-leaf", "title": {"rendered": "Maple Leaf"}}
            ]),
        ));
        let response = get(state(mock), "/api/search?q=+maple+&page=2&per_page=5").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["query"], "maple");
        assert_eq!(body["page"], 2);
        assert_eq!(body["perPage"], 5);
        assert_eq!(body["posts"][0]["title"], "Maple & Syrup");
        assert_eq!(body["posts"][1]["slug"], "maple-leaf");
    }

    #[tokio::test]
    async fn test_malformed_paging_gets_json_error() {
        let mock = Arc::new(MockClient::new());
        let response = get(state(mock.clone()), "/api/search?q=maple&page=abc").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid search parameters");
        assert_eq!(body["posts"], json!([]));
        assert_eq!(body["total"], 0);
        assert!(body["details"].as_str().unwrap().contains("page"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500() {
        let mock = Arc::new(MockClient::new().with_status(&search_url("maple", 1, 20), 502));
        let response = get(state(mock), "/api/search?q=maple").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Search failed");
        assert_eq!(body["total"], 0);
        assert!(body["details"].as_str().unwrap().contains("502"));
    }
}
