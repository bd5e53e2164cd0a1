use super::EditablePost;
use crate::api::ErrorResponse;
use crate::auth::Session;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "dashboard",
    params(
        ("id" = u64, Path, description = "WordPress post ID")
    ),
    responses(
        (status = 200, description = "The post, in any status the author can read", body = EditablePost),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_post(
    Session(user): Session,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.wordpress.fetch_post(&user.token, id).await {
        Some(post) => Json(EditablePost::from(&post)).into_response(),
        None => ErrorResponse::respond(StatusCode::NOT_FOUND, "Post not found"),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::dashboard::testing::{author_mock, authed};
    use crate::api::test_support::{body_json, send};
    use crate::state::testing::state;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_draft_for_editing() {
        let mock = Arc::new(author_mock().with_json(
            "https://api.test/wp-json/wp/v2/posts/70",
            json!({
                "id": 70,
                "status": "draft",
                "title": {"rendered": "Draft One"},
                "content": {"rendered": "<p>Body</p>"},
                "categories": [4, 9],
                "featured_media": 12
            }),
        ));
        let response = send(state(mock), authed(Method::GET, "/api/posts/70", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "draft");
        assert_eq!(body["content"], "<p>Body</p>");
        assert_eq!(body["categories"], json!([4, 9]));
        assert_eq!(body["featured_media"], 12);
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let response = send(
            state(Arc::new(author_mock())),
            authed(Method::GET, "/api/posts/71", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Post not found");
    }
}
