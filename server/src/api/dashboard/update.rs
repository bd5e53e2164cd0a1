use super::{upstream_error, EditablePost};
use crate::api::ErrorResponse;
use crate::auth::Session;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use epoch_core::PostChanges;

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "dashboard",
    params(
        ("id" = u64, Path, description = "WordPress post ID")
    ),
    request_body = PostChanges,
    responses(
        (status = 200, description = "Post updated", body = EditablePost),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "WordPress refused the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 502, description = "WordPress request failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_post(
    Session(user): Session,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(changes): Json<PostChanges>,
) -> impl IntoResponse {
    if changes.is_empty() {
        return ErrorResponse::respond(StatusCode::BAD_REQUEST, "No changes supplied");
    }
    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return ErrorResponse::respond(StatusCode::BAD_REQUEST, "Title cannot be empty");
    }

    match state.wordpress.update_post(&user.token, id, &changes).await {
        Ok(post) => Json(EditablePost::from(&post)).into_response(),
        Err(e) => upstream_error(&e, "Failed to update post"),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::dashboard::testing::{author_mock, authed};
    use crate::api::test_support::{body_json, send};
    use crate::state::testing::state;
    use axum::http::{Method, StatusCode};
    use epoch_core::MockResponse;
    use serde_json::json;
    use std::sync::Arc;

    const POST_URL: &str = "https://api.test/wp-json/wp/v2/posts/70";

    #[tokio::test]
    async fn test_update_sends_only_given_fields() {
        let mock = Arc::new(author_mock().with_method_response(
            "PUT",
            POST_URL,
            MockResponse::Json(json!({"id": 70, "status": "pending", "title": {"rendered": "Draft One"}})),
        ));
        let body = json!({"status": "pending", "featured_media": 12});
        let response = send(state(mock.clone()), authed(Method::PUT, "/api/posts/70", Some(body))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "pending");

        let call = mock.calls().into_iter().find(|c| c.method == "PUT").unwrap();
        assert_eq!(call.body, Some(json!({"status": "pending", "featured_media": 12})));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let mock = Arc::new(author_mock());
        let response = send(state(mock.clone()), authed(Method::PUT, "/api/posts/70", Some(json!({})))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No changes supplied");
        assert!(mock.calls().iter().all(|c| c.method != "PUT"));
    }

    #[tokio::test]
    async fn test_update_of_unknown_post_is_404() {
        let mock = Arc::new(author_mock().with_method_response(
            "PUT",
            POST_URL,
            MockResponse::Rejected(404, json!({"code": "rest_post_invalid_id", "message": "Invalid post ID."})),
        ));
        let body = json!({"title": "New title"});
        let response = send(state(mock), authed(Method::PUT, "/api/posts/70", Some(body))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Invalid post ID.");
    }
}
