use super::{upstream_error, EditablePost};
use crate::api::ErrorResponse;
use crate::auth::Session;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use epoch_core::NewPost;

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "dashboard",
    request_body = NewPost,
    responses(
        (status = 201, description = "Post created (a draft unless a status is given)", body = EditablePost),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "WordPress refused the author", body = ErrorResponse),
        (status = 502, description = "WordPress request failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_post(
    Session(user): Session,
    State(state): State<AppState>,
    Json(post): Json<NewPost>,
) -> impl IntoResponse {
    if post.title.trim().is_empty() {
        return ErrorResponse::respond(StatusCode::BAD_REQUEST, "Title is required");
    }

    match state.wordpress.create_post(&user.token, &post).await {
        Ok(created) => (StatusCode::CREATED, Json(EditablePost::from(&created))).into_response(),
        Err(e) => upstream_error(&e, "Failed to create post"),
    }
}
