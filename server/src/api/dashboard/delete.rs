use super::upstream_error;
use crate::api::ErrorResponse;
use crate::auth::Session;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "dashboard",
    params(
        ("id" = u64, Path, description = "WordPress post ID")
    ),
    responses(
        (status = 204, description = "Post moved to the trash"),
        (status = 403, description = "WordPress refused the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 502, description = "WordPress request failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_post(
    Session(user): Session,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.wordpress.delete_post(&user.token, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => upstream_error(&e, "Failed to delete post"),
    }
}
