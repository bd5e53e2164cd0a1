use super::MessageResponse;
use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

/// Same answer whether or not the address has an account.
const RESET_SENT: &str = "If an account exists for that email, a password reset link has been sent.";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body(content = ForgotPasswordRequest, example = json!({"email": "reader@example.com"})),
    responses(
        (status = 200, description = "Reset requested", body = MessageResponse),
        (status = 400, description = "Missing email", body = ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> impl IntoResponse {
    let email = req.email.trim();
    if email.is_empty() {
        return ErrorResponse::respond(StatusCode::BAD_REQUEST, "Email is required");
    }

    match state.auth.reset_password(email).await {
        Ok(reply) => tracing::debug!(reply = %reply, "password reset requested"),
        Err(e) => tracing::warn!(error = %e, "password reset request failed"),
    }

    (
        StatusCode::OK,
        Json(MessageResponse {
            message: RESET_SENT.to_string(),
        }),
    )
        .into_response()
}
