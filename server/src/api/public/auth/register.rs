use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use epoch_core::AuthError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body(content = RegisterRequest, example = json!({"username": "reader", "email": "reader@example.com", "password": "password123"})),
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input or rejected by WordPress", body = ErrorResponse),
        (status = 502, description = "WordPress unavailable", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    let username = req.username.trim();
    let email = req.email.trim();

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return ErrorResponse::respond(
            StatusCode::BAD_REQUEST,
            "Username, email and password are required",
        );
    }
    if !email.contains('@') {
        return ErrorResponse::respond(StatusCode::BAD_REQUEST, "Invalid email address");
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return ErrorResponse::respond(
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }

    match state.auth.register(username, email, &req.password).await {
        Ok(upstream) => {
            tracing::info!(username, "account registered");
            (
                StatusCode::CREATED,
                Json(RegisterResponse {
                    message: upstream
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("Registration successful")
                        .to_string(),
                    user_id: upstream.get("user_id").and_then(Value::as_u64),
                }),
            )
                .into_response()
        }
        Err(AuthError::Rejected(message)) => {
            ErrorResponse::respond(StatusCode::BAD_REQUEST, message)
        }
        Err(e) => {
            tracing::error!(username, error = %e, "registration failed");
            ErrorResponse::respond(StatusCode::BAD_GATEWAY, "Registration failed")
        }
    }
}
