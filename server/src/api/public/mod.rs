pub mod auth;
pub mod health;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/login", post(auth::login::login))
        .route("/api/auth/logout", post(auth::logout::logout))
        .route("/api/auth/register", post(auth::register::register))
        .route(
            "/api/auth/forgot-password",
            post(auth::forgot_password::forgot_password),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login::login,
        auth::logout::logout,
        auth::register::register,
        auth::forgot_password::forgot_password,
        health::health,
    ),
    components(schemas(
        auth::login::LoginRequest,
        auth::login::LoginResponse,
        auth::register::RegisterRequest,
        auth::register::RegisterResponse,
        auth::forgot_password::ForgotPasswordRequest,
        auth::MessageResponse,
        crate::auth::Profile,
        health::HealthResponse,
    ))
)]
pub struct ApiDoc;
