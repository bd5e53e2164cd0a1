use crate::api::ErrorResponse;
use crate::auth::{session_cookie, Profile};
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use epoch_core::AuthError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// WordPress JWT; also set as the session cookie.
    pub token: String,
    pub user: Profile,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"username": "editor", "password": "password"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 502, description = "WordPress unavailable", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = match state.auth.login(req.username.trim(), &req.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return ErrorResponse::respond(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        Err(AuthError::Rejected(message)) => {
            tracing::warn!(reason = %message, "login rejected");
            return ErrorResponse::respond(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(AuthError::Fetch(e)) => {
            tracing::error!(error = %e, "login failed");
            return ErrorResponse::respond(StatusCode::BAD_GATEWAY, "Login failed");
        }
    };

    tracing::info!(user_id = user.id, "signed in");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&user.token))],
        Json(LoginResponse {
            user: Profile::from(&user),
            token: user.token,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_json, post_json};
    use crate::state::testing::state;
    use axum::http::{header, StatusCode};
    use epoch_core::MockClient;
    use serde_json::json;
    use std::sync::Arc;

    const TOKEN_URL: &str = "https://api.test/wp-json/jwt-auth/v1/token";
    const ME_URL: &str = "https://api.test/wp-json/wp/v2/users/me?context=edit";

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let mock = Arc::new(
            MockClient::new()
                .with_json(TOKEN_URL, json!({"token": "jwt-1"}))
                .with_json(
                    ME_URL,
                    json!({"id": 4, "name": "Ada", "slug": "ada", "roles": ["author"]}),
                ),
        );
        let response = post_json(
            state(mock),
            "/api/auth/login",
            json!({"username": "ada", "password": "pw"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("epoch_session=jwt-1;"));
        let body = body_json(response).await;
        assert_eq!(body["token"], "jwt-1");
        assert_eq!(body["user"]["displayName"], "Ada");
        assert_eq!(body["user"]["roles"], json!(["author"]));
        assert!(body["user"].get("token").is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let mock = Arc::new(MockClient::new().with_rejection(
            TOKEN_URL,
            403,
            json!({"code": "[jwt_auth] incorrect_password", "message": "Incorrect password"}),
        ));
        let response = post_json(
            state(mock),
            "/api/auth/login",
            json!({"username": "ada", "password": "nope"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid credentials");
    }
}
