use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use epoch_core::{AuthError, WordPressUser};
use serde::Serialize;
use utoipa::ToSchema;

/// Cookie holding the WordPress JWT for browser sessions.
pub const SESSION_COOKIE: &str = "epoch_session";

/// Lifetime of the session cookie; matches the JWT plugin's default token expiry.
const SESSION_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Extractor that validates the bearer token or session cookie against WordPress.
///
/// Behind `require_author` the user is already resolved and is read from the
/// request extensions instead of asking WordPress again.
#[derive(Debug, Clone)]
pub struct Session(pub WordPressUser);

#[derive(Debug)]
pub enum SessionError {
    Missing,
    InvalidFormat,
    InvalidToken,
    Unavailable,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SessionError::Missing => (StatusCode::UNAUTHORIZED, "Not signed in"),
            SessionError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            SessionError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired session"),
            SessionError::Unavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Authentication service unavailable")
            }
        };
        ErrorResponse::respond(status, message)
    }
}

/// Account details safe to hand back to the browser.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
}

impl From<&WordPressUser> for Profile {
    fn from(user: &WordPressUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// The token a request carries. An `Authorization` header wins over the cookie.
pub fn session_token(headers: &HeaderMap) -> Result<Option<&str>, SessionError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| SessionError::InvalidFormat)?;
        return value
            .strip_prefix("Bearer ")
            .map(|token| Some(token.trim()))
            .ok_or(SessionError::InvalidFormat);
    }

    Ok(cookie_value(headers, SESSION_COOKIE).filter(|token| !token.is_empty()))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Ask WordPress who the request's token belongs to.
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<WordPressUser, SessionError> {
    let token = session_token(headers)?.ok_or(SessionError::Missing)?;

    match state.auth.current_user(token).await {
        Ok(user) => Ok(user),
        Err(AuthError::InvalidCredentials | AuthError::Rejected(_)) => {
            Err(SessionError::InvalidToken)
        }
        Err(AuthError::Fetch(e)) => {
            tracing::error!(error = %e, "session lookup failed");
            Err(SessionError::Unavailable)
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let state = AppState::from_ref(state);
        let user = resolve_session(&state, &parts.headers).await?;
        Ok(Session(user))
    }
}

/// `Set-Cookie` value that starts a browser session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    )
}

/// `Set-Cookie` value that ends it.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    )
}
