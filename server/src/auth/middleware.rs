use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::{resolve_session, Session};

pub const SIGN_IN_PATH: &str = "/auth/signin";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Middleware for pages only authors may see.
///
/// Without a valid session the browser is sent to sign in and brought back
/// afterwards; a signed-in user without the author role is sent to
/// `/unauthorized`. Both are 303 redirects.
pub async fn require_author(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match resolve_session(&state, request.headers()).await {
        Ok(user) => user,
        Err(reason) => {
            let callback = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            tracing::debug!(?reason, callback, "no session, redirecting to sign in");
            return Redirect::to(&sign_in_url(callback)).into_response();
        }
    };

    if !user.is_author() {
        tracing::info!(user_id = user.id, roles = ?user.roles, "non-author refused");
        return Redirect::to(UNAUTHORIZED_PATH).into_response();
    }

    request.extensions_mut().insert(Session(user));
    next.run(request).await
}

fn sign_in_url(callback: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(callback.as_bytes()).collect();
    format!("{}?callbackUrl={}", SIGN_IN_PATH, encoded)
}
