use crate::auth::{Profile, Session};
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use epoch_core::TransformedPost;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub user: Profile,
    /// The author's own posts in every status their token can read.
    pub posts: Vec<TransformedPost>,
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "The signed-in author's posts", body = DashboardResponse),
        (status = 303, description = "Not signed in, or not an author")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dashboard(
    Session(user): Session,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let posts = state
        .wordpress
        .get_user_posts(Some(user.id), &user.token)
        .await;

    Json(DashboardResponse {
        user: Profile::from(&user),
        posts: state.transformer().transform_all(&posts),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_json, send};
    use crate::auth::{SIGN_IN_PATH, UNAUTHORIZED_PATH};
    use crate::state::testing::state;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use epoch_core::MockClient;
    use serde_json::json;
    use std::sync::Arc;

    const ME_URL: &str = "https://api.test/wp-json/wp/v2/users/me?context=edit";
    const AUTHOR_POSTS_URL: &str =
        "https://api.test/wp-json/wp/v2/posts?author=4&_embed=true&status=any";

    fn with_cookie(token: &str) -> Request<Body> {
        Request::get("/dashboard")
            .header(header::COOKIE, format!("epoch_session={}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn location(response: &axum::http::Response<Body>) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_sign_in() {
        let request = Request::get("/dashboard?tab=drafts").body(Body::empty()).unwrap();
        let response = send(state(Arc::new(MockClient::new())), request).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            format!("{}?callbackUrl=%2Fdashboard%3Ftab%3Ddrafts", SIGN_IN_PATH)
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_sent_to_sign_in() {
        let mock = Arc::new(MockClient::new().with_status(ME_URL, 401));
        let response = send(state(mock), with_cookie("stale")).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with(SIGN_IN_PATH));
    }

    #[tokio::test]
    async fn test_subscriber_is_unauthorized() {
        let mock = Arc::new(
            MockClient::new().with_json(ME_URL, json!({"id": 8, "name": "Reader", "slug": "reader"})),
        );
        let response = send(state(mock), with_cookie("reader-token")).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), UNAUTHORIZED_PATH);
    }

    #[tokio::test]
    async fn test_author_sees_own_posts() {
        let mock = Arc::new(
            MockClient::new()
                .with_json(
                    ME_URL,
                    json!({"id": 4, "name": "Ada", "slug": "ada", "roles": ["author"]}),
                )
                .with_json(
                    AUTHOR_POSTS_URL,
                    json!([{"id": 70, "slug": "draft-one", "status": "draft", "title": {"rendered": "Draft One"}}]),
                ),
        );
        let response = send(state(mock.clone()), with_cookie("author-token")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["username"], "ada");
        assert_eq!(body["posts"][0]["title"], "Draft One");
        // The middleware's lookup is reused by the handler.
        assert_eq!(mock.request_count("users/me"), 1);
    }
}
