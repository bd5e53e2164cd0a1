//! Author-only pages and post management. Mounted behind `auth::require_author`.

pub mod create;
pub mod delete;
pub mod get;
pub mod media;
pub mod posts;
pub mod update;

use crate::api::ErrorResponse;
use crate::AppState;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use epoch_core::{FetchError, RawPost};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(posts::dashboard))
        .route("/api/posts", post(create::create_post))
        .route(
            "/api/posts/{id}",
            get(get::get_post)
                .put(update::update_post)
                .delete(delete::delete_post),
        )
        .route("/api/media", post(media::upload_media))
        .route("/api/media/{id}", get(media::get_media))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        posts::dashboard,
        create::create_post,
        get::get_post,
        update::update_post,
        delete::delete_post,
        media::upload_media,
        media::get_media,
    ),
    components(schemas(
        posts::DashboardResponse,
        EditablePost,
        media::UploadMediaRequest,
        epoch_core::NewPost,
        epoch_core::PostChanges,
        epoch_core::PostStatus,
        epoch_core::Media,
    ))
)]
pub struct ApiDoc;

/// A post as the editor needs it: raw IDs and status, rendered HTML.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditablePost {
    pub id: u64,
    pub slug: String,
    pub status: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub categories: Vec<u64>,
    pub author: u64,
    pub featured_media: u64,
    pub date: String,
    pub modified: String,
    pub link: String,
}

impl From<&RawPost> for EditablePost {
    fn from(post: &RawPost) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            status: post.status.clone(),
            title: post.title.rendered.clone(),
            content: post.content.rendered.clone(),
            excerpt: post.excerpt.rendered.clone(),
            categories: post.categories.clone(),
            author: post.author,
            featured_media: post.featured_media,
            date: post.date.clone(),
            modified: post.modified.clone(),
            link: post.link.clone(),
        }
    }
}

/// Map a failed authoring call to a response, preferring WordPress's own message.
pub(crate) fn upstream_error(e: &FetchError, fallback: &str) -> Response {
    tracing::warn!(error = %e, "{}", fallback);
    let message = e.upstream_message().unwrap_or(fallback).to_string();
    let status = match e.status() {
        Some(401 | 403) => StatusCode::FORBIDDEN,
        Some(404) => StatusCode::NOT_FOUND,
        Some(400) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    ErrorResponse::respond(status, message)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use epoch_core::MockClient;
    use serde_json::{json, Value};

    pub const ME_URL: &str = "https://api.test/wp-json/wp/v2/users/me?context=edit";
    pub const TOKEN: &str = "author-token";

    /// A mock that already knows the signed-in author.
    pub fn author_mock() -> MockClient {
        MockClient::new().with_json(
            ME_URL,
            json!({"id": 4, "name": "Ada", "slug": "ada", "roles": ["author"]}),
        )
    }

    pub fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}
