use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use epoch_core::{MetadataBuilder, PageMetadata, TransformedPost};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleResponse {
    /// Absent when WordPress has no published post with this slug.
    pub post: Option<TransformedPost>,
    pub metadata: PageMetadata,
}

#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    tag = "content",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "The article and its page metadata", body = ArticleResponse),
        (status = 404, description = "No such article; metadata is the not-found fallback", body = ArticleResponse)
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let builder = MetadataBuilder::new(&state.config);

    let Some(raw) = state.wordpress.get_post_by_slug(&slug).await else {
        let title = format!("Article Not Found - {}", state.config.site_name);
        let metadata = builder.fallback_metadata(
            Some(&title),
            Some("The requested article could not be found."),
            Some(&slug),
        );
        return (
            StatusCode::NOT_FOUND,
            Json(ArticleResponse {
                post: None,
                metadata,
            }),
        )
            .into_response();
    };

    let post = state.transformer().transform(&raw);
    let metadata = match state.yoast.from_post(&raw) {
        Some(yoast) => builder.to_page_metadata(Some(&yoast), Some(&post.title), Some(&post.excerpt)),
        None => builder.fallback_metadata(Some(&post.title), Some(&post.excerpt), Some(&slug)),
    };

    (
        StatusCode::OK,
        Json(ArticleResponse {
            post: Some(post),
            metadata,
        }),
    )
        .into_response()
}
