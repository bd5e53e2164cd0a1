use axum::{extract::State, response::IntoResponse};
use epoch_core::render_robots;

use super::{text, CACHE_NORMAL};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/robots.txt",
    tag = "sitemaps",
    responses(
        (status = 200, description = "Crawler rules", content_type = "text/plain", body = String)
    )
)]
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    text(render_robots(&state.config), CACHE_NORMAL)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_text, get};
    use crate::state::testing::state;
    use axum::http::header;
    use epoch_core::MockClient;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_robots_is_plain_text() {
        let response = get(state(Arc::new(MockClient::new())), "/robots.txt").await;

        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let body = body_text(response).await;
        assert!(body.contains("Disallow: /wp-admin/"));
        assert!(body.contains("Sitemap: https://www.test/sitemap-news.xml"));
    }
}
