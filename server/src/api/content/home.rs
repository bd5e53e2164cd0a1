use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use epoch_core::HomepageFeed;

#[utoipa::path(
    get,
    path = "/api/home",
    tag = "content",
    responses(
        (status = 200, description = "Every homepage region; failed regions are empty", body = HomepageFeed)
    )
)]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sections.homepage().await)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_json, get};
    use crate::state::testing::state;
    use axum::http::StatusCode;
    use epoch_core::{MockClient, PostQuery, Section};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_homepage_survives_category_outage() {
        let latest = {
            let config = epoch_core::SiteConfig::new(
                crate::state::testing::API_URL,
                crate::state::testing::FRONTEND_URL,
            )
            .unwrap();
            epoch_core::WordPressClient::new(Arc::new(MockClient::new()), Arc::new(config))
                .posts_url(&PostQuery::latest(3))
        };
        // Only the latest-headlines query answers; category lookups all fail.
        let mock = Arc::new(MockClient::new().with_json(
            &latest,
            json!([{"id": 1, "slug": "top", "title": {"rendered": "Top Story"}}]),
        ));
        let response = get(state(mock), "/api/home").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["latestHeadlines"][0]["title"], "Top Story");
        assert_eq!(
            body["sections"].as_array().unwrap().len(),
            Section::ALL.len()
        );
        assert_eq!(body["sections"][0]["section"], "daily-maple");
        assert_eq!(body["sections"][0]["posts"], json!([]));
    }
}
