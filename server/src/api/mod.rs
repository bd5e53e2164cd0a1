pub mod content;
pub mod dashboard;
pub mod feeds;
pub mod public;
pub mod search;
pub mod seo;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn respond(status: StatusCode, error: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorResponse {
                error: error.into(),
            }),
        )
            .into_response()
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(
        info(title = "The Maple Epoch API"),
        components(schemas(
            ErrorResponse,
            epoch_core::TransformedPost,
            epoch_core::PageMetadata,
            epoch_core::seo::OpenGraph,
            epoch_core::seo::TwitterMeta,
            epoch_core::seo::MetaImage,
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        search::ApiDoc::openapi(),
        content::ApiDoc::openapi(),
        seo::ApiDoc::openapi(),
        feeds::ApiDoc::openapi(),
        dashboard::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
pub mod test_support {
    use axum::body::Body;
    use axum::http::{Request, Response};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::AppState;

    pub async fn get(state: AppState, uri: &str) -> Response<Body> {
        send(state, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(state: AppState, uri: &str, body: Value) -> Response<Body> {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(state, request).await
    }

    pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
        crate::app(state).oneshot(request).await.unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let spec = super::openapi();
        for path in [
            "/api/search",
            "/api/sitemap",
            "/sitemap.xml",
            "/robots.txt",
            "/api/home",
            "/api/sections/{slug}",
            "/api/articles/{slug}",
            "/api/seo/post/{slug}",
            "/api/auth/login",
            "/dashboard",
            "/api/posts",
            "/api/posts/{id}",
            "/api/media",
            "/api/media/{id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
