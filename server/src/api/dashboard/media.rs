use super::upstream_error;
use crate::api::ErrorResponse;
use crate::auth::Session;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use epoch_core::{FileUpload, Media};
use utoipa::ToSchema;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/media",
    tag = "dashboard",
    request_body(content_type = "multipart/form-data", content = UploadMediaRequest),
    responses(
        (status = 201, description = "File added to the media library", body = Media),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "WordPress refused the author", body = ErrorResponse),
        (status = 502, description = "WordPress request failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_media(
    Session(user): Session,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return ErrorResponse::respond(StatusCode::BAD_REQUEST, "No file provided");
            }
            Err(e) => {
                tracing::warn!("Multipart read error: {}", e);
                return ErrorResponse::respond(
                    e.status(),
                    format!("Failed to read multipart data: {}", e.body_text()),
                );
            }
        }
    };

    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = match field.bytes().await {
        Ok(bytes) if bytes.is_empty() => {
            return ErrorResponse::respond(StatusCode::BAD_REQUEST, "No file provided");
        }
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!("Field read error: {}", e);
            return ErrorResponse::respond(
                e.status(),
                format!("Failed to read file data: {}", e.body_text()),
            );
        }
    };

    let file = FileUpload {
        filename,
        content_type,
        bytes,
    };
    match state.wordpress.upload_media(&user.token, &file).await {
        Ok(media) => (StatusCode::CREATED, Json(media)).into_response(),
        Err(e) => upstream_error(&e, "Failed to upload media"),
    }
}

#[utoipa::path(
    get,
    path = "/api/media/{id}",
    tag = "dashboard",
    params(
        ("id" = u64, Path, description = "Media library ID")
    ),
    responses(
        (status = 200, description = "The media item", body = Media),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_media(
    Session(user): Session,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.wordpress.fetch_media(&user.token, id).await {
        Some(media) => Json(media).into_response(),
        None => ErrorResponse::respond(StatusCode::NOT_FOUND, "Media not found"),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::dashboard::testing::{author_mock, authed, TOKEN};
    use crate::api::test_support::{body_json, send};
    use crate::state::testing::state;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    const MEDIA_URL: &str = "https://api.test/wp-json/wp/v2/media";
    const BOUNDARY: &str = "epoch-boundary";

    fn multipart(field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: image/jpeg\r\n\r\n",
            b = BOUNDARY
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::post("/api/media")
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_forwards_file_to_media_library() {
        let mock = Arc::new(author_mock().with_json(
            MEDIA_URL,
            json!({"id": 12, "source_url": "https://api.test/wp-content/uploads/cover.jpg"}),
        ));
        let response = send(state(mock.clone()), multipart("file", "cover.jpg", &[0xff, 0xd8, 0xff, 0xe0])).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], 12);
        assert_eq!(body["source_url"], "https://api.test/wp-content/uploads/cover.jpg");

        let call = mock.calls().into_iter().find(|c| c.url == MEDIA_URL).unwrap();
        assert_eq!(call.token.as_deref(), Some(TOKEN));
        assert_eq!(
            call.body,
            Some(json!({"filename": "cover.jpg", "content_type": "image/jpeg", "size": 4}))
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let mock = Arc::new(author_mock());
        let response = send(state(mock.clone()), multipart("photo", "cover.jpg", &[1, 2])).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No file provided");
        assert_eq!(mock.request_count("/media"), 0);
    }

    #[tokio::test]
    async fn test_get_media() {
        let mock = Arc::new(author_mock().with_json(
            "https://api.test/wp-json/wp/v2/media/12",
            json!({"id": 12, "source_url": "https://api.test/wp-content/uploads/cover.jpg"}),
        ));
        let response = send(state(mock.clone()), authed(Method::GET, "/api/media/12", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], 12);

        let response = send(state(mock), authed(Method::GET, "/api/media/13", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
