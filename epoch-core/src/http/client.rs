//! HTTP client trait and implementations.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::FetchError;

/// Trait for HTTP clients, enabling mockability in tests.
///
/// Every call is a single attempt; callers decide how to degrade on failure.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET a URL and parse the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;

    /// GET a URL with a bearer token and parse the body as JSON.
    async fn get_json_authed(&self, url: &str, token: &str) -> Result<Value, FetchError>;

    /// POST a JSON body and parse the response as JSON.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, FetchError>;

    /// POST a JSON body with a bearer token.
    async fn post_json_authed(&self, url: &str, token: &str, body: &Value)
        -> Result<Value, FetchError>;

    /// PUT a JSON body with a bearer token.
    async fn put_json_authed(&self, url: &str, token: &str, body: &Value)
        -> Result<Value, FetchError>;

    /// DELETE with a bearer token. WordPress answers with the affected object.
    async fn delete_authed(&self, url: &str, token: &str) -> Result<Value, FetchError>;

    /// POST a raw file body with a bearer token, as `wp/v2/media` expects.
    async fn upload_authed(
        &self,
        url: &str,
        token: &str,
        file: &FileUpload,
    ) -> Result<Value, FetchError>;
}

/// A file to send to the media library.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// `Content-Disposition` value naming the file.
    pub fn disposition(&self) -> String {
        // Quotes and line breaks would end the header value early.
        let name: String = self
            .filename
            .chars()
            .filter(|c| !matches!(*c, '"' | '\\' | '\r' | '\n'))
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }
}

/// Configuration for WordPressHttp.
#[derive(Clone)]
pub struct WordPressHttpBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for WordPressHttpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WordPressHttpBuilder {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (compatible; MapleEpoch/1.0; +https://www.mapleepoch.com)"
                .to_string(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn build(self) -> Result<WordPressHttp, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(WordPressHttp {
            inner: Arc::new(inner),
        })
    }
}

/// Production client. Never caches: every request carries no-cache headers.
pub struct WordPressHttp {
    /// Shared reqwest client for connection pooling.
    inner: Arc<reqwest::Client>,
}

impl WordPressHttp {
    pub fn new() -> Result<Self, reqwest::Error> {
        WordPressHttpBuilder::new().build()
    }

    pub fn builder() -> WordPressHttpBuilder {
        WordPressHttpBuilder::new()
    }

    fn no_cache(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .header("Expires", "0")
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Value, FetchError> {
        tracing::debug!(url, "network: fetching");
        let response = Self::no_cache(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = %status, "network: request failed");
            // WordPress errors carry `{"code": .., "message": ..}`
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("message")?.as_str().map(str::to_string));
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }

    fn parse(url: &str) -> Result<reqwest::Url, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl HttpClient for WordPressHttp {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        let request = self.inner.get(parsed).header("Content-Type", "application/json");
        self.send(url, request).await
    }

    async fn get_json_authed(&self, url: &str, token: &str) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        let request = self
            .inner
            .get(parsed)
            .header("Content-Type", "application/json")
            .bearer_auth(token);
        self.send(url, request).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        self.send(url, self.inner.post(parsed).json(body)).await
    }

    async fn post_json_authed(
        &self,
        url: &str,
        token: &str,
        body: &Value,
    ) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        self.send(url, self.inner.post(parsed).bearer_auth(token).json(body))
            .await
    }

    async fn put_json_authed(
        &self,
        url: &str,
        token: &str,
        body: &Value,
    ) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        self.send(url, self.inner.put(parsed).bearer_auth(token).json(body))
            .await
    }

    async fn delete_authed(&self, url: &str, token: &str) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        self.send(url, self.inner.delete(parsed).bearer_auth(token))
            .await
    }

    async fn upload_authed(
        &self,
        url: &str,
        token: &str,
        file: &FileUpload,
    ) -> Result<Value, FetchError> {
        let parsed = Self::parse(url)?;
        let request = self
            .inner
            .post(parsed)
            .bearer_auth(token)
            .header("Content-Type", file.content_type.as_str())
            .header("Content-Disposition", file.disposition())
            .body(file.bytes.clone());
        self.send(url, request).await
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Json(Value),
    Status(u16),
    /// Non-2xx status with a WordPress error body.
    Rejected(u16, Value),
    Error(String),
}

/// One request seen by `MockClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: &'static str,
    pub url: String,
    pub token: Option<String>,
    /// JSON body, or for uploads `{"filename", "content_type", "size"}`.
    pub body: Option<Value>,
}

/// Mock HTTP client for testing. Records every request it is asked for.
///
/// Responses are keyed by URL, or by `"METHOD url"` when one URL must answer
/// differently per method.
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a response for a URL.
    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Add a response for one method on a URL, e.g. `("DELETE", url)`.
    pub fn with_method_response(self, method: &str, url: &str, response: MockResponse) -> Self {
        self.with_response(&format!("{} {}", method, url), response)
    }

    /// Add a JSON response for a URL.
    pub fn with_json(self, url: &str, json: Value) -> Self {
        self.with_response(url, MockResponse::Json(json))
    }

    /// Add a non-2xx status for a URL.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(url, MockResponse::Status(status))
    }

    /// Add a non-2xx status with a JSON error body for a URL.
    pub fn with_rejection(self, url: &str, status: u16, body: Value) -> Self {
        self.with_response(url, MockResponse::Rejected(status, body))
    }

    /// Add a transport error for a URL.
    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    /// Every request so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of requests whose URL contains `needle`.
    pub fn request_count(&self, needle: &str) -> usize {
        self.requests().iter().filter(|u| u.contains(needle)).count()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                method,
                url: url.to_string(),
                token: token.map(str::to_string),
                body,
            });
        }

        let response = self
            .responses
            .get(&format!("{} {}", method, url))
            .or_else(|| self.responses.get(url));
        match response {
            Some(MockResponse::Json(json)) => Ok(json.clone()),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
                message: None,
            }),
            Some(MockResponse::Rejected(status, body)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
                message: body.get("message").and_then(Value::as_str).map(str::to_string),
            }),
            Some(MockResponse::Error(e)) => Err(FetchError::InvalidUrl(e.clone())),
            None => Err(FetchError::NoMockResponse(url.to_string())),
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.respond("GET", url, None, None)
    }

    async fn get_json_authed(&self, url: &str, token: &str) -> Result<Value, FetchError> {
        self.respond("GET", url, Some(token), None)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, FetchError> {
        self.respond("POST", url, None, Some(body.clone()))
    }

    async fn post_json_authed(
        &self,
        url: &str,
        token: &str,
        body: &Value,
    ) -> Result<Value, FetchError> {
        self.respond("POST", url, Some(token), Some(body.clone()))
    }

    async fn put_json_authed(
        &self,
        url: &str,
        token: &str,
        body: &Value,
    ) -> Result<Value, FetchError> {
        self.respond("PUT", url, Some(token), Some(body.clone()))
    }

    async fn delete_authed(&self, url: &str, token: &str) -> Result<Value, FetchError> {
        self.respond("DELETE", url, Some(token), None)
    }

    async fn upload_authed(
        &self,
        url: &str,
        token: &str,
        file: &FileUpload,
    ) -> Result<Value, FetchError> {
        let summary = serde_json::json!({
            "filename": file.filename,
            "content_type": file.content_type,
            "size": file.bytes.len(),
        });
        self.respond("POST", url, Some(token), Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_client_records_requests() {
        let client = MockClient::new().with_json("https://a.test/x", json!([1, 2]));

        let value = client.get_json("https://a.test/x").await.unwrap();
        assert_eq!(value, json!([1, 2]));

        assert!(client.get_json("https://a.test/missing").await.is_err());
        assert_eq!(
            client.requests(),
            vec!["https://a.test/x", "https://a.test/missing"]
        );
        assert_eq!(client.request_count("/x"), 1);
    }

    #[tokio::test]
    async fn test_mock_method_responses_win_over_url() {
        let client = MockClient::new()
            .with_json("https://a.test/posts/5", json!({"id": 5}))
            .with_method_response("DELETE", "https://a.test/posts/5", MockResponse::Status(403));

        assert!(client.get_json_authed("https://a.test/posts/5", "t").await.is_ok());
        let err = client.delete_authed("https://a.test/posts/5", "t").await.unwrap_err();
        assert_eq!(err.status(), Some(403));

        let calls = client.calls();
        assert_eq!(calls[1].method, "DELETE");
        assert_eq!(calls[1].token.as_deref(), Some("t"));
    }

    #[test]
    fn test_upload_disposition_strips_quotes() {
        let file = FileUpload {
            filename: "cover \"final\".jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(file.disposition(), "attachment; filename=\"cover final.jpg\"");
    }

    #[tokio::test]
    async fn test_mock_status_carries_code() {
        let client = MockClient::new().with_status("https://a.test/x", 503);
        let err = client.get_json("https://a.test/x").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_network() {
        let client = WordPressHttp::new().unwrap();
        let err = client.get_json("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
