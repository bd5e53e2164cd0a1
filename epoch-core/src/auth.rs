//! WordPress account operations: JWT login, registration, password reset.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::SiteConfig;
use crate::error::{AuthError, FetchError};
use crate::http::{with_query, HttpClient};

/// Role required for the dashboard.
pub const AUTHOR_ROLE: &str = "author";

const DEFAULT_ROLE: &str = "subscriber";

/// An authenticated WordPress account and the JWT that proves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordPressUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
    pub token: String,
}

impl WordPressUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_author(&self) -> bool {
        self.has_role(AUTHOR_ROLE)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserMe {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    roles: Option<Vec<String>>,
}

pub struct AuthClient {
    http: Arc<dyn HttpClient>,
    config: Arc<SiteConfig>,
}

impl AuthClient {
    pub fn new(http: Arc<dyn HttpClient>, config: Arc<SiteConfig>) -> Self {
        Self { http, config }
    }

    pub fn token_url(&self) -> String {
        format!("{}/jwt-auth/v1/token", self.config.api_url)
    }

    pub fn me_url(&self) -> String {
        with_query(
            &format!("{}/users/me", self.config.wp_v2()),
            &[("context", "edit".to_string())],
        )
    }

    pub fn register_url(&self) -> String {
        format!("{}/custom/v1/register", self.config.api_url)
    }

    pub fn reset_password_url(&self) -> String {
        format!("{}/bdpwr/v1/reset-password/request", self.config.api_url)
    }

    /// Exchange credentials for a JWT, then load the account behind it.
    pub async fn login(&self, username: &str, password: &str) -> Result<WordPressUser, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let body = json!({ "username": username, "password": password });
        let response = match self.http.post_json(&self.token_url(), &body).await {
            Ok(response) => response,
            Err(e) if matches!(e.status(), Some(400 | 401 | 403)) => {
                tracing::info!(username, error = %e, "WordPress login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(username, error = %e, "WordPress login failed");
                return Err(e.into());
            }
        };

        let token = serde_json::from_value::<TokenResponse>(response)
            .ok()
            .and_then(|r| r.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Rejected("login response carried no token".to_string()))?;

        self.current_user(&token).await
    }

    /// The account a token belongs to.
    pub async fn current_user(&self, token: &str) -> Result<WordPressUser, AuthError> {
        let value = match self.http.get_json_authed(&self.me_url(), token).await {
            Ok(value) => value,
            Err(e) if matches!(e.status(), Some(401 | 403)) => {
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch WordPress user");
                return Err(e.into());
            }
        };

        let me: UserMe = serde_json::from_value(value)
            .map_err(|e| AuthError::Fetch(FetchError::InvalidJson(e.to_string())))?;

        Ok(WordPressUser {
            id: me.id,
            username: me.slug,
            email: me.email.unwrap_or_default(),
            display_name: me.name,
            roles: me
                .roles
                .filter(|roles| !roles.is_empty())
                .unwrap_or_else(|| vec![DEFAULT_ROLE.to_string()]),
            token: token.to_string(),
        })
    }

    /// Create an account through the site's registration endpoint.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Value, AuthError> {
        let body = json!({ "username": username, "email": email, "password": password });
        let response = self
            .http
            .post_json(&self.register_url(), &body)
            .await
            .map_err(|e| rejection(e, "Registration failed"))?;

        if response.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(AuthError::Rejected(
                message_of(&response).unwrap_or("Registration failed").to_string(),
            ));
        }
        Ok(response)
    }

    /// Ask WordPress to send a reset email. Returns the upstream message.
    pub async fn reset_password(&self, email: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post_json(&self.reset_password_url(), &json!({ "email": email }))
            .await
            .map_err(|e| rejection(e, "Password reset failed"))?;

        Ok(message_of(&response)
            .unwrap_or("Password reset email sent")
            .to_string())
    }
}

fn message_of(value: &Value) -> Option<&str> {
    value.get("message").and_then(Value::as_str)
}

// Plugin 4xx answers become `Rejected` with their message; anything else is a fetch failure.
fn rejection(e: FetchError, fallback: &str) -> AuthError {
    match e.status() {
        Some(status) if (400..500).contains(&status) => {
            AuthError::Rejected(e.upstream_message().unwrap_or(fallback).to_string())
        }
        _ => AuthError::Fetch(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockClient;

    fn auth(mock: MockClient) -> AuthClient {
        let config = SiteConfig::new("https://api.test/wp-json", "https://www.test").unwrap();
        AuthClient::new(Arc::new(mock), Arc::new(config))
    }

    const TOKEN_URL: &str = "https://api.test/wp-json/jwt-auth/v1/token";
    const ME_URL: &str = "https://api.test/wp-json/wp/v2/users/me?context=edit";

    #[tokio::test]
    async fn test_login_loads_user() {
        let client = auth(
            MockClient::new()
                .with_json(TOKEN_URL, json!({"token": "jwt-123", "user_email": "a@test"}))
                .with_json(
                    ME_URL,
                    json!({"id": 7, "name": "Ada L", "slug": "ada", "email": "a@test", "roles": ["author"]}),
                ),
        );

        let user = client.login("ada", "pw").await.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "ada");
        assert_eq!(user.display_name, "Ada L");
        assert_eq!(user.token, "jwt-123");
        assert!(user.is_author());
    }

    #[tokio::test]
    async fn test_roles_default_to_subscriber() {
        let client = auth(MockClient::new().with_json(ME_URL, json!({"id": 2, "name": "B"})));
        let user = client.current_user("t").await.unwrap();
        assert_eq!(user.roles, vec!["subscriber"]);
        assert!(!user.is_author());
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let client = auth(MockClient::new().with_status(TOKEN_URL, 403));
        assert!(matches!(
            client.login("ada", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            client.login("", "").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_surfaces_upstream_message() {
        let url = "https://api.test/wp-json/custom/v1/register";
        let client = auth(MockClient::new().with_rejection(
            url,
            400,
            json!({"code": "exists", "message": "Username already exists"}),
        ));
        match client.register("ada", "a@test", "pw").await {
            Err(AuthError::Rejected(message)) => assert_eq!(message, "Username already exists"),
            other => panic!("unexpected {:?}", other),
        }

        let client = auth(MockClient::new().with_json(url, json!({"success": false})));
        match client.register("ada", "a@test", "pw").await {
            Err(AuthError::Rejected(message)) => assert_eq!(message, "Registration failed"),
            other => panic!("unexpected {:?}", other),
        }

        let client = auth(MockClient::new().with_json(url, json!({"success": true, "user_id": 9})));
        assert!(client.register("ada", "a@test", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_message() {
        let url = "https://api.test/wp-json/bdpwr/v1/reset-password/request";
        let client = auth(MockClient::new().with_json(url, json!({"message": "Check your inbox"})));
        assert_eq!(client.reset_password("a@test").await.unwrap(), "Check your inbox");
    }
}
