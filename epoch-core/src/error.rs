use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status} for URL: {url}")]
    Status {
        url: String,
        status: u16,
        /// `message` from a WordPress error body, when there was one.
        message: Option<String>,
    },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("No mock response for URL: {0}")]
    NoMockResponse(String),

    /// A failure reported by another caller's request, e.g. a shared refresh.
    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl FetchError {
    /// HTTP status of the upstream response, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Upstream error message, for surfacing plugin errors to users.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            FetchError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("XML serialization failed: {0}")]
    Xml(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Upstream rejected the request: {0}")]
    Rejected(String),

    #[error("Auth request failed: {0}")]
    Fetch(#[from] FetchError),
}
