//! Upstream HTTP access.
//!
//! All requests to WordPress go through the `HttpClient` trait so that the
//! pipelines can be driven by `MockClient` in tests.

mod client;

pub use client::{
    FileUpload, HttpClient, MockCall, MockClient, MockResponse, WordPressHttp, WordPressHttpBuilder,
};

/// Append query parameters to a base URL, keeping insertion order.
pub fn with_query(base: &str, params: &[(&str, String)]) -> String {
    match url::Url::parse(base) {
        Ok(mut url) => {
            if !params.is_empty() {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in params {
                    pairs.append_pair(key, value);
                }
            }
            url.to_string()
        }
        Err(_) => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_keeps_order_and_encodes() {
        let url = with_query(
            "https://api.test/wp-json/wp/v2/posts",
            &[
                ("search", "maple syrup".to_string()),
                ("per_page", "10".to_string()),
            ],
        );
        assert_eq!(
            url,
            "https://api.test/wp-json/wp/v2/posts?search=maple+syrup&per_page=10"
        );
    }
}
