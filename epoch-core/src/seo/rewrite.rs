//! Rewriting of API-domain URLs to the public domain.
//!
//! Yoast builds every URL from the WordPress site address, which is the
//! internal API host. Anything that reaches a public `<meta>` tag must point at
//! the frontend origin instead, with the frontend's own scheme and port.

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::config::SiteConfig;

pub struct UrlRewriter {
    pattern: Regex,
    replacement: String,
}

impl UrlRewriter {
    /// `frontend_origin` is `scheme://host[:port]` with no trailing slash.
    pub fn new(api_host: &str, frontend_origin: &str) -> Self {
        // Host (and any API port) must end at a non-hostname character so
        // look-alike hosts survive.
        let pattern = Regex::new(&format!(
            r"(?:https?:)?//{}(?::\d+)?([^A-Za-z0-9.\-:]|$)",
            regex::escape(api_host)
        ))
        .expect("escaped host is a valid regex");

        Self {
            pattern,
            replacement: frontend_origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        let origin = Url::parse(&config.frontend_url)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_else(|_| config.frontend_url.clone());
        Self::new(&config.api_host, &origin)
    }

    /// Rewrite every API-host URL inside one string.
    pub fn rewrite_url(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &regex::Captures| {
                format!("{}{}", self.replacement, &caps[1])
            })
            .into_owned()
    }

    /// Rewrite every string anywhere in a JSON document, in place.
    pub fn rewrite_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                if self.pattern.is_match(s) {
                    *s = self.rewrite_url(s);
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.rewrite_value(v)),
            Value::Object(map) => map.values_mut().for_each(|v| self.rewrite_value(v)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rewriter() -> UrlRewriter {
        UrlRewriter::new("api.mapleepoch.com", "https://www.mapleepoch.com")
    }

    #[test]
    fn test_rewrites_both_schemes() {
        let r = rewriter();
        assert_eq!(
            r.rewrite_url("http://api.mapleepoch.com/article/x"),
            "https://www.mapleepoch.com/article/x"
        );
        assert_eq!(
            r.rewrite_url("https://api.mapleepoch.com"),
            "https://www.mapleepoch.com"
        );
        assert_eq!(
            r.rewrite_url("see https://api.mapleepoch.com/a and https://api.mapleepoch.com/b"),
            "see https://www.mapleepoch.com/a and https://www.mapleepoch.com/b"
        );
    }

    #[test]
    fn test_leaves_other_hosts_alone() {
        let r = rewriter();
        for untouched in [
            "https://cdn.example.com/img.png",
            "https://api.mapleepoch.com.evil.net/x",
            "no urls here",
        ] {
            assert_eq!(r.rewrite_url(untouched), untouched);
        }
    }

    #[test]
    fn test_keeps_frontend_scheme_and_port() {
        let config =
            SiteConfig::new("http://api.local:8080/wp-json", "http://localhost:3000").unwrap();
        let r = UrlRewriter::from_config(&config);
        assert_eq!(
            r.rewrite_url("http://api.local:8080/article/x/"),
            "http://localhost:3000/article/x/"
        );
        assert_eq!(
            r.rewrite_url("//api.local/wp-content/a.jpg"),
            "http://localhost:3000/wp-content/a.jpg"
        );
    }

    #[test]
    fn test_rewrites_nested_json() {
        let r = rewriter();
        let mut value = json!({
            "canonical": "https://api.mapleepoch.com/article/a/",
            "og_image": [{"url": "https://api.mapleepoch.com/wp-content/a.jpg", "width": 1200}],
            "schema": {"@graph": [{"@id": "https://api.mapleepoch.com/#website"}]},
            "title": "Plain title"
        });
        r.rewrite_value(&mut value);

        assert_eq!(value["canonical"], "https://www.mapleepoch.com/article/a/");
        assert_eq!(
            value["og_image"][0]["url"],
            "https://www.mapleepoch.com/wp-content/a.jpg"
        );
        assert_eq!(value["og_image"][0]["width"], 1200);
        assert_eq!(
            value["schema"]["@graph"][0]["@id"],
            "https://www.mapleepoch.com/#website"
        );
        assert_eq!(value["title"], "Plain title");
    }
}
