//! Yoast SEO plugin payloads and the client that fetches them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::SiteConfig;
use crate::http::{with_query, HttpClient};
use crate::wordpress::RawPost;

use super::rewrite::UrlRewriter;

/// `og_image` arrives either as a bare URL or as a list of image objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OgImageField {
    Single(String),
    List(Vec<OgImage>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OgImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// The subset of `yoast_head_json` the metadata converter reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoastSeo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_type: Option<String>,
    pub og_url: Option<String>,
    #[serde(deserialize_with = "lenient_og_image")]
    pub og_image: Option<OgImageField>,
    pub og_site_name: Option<String>,
    pub og_locale: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub schema: Option<Value>,
}

// An unrecognised og_image shape is dropped instead of failing the payload.
fn lenient_og_image<'de, D>(deserializer: D) -> Result<Option<OgImageField>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl YoastSeo {
    /// Parse a raw Yoast payload after rewriting API-host URLs.
    pub fn from_value(mut value: Value, rewriter: &UrlRewriter) -> Option<YoastSeo> {
        if !value.is_object() {
            return None;
        }
        rewriter.rewrite_value(&mut value);
        match serde_json::from_value(value) {
            Ok(seo) => Some(seo),
            Err(e) => {
                tracing::warn!(error = %e, "malformed Yoast payload");
                None
            }
        }
    }
}

/// Fetches Yoast head data for the homepage, a post, or a category page.
///
/// Every lookup returns `None` on failure so pages fall back to generated
/// metadata.
pub struct YoastClient {
    http: Arc<dyn HttpClient>,
    config: Arc<SiteConfig>,
    rewriter: UrlRewriter,
}

impl YoastClient {
    pub fn new(http: Arc<dyn HttpClient>, config: Arc<SiteConfig>) -> Self {
        let rewriter = UrlRewriter::from_config(&config);
        Self {
            http,
            config,
            rewriter,
        }
    }

    pub fn rewriter(&self) -> &UrlRewriter {
        &self.rewriter
    }

    pub fn head_url(&self, page_url: &str) -> String {
        with_query(
            &format!("{}/yoast/v1/get_head", self.config.api_url),
            &[("url", page_url.to_string())],
        )
    }

    pub fn post_url(&self, slug: &str) -> String {
        with_query(
            &format!("{}/posts", self.config.wp_v2()),
            &[
                ("slug", slug.to_string()),
                ("_fields", "yoast_head_json".to_string()),
                ("status", "publish".to_string()),
            ],
        )
    }

    pub async fn homepage(&self) -> Option<YoastSeo> {
        self.get_head(&self.config.frontend_url).await
    }

    pub async fn category(&self, slug: &str) -> Option<YoastSeo> {
        self.get_head(&self.config.frontend(slug)).await
    }

    pub async fn post(&self, slug: &str) -> Option<YoastSeo> {
        let url = self.post_url(slug);
        let value = match self.http.get_json(&url).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(slug, error = %e, "post Yoast fetch failed");
                return None;
            }
        };

        let head = value
            .as_array()
            .and_then(|posts| posts.first())
            .and_then(|post| post.get("yoast_head_json"))
            .cloned()?;
        YoastSeo::from_value(head, &self.rewriter)
    }

    /// Yoast data already embedded in a fetched post.
    pub fn from_post(&self, post: &RawPost) -> Option<YoastSeo> {
        post.yoast_head_json
            .clone()
            .and_then(|head| YoastSeo::from_value(head, &self.rewriter))
    }

    async fn get_head(&self, page_url: &str) -> Option<YoastSeo> {
        let url = self.head_url(page_url);
        let mut value = match self.http.get_json(&url).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(page_url, error = %e, "Yoast get_head failed");
                return None;
            }
        };

        // get_head wraps the head object in `json`; older versions return it bare
        if let Some(inner) = value.get_mut("json").map(Value::take) {
            if inner.is_object() {
                value = inner;
            }
        }
        YoastSeo::from_value(value, &self.rewriter)
    }
}
