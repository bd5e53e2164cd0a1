//! Read access to the WordPress REST API.
//!
//! Listing calls never fail: upstream errors and malformed payloads are
//! logged and turned into empty results so a page always renders.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::http::{with_query, HttpClient};

use super::categories::CategoryIndex;
use super::{Category, PostQuery, RawPost};

pub struct WordPressClient {
    http: Arc<dyn HttpClient>,
    config: Arc<SiteConfig>,
    categories: CategoryIndex,
}

impl WordPressClient {
    pub fn new(http: Arc<dyn HttpClient>, config: Arc<SiteConfig>) -> Self {
        let categories = CategoryIndex::new(config.category_cache_ttl);
        Self {
            http,
            config,
            categories,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn http(&self) -> &Arc<dyn HttpClient> {
        &self.http
    }

    pub fn posts_url(&self, query: &PostQuery) -> String {
        with_query(&format!("{}/posts", self.config.wp_v2()), &query.to_params())
    }

    pub fn post_url(&self, id: u64) -> String {
        with_query(
            &format!("{}/posts/{}", self.config.wp_v2(), id),
            &[
                ("_embed", "true".to_string()),
                ("status", "publish".to_string()),
            ],
        )
    }

    pub fn categories_url(&self) -> String {
        with_query(
            &format!("{}/categories", self.config.wp_v2()),
            &[("per_page", "100".to_string())],
        )
    }

    /// Posts matching `query`, or the error that prevented fetching them.
    pub async fn try_get_posts(&self, query: &PostQuery) -> Result<Vec<RawPost>, FetchError> {
        fetch_list(self.http.as_ref(), &self.posts_url(query)).await
    }

    /// Posts matching `query`; empty on any failure.
    pub async fn get_posts(&self, query: &PostQuery) -> Vec<RawPost> {
        degrade(self.try_get_posts(query).await, "posts")
    }

    pub async fn get_post(&self, id: u64) -> Option<RawPost> {
        let url = self.post_url(id);
        match self.http.get_json(&url).await {
            Ok(value) => parse_or_warn(value, &url),
            Err(e) => {
                tracing::warn!(id, error = %e, "WordPress post fetch failed");
                None
            }
        }
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Option<RawPost> {
        let query = PostQuery {
            slug: Some(slug.to_string()),
            ..PostQuery::default()
        };
        self.get_posts(&query).await.into_iter().next()
    }

    pub async fn try_get_categories(&self) -> Result<Vec<Category>, FetchError> {
        fetch_list(self.http.as_ref(), &self.categories_url()).await
    }

    pub async fn get_categories(&self) -> Vec<Category> {
        degrade(self.try_get_categories().await, "categories")
    }

    /// Resolve a category slug through the memoized index.
    pub async fn category_id(&self, slug: &str) -> Option<u64> {
        let table = match self.categories.table(|| self.try_get_categories()).await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(slug, error = %e, "category lookup failed");
                return None;
            }
        };

        let id = table.get(slug).copied();
        if id.is_none() {
            let mut available: Vec<&str> = table.keys().map(String::as_str).collect();
            available.sort_unstable();
            tracing::warn!(slug, ?available, "category not found");
        }
        id
    }

    /// Newest published posts in a category; empty if the slug is unknown.
    pub async fn get_posts_by_category(&self, slug: &str, limit: u32) -> Vec<RawPost> {
        let Some(id) = self.category_id(slug).await else {
            return Vec::new();
        };

        let query = PostQuery {
            categories: Some(id.to_string()),
            per_page: Some(limit),
            ..PostQuery::default()
        };
        self.get_posts(&query).await
    }

    /// Posts by an author in every status the token may see, for the dashboard.
    pub async fn get_user_posts(&self, author_id: Option<u64>, token: &str) -> Vec<RawPost> {
        let mut params = Vec::new();
        if let Some(author) = author_id {
            params.push(("author", author.to_string()));
        }
        params.push(("_embed", "true".to_string()));
        params.push(("status", "any".to_string()));
        let url = with_query(&format!("{}/posts", self.config.wp_v2()), &params);

        let result = match self.http.get_json_authed(&url, token).await {
            Ok(value) => serde_json::from_value(value)
                .map_err(|e| FetchError::InvalidJson(e.to_string())),
            Err(e) => Err(e),
        };
        degrade(result, "user posts")
    }

    /// Full-text search. Failures are returned so the caller can report them.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawPost>, FetchError> {
        let query = PostQuery {
            search: Some(query.to_string()),
            per_page: Some(per_page),
            page: Some(page),
            ..PostQuery::default()
        };
        self.try_get_posts(&query).await
    }
}

pub(crate) async fn fetch_list<T: DeserializeOwned>(
    http: &dyn HttpClient,
    url: &str,
) -> Result<Vec<T>, FetchError> {
    let value = http.get_json(url).await?;
    serde_json::from_value(value).map_err(|e| FetchError::InvalidJson(e.to_string()))
}

fn degrade<T>(result: Result<Vec<T>, FetchError>, what: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "WordPress {} fetch failed, using empty list", what);
            Vec::new()
        }
    }
}

fn parse_or_warn<T: DeserializeOwned>(value: Value, url: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(url, error = %e, "malformed WordPress payload");
            None
        }
    }
}
