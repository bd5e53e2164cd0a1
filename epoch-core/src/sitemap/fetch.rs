//! Paginated WordPress listings for sitemap generation.
//!
//! Pagination stops at the first empty page, the page cap, or the first
//! failed page. A failure on page one is an error; a later failure keeps what
//! was already collected (WordPress answers past-the-end pages with a 400).

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::http::{with_query, HttpClient};
use crate::wordpress::{fetch_list, Category, Rendered};

use super::entry::{parse_lastmod, w3c_datetime};

pub const POSTS_PER_PAGE: u32 = 100;

/// Page cap for the full post listing.
pub const MAX_POST_PAGES: u32 = 200;

/// Page cap for the news listing.
pub const MAX_NEWS_PAGES: u32 = 10;

/// Google News accepts at most this many articles per sitemap.
pub const MAX_NEWS_ARTICLES: usize = 100;

/// Articles older than this are left out of the news sitemap.
pub const NEWS_WINDOW_HOURS: i64 = 48;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SitemapPost {
    pub id: u64,
    pub slug: String,
    pub modified: String,
    pub date: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewsPost {
    pub slug: String,
    pub title: Rendered,
    pub date: String,
}

async fn paginate<T, F>(
    http: &dyn HttpClient,
    max_pages: u32,
    what: &str,
    page_url: F,
) -> Result<Vec<T>, FetchError>
where
    T: serde::de::DeserializeOwned,
    F: Fn(u32) -> String,
{
    let mut items = Vec::new();

    for page in 1..=max_pages {
        let batch: Vec<T> = match fetch_list(http, &page_url(page)).await {
            Ok(batch) => batch,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(page, error = %e, "stopping {} pagination", what);
                break;
            }
        };

        if batch.is_empty() {
            break;
        }
        items.extend(batch);

        if page == max_pages {
            tracing::warn!(max_pages, "reached page limit for {}", what);
        }
    }

    Ok(items)
}

/// Every published post (slug and dates only), most recently modified first.
pub async fn fetch_all_posts(
    http: &dyn HttpClient,
    config: &SiteConfig,
) -> Result<Vec<SitemapPost>, FetchError> {
    let base = format!("{}/posts", config.wp_v2());
    let posts: Vec<SitemapPost> = paginate(http, MAX_POST_PAGES, "sitemap posts", |page| {
        with_query(
            &base,
            &[
                ("_fields", "id,slug,modified,date,status".to_string()),
                ("per_page", POSTS_PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("status", "publish".to_string()),
                ("orderby", "modified".to_string()),
                ("order", "desc".to_string()),
            ],
        )
    })
    .await?;

    let published: Vec<SitemapPost> = posts
        .into_iter()
        .filter(|p| p.status.as_deref().is_none_or(|s| s == "publish"))
        .collect();
    tracing::info!(count = published.len(), "fetched published posts for sitemap");
    Ok(published)
}

/// Posts published in the last 48 hours before `now`, newest first, at most 100.
pub async fn fetch_recent_posts(
    http: &dyn HttpClient,
    config: &SiteConfig,
    now: DateTime<Utc>,
) -> Result<Vec<NewsPost>, FetchError> {
    let cutoff = now - Duration::hours(NEWS_WINDOW_HOURS);
    let base = format!("{}/posts", config.wp_v2());
    let after = w3c_datetime(cutoff);

    let posts: Vec<NewsPost> = paginate(http, MAX_NEWS_PAGES, "news posts", |page| {
        with_query(
            &base,
            &[
                ("after", after.clone()),
                ("_fields", "slug,title,date".to_string()),
                ("per_page", POSTS_PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("status", "publish".to_string()),
                ("orderby", "date".to_string()),
                ("order", "desc".to_string()),
            ],
        )
    })
    .await?;

    Ok(posts
        .into_iter()
        .filter(|p| parse_lastmod(&p.date).is_some_and(|date| date > cutoff))
        .take(MAX_NEWS_ARTICLES)
        .collect())
}

/// Categories that have at least one post.
pub async fn fetch_all_categories(
    http: &dyn HttpClient,
    config: &SiteConfig,
) -> Result<Vec<Category>, FetchError> {
    let url = with_query(
        &format!("{}/categories", config.wp_v2()),
        &[
            ("_fields", "id,slug,name,count,description".to_string()),
            ("per_page", "100".to_string()),
            ("hide_empty", "true".to_string()),
        ],
    );

    let categories: Vec<Category> = fetch_list(http, &url).await?;
    let with_posts: Vec<Category> = categories.into_iter().filter(|c| c.count > 0).collect();
    tracing::info!(count = with_posts.len(), "fetched categories for sitemap");
    Ok(with_posts)
}
