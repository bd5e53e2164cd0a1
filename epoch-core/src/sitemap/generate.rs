//! Sitemap generators.
//!
//! Every generator returns XML. Upstream failures are logged and answered
//! with a smaller sitemap marked `degraded`, never with an error.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::SiteConfig;
use crate::http::HttpClient;
use crate::transform::{decode_entities, strip_html};

use super::entry::{parse_lastmod, w3c_datetime, ChangeFrequency, IndexEntry, NewsEntry, SitemapEntry};
use super::fetch::{fetch_all_categories, fetch_all_posts, fetch_recent_posts};
use super::utils::{deduplicate_sitemap_entries, log_sitemap_stats, normalize_sitemap_url};
use super::xml::{
    empty_news_urlset, minimal_urlset, write_news_urlset, write_sitemap_index, write_urlset,
};

/// Static routes: (path, change frequency, priority).
const STATIC_ROUTES: &[(&str, ChangeFrequency, f64)] = &[
    ("/", ChangeFrequency::Hourly, 1.0),
    ("/world", ChangeFrequency::Daily, 0.9),
    ("/politics", ChangeFrequency::Daily, 0.9),
    ("/business", ChangeFrequency::Daily, 0.9),
    ("/technology", ChangeFrequency::Daily, 0.9),
    ("/health", ChangeFrequency::Daily, 0.9),
    ("/sports", ChangeFrequency::Daily, 0.9),
    ("/entertainment", ChangeFrequency::Daily, 0.9),
    ("/lifestyle", ChangeFrequency::Daily, 0.9),
    ("/world/africa", ChangeFrequency::Daily, 0.9),
    ("/world/americas", ChangeFrequency::Daily, 0.9),
    ("/world/australia", ChangeFrequency::Daily, 0.9),
    ("/world/asia", ChangeFrequency::Daily, 0.9),
    ("/world/europe", ChangeFrequency::Daily, 0.9),
    ("/world/uk", ChangeFrequency::Daily, 0.9),
    ("/world/canada", ChangeFrequency::Daily, 0.9),
    ("/daily-maple", ChangeFrequency::Daily, 0.9),
    ("/maple-travel", ChangeFrequency::Daily, 0.9),
    ("/through-the-lens", ChangeFrequency::Daily, 0.9),
    ("/featured-articles", ChangeFrequency::Daily, 0.9),
    ("/maple-voices", ChangeFrequency::Daily, 0.9),
    ("/explore-canada", ChangeFrequency::Daily, 0.9),
    ("/resources", ChangeFrequency::Daily, 0.9),
    ("/events", ChangeFrequency::Daily, 0.9),
    ("/booknook", ChangeFrequency::Daily, 0.9),
    ("/the-friday-post", ChangeFrequency::Daily, 0.9),
    ("/editors-picks", ChangeFrequency::Daily, 0.9),
    ("/you-may-have-missed", ChangeFrequency::Daily, 0.9),
    ("/about", ChangeFrequency::Monthly, 0.7),
    ("/search", ChangeFrequency::Weekly, 0.7),
    ("/write-for-us", ChangeFrequency::Monthly, 0.7),
    ("/shop-a-tale", ChangeFrequency::Weekly, 0.7),
];

/// Category slugs already listed as static routes.
const STATIC_CATEGORY_SLUGS: &[&str] = &[
    "politics",
    "business",
    "technology",
    "health",
    "sports",
    "entertainment",
    "lifestyle",
    "world",
    "africa",
    "americas",
    "australia",
    "asia",
    "europe",
    "uk",
    "canada",
];

/// Sitemaps listed in the index, relative to the public origin.
pub const SITEMAP_FILES: &[&str] = &["/sitemap.xml", "/sitemap-news.xml", "/sitemap-categories.xml"];

/// Variants served by `/api/sitemap?type=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SitemapKind {
    Posts,
    Categories,
    Static,
    #[default]
    Full,
}

impl FromStr for SitemapKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(SitemapKind::Posts),
            "categories" => Ok(SitemapKind::Categories),
            "static" => Ok(SitemapKind::Static),
            "full" => Ok(SitemapKind::Full),
            other => Err(format!("unknown sitemap type: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedSitemap {
    pub xml: String,
    /// Entries behind a plain `urlset`; empty for news and index sitemaps.
    pub entries: Vec<SitemapEntry>,
    /// True when an upstream failure shrank the output.
    pub degraded: bool,
}

pub struct SitemapGenerator {
    http: Arc<dyn HttpClient>,
    config: Arc<SiteConfig>,
}

impl SitemapGenerator {
    pub fn new(http: Arc<dyn HttpClient>, config: Arc<SiteConfig>) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub async fn generate(&self, kind: SitemapKind) -> GeneratedSitemap {
        match kind {
            SitemapKind::Posts => self.posts().await,
            SitemapKind::Categories => self.categories().await,
            SitemapKind::Static => self.static_pages(),
            SitemapKind::Full => self.full().await,
        }
    }

    pub fn static_entries(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let lastmod = w3c_datetime(now);
        STATIC_ROUTES
            .iter()
            .map(|(path, freq, priority)| {
                SitemapEntry::new(self.config.frontend(path), lastmod.clone(), *freq, *priority)
            })
            .collect()
    }

    pub fn static_pages(&self) -> GeneratedSitemap {
        self.urlset(self.static_entries(Utc::now()), false)
    }

    /// Static routes, dynamic categories and every published post.
    pub async fn full(&self) -> GeneratedSitemap {
        let now = Utc::now();
        let static_entries = self.static_entries(now);
        let lastmod = w3c_datetime(now);

        let (posts, categories) = tokio::join!(
            fetch_all_posts(self.http.as_ref(), &self.config),
            fetch_all_categories(self.http.as_ref(), &self.config),
        );

        let mut degraded = false;
        let category_entries: Vec<SitemapEntry> = match categories {
            Ok(categories) => categories
                .into_iter()
                .filter(|c| !c.slug.is_empty() && !STATIC_CATEGORY_SLUGS.contains(&c.slug.as_str()))
                .map(|c| {
                    SitemapEntry::new(
                        self.config.frontend(&c.slug),
                        lastmod.clone(),
                        ChangeFrequency::Daily,
                        0.9,
                    )
                })
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "category fetch failed, sitemap omits dynamic categories");
                degraded = true;
                Vec::new()
            }
        };
        let post_entries: Vec<SitemapEntry> = match posts {
            Ok(posts) => posts
                .into_iter()
                .filter(|p| !p.slug.is_empty() && !p.modified.is_empty())
                .map(|p| {
                    SitemapEntry::new(
                        self.config.frontend(&format!("/article/{}", p.slug)),
                        p.modified,
                        ChangeFrequency::Daily,
                        0.8,
                    )
                })
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "post fetch failed, sitemap omits articles");
                degraded = true;
                Vec::new()
            }
        };

        let (static_count, category_count, post_count) =
            (static_entries.len(), category_entries.len(), post_entries.len());
        let all = static_entries
            .into_iter()
            .chain(category_entries)
            .chain(post_entries)
            .collect();

        let mut entries = deduplicate_sitemap_entries(all, &self.config.frontend_url);
        entries.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.url.cmp(&b.url))
        });

        tracing::info!(
            static_pages = static_count,
            categories = category_count,
            posts = post_count,
            total = entries.len(),
            "generated full sitemap"
        );
        log_sitemap_stats(&entries);

        self.urlset(entries, degraded)
    }

    pub async fn posts(&self) -> GeneratedSitemap {
        match fetch_all_posts(self.http.as_ref(), &self.config).await {
            Ok(posts) => {
                let entries = posts
                    .into_iter()
                    .filter(|p| !p.slug.is_empty())
                    .map(|p| {
                        SitemapEntry::new(
                            self.config.frontend(&format!("/article/{}", p.slug)),
                            p.modified,
                            ChangeFrequency::Daily,
                            0.8,
                        )
                    })
                    .collect();
                let entries = deduplicate_sitemap_entries(entries, &self.config.frontend_url);
                tracing::info!(total = entries.len(), "generated posts sitemap");
                self.urlset(entries, false)
            }
            Err(e) => {
                tracing::error!(error = %e, "posts sitemap failed, serving homepage only");
                self.homepage_only()
            }
        }
    }

    pub async fn categories(&self) -> GeneratedSitemap {
        match fetch_all_categories(self.http.as_ref(), &self.config).await {
            Ok(categories) => {
                let lastmod = w3c_datetime(Utc::now());
                let entries = categories
                    .into_iter()
                    .filter(|c| !c.slug.is_empty())
                    .map(|c| {
                        SitemapEntry::new(
                            self.config.frontend(&c.slug),
                            lastmod.clone(),
                            ChangeFrequency::Daily,
                            0.9,
                        )
                    })
                    .collect();
                let entries = deduplicate_sitemap_entries(entries, &self.config.frontend_url);
                tracing::info!(total = entries.len(), "generated categories sitemap");
                self.urlset(entries, false)
            }
            Err(e) => {
                tracing::error!(error = %e, "categories sitemap failed, serving homepage only");
                self.homepage_only()
            }
        }
    }

    pub async fn news(&self) -> GeneratedSitemap {
        self.news_at(Utc::now()).await
    }

    /// Google News sitemap of articles from the 48 hours before `now`.
    pub async fn news_at(&self, now: DateTime<Utc>) -> GeneratedSitemap {
        let posts = match fetch_recent_posts(self.http.as_ref(), &self.config, now).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!(error = %e, "news sitemap failed, serving empty sitemap");
                return self.empty_news();
            }
        };

        let articles: Vec<NewsEntry> = posts
            .into_iter()
            .filter_map(|p| {
                Some(NewsEntry {
                    url: self.config.frontend(&format!("/article/{}", p.slug)),
                    title: decode_entities(strip_html(&p.title.rendered).trim()),
                    publication_date: parse_lastmod(&p.date)?,
                })
            })
            .collect();

        match write_news_urlset(&articles, &self.config.site_name, &self.config.site_language) {
            Ok(xml) => {
                tracing::info!(count = articles.len(), "generated news sitemap");
                GeneratedSitemap {
                    xml,
                    entries: Vec::new(),
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "news sitemap serialization failed");
                self.empty_news()
            }
        }
    }

    pub fn index(&self) -> GeneratedSitemap {
        let lastmod = w3c_datetime(Utc::now());
        let entries: Vec<IndexEntry> = SITEMAP_FILES
            .iter()
            .map(|path| IndexEntry {
                url: self.config.frontend(path),
                last_modified: lastmod.clone(),
            })
            .collect();

        match write_sitemap_index(&entries) {
            Ok(xml) => GeneratedSitemap {
                xml,
                entries: Vec::new(),
                degraded: false,
            },
            Err(e) => {
                tracing::error!(error = %e, "sitemap index serialization failed");
                self.homepage_only()
            }
        }
    }

    fn urlset(&self, entries: Vec<SitemapEntry>, degraded: bool) -> GeneratedSitemap {
        match write_urlset(&entries) {
            Ok(xml) => GeneratedSitemap {
                xml,
                entries,
                degraded,
            },
            Err(e) => {
                tracing::error!(error = %e, "sitemap serialization failed");
                self.homepage_only()
            }
        }
    }

    fn homepage_only(&self) -> GeneratedSitemap {
        let lastmod = w3c_datetime(Utc::now());
        // Same form `full()` emits after normalization.
        let homepage = normalize_sitemap_url(&self.config.frontend("/"));
        GeneratedSitemap {
            xml: minimal_urlset(&homepage, &lastmod),
            entries: vec![SitemapEntry::new(homepage, lastmod, ChangeFrequency::Hourly, 1.0)],
            degraded: true,
        }
    }

    fn empty_news(&self) -> GeneratedSitemap {
        GeneratedSitemap {
            xml: empty_news_urlset(),
            entries: Vec::new(),
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockClient;

    fn generator(mock: MockClient) -> SitemapGenerator {
        let config = SiteConfig::new("https://api.test/wp-json", "https://www.test").unwrap();
        SitemapGenerator::new(Arc::new(mock), Arc::new(config))
    }

    #[tokio::test]
    async fn test_full_falls_back_to_static_pages() {
        let sitemap = generator(MockClient::new()).full().await;

        assert!(sitemap.degraded);
        assert_eq!(sitemap.entries.len(), STATIC_ROUTES.len());
        assert_eq!(sitemap.entries[0].url, "https://www.test/");
        assert!(sitemap.xml.contains("<loc>https://www.test/</loc>"));
    }

    #[tokio::test]
    async fn test_posts_and_categories_fall_back_to_homepage() {
        let gen = generator(MockClient::new());
        for sitemap in [gen.posts().await, gen.categories().await] {
            assert!(sitemap.degraded);
            assert_eq!(sitemap.entries.len(), 1);
            assert_eq!(sitemap.entries[0].url, "https://www.test/");
            assert!(sitemap.xml.contains("<loc>https://www.test/</loc>"));
            assert!(sitemap.xml.contains("<priority>1.0</priority>"));
        }
    }

    #[tokio::test]
    async fn test_news_falls_back_to_empty_urlset() {
        let sitemap = generator(MockClient::new()).news().await;
        assert!(sitemap.degraded);
        assert!(sitemap.xml.contains("xmlns:news="));
        assert!(!sitemap.xml.contains("<url>"));
    }

    #[test]
    fn test_static_sitemap_and_index() {
        let gen = generator(MockClient::new());

        let sitemap = gen.static_pages();
        assert!(!sitemap.degraded);
        assert!(sitemap.xml.contains("<loc>https://www.test/shop-a-tale</loc>"));

        let index = gen.index();
        for file in SITEMAP_FILES {
            assert!(index.xml.contains(&format!("<loc>https://www.test{}</loc>", file)));
        }
    }

    #[test]
    fn test_sitemap_kind_parsing() {
        assert_eq!("posts".parse::<SitemapKind>(), Ok(SitemapKind::Posts));
        assert_eq!(SitemapKind::default(), SitemapKind::Full);
        assert!("bogus".parse::<SitemapKind>().is_err());
    }
}
