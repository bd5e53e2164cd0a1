//! Site sections: one category slug each, one fetch-transform path for all.

use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use utoipa::ToSchema;

use crate::config::PicksSource;
use crate::transform::{PostTransformer, TransformedPost};
use crate::wordpress::{PostQuery, WordPressClient};

/// Sections always fetch at least this many posts so pages can fill their grids.
pub const MIN_SECTION_FETCH: u32 = 20;

/// Every section of the site and the WordPress category behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    DailyMaple,
    MapleTravel,
    ThroughTheLens,
    FeaturedArticles,
    MapleVoices,
    ExploreCanada,
    Resources,
    Events,
    Continent,
    Canada,
    YouMayHaveMissed,
    Africa,
    Americas,
    Australia,
    Asia,
    Europe,
    Uk,
    BookNook,
    TheFridayPost,
    Lifestyle,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::DailyMaple,
        Section::MapleTravel,
        Section::ThroughTheLens,
        Section::FeaturedArticles,
        Section::MapleVoices,
        Section::ExploreCanada,
        Section::Resources,
        Section::Events,
        Section::Continent,
        Section::Canada,
        Section::YouMayHaveMissed,
        Section::Africa,
        Section::Americas,
        Section::Australia,
        Section::Asia,
        Section::Europe,
        Section::Uk,
        Section::BookNook,
        Section::TheFridayPost,
        Section::Lifestyle,
    ];

    /// WordPress category slug.
    pub fn slug(&self) -> &'static str {
        match self {
            Section::DailyMaple => "daily-maple",
            Section::MapleTravel => "maple-travel",
            Section::ThroughTheLens => "through-the-lens",
            Section::FeaturedArticles => "featured-articles",
            Section::MapleVoices => "maple-voices",
            Section::ExploreCanada => "explore-canada",
            Section::Resources => "resources",
            Section::Events => "events",
            Section::Continent => "continent",
            Section::Canada => "canada",
            Section::YouMayHaveMissed => "you-may-have-missed",
            Section::Africa => "africa",
            Section::Americas => "americas",
            Section::Australia => "australia",
            Section::Asia => "asia",
            Section::Europe => "europe",
            Section::Uk => "uk",
            Section::BookNook => "booknook",
            Section::TheFridayPost => "the-friday-post",
            Section::Lifestyle => "lifestyle",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::DailyMaple => "Daily Maple",
            Section::MapleTravel => "Maple Travel",
            Section::ThroughTheLens => "Through the Lens",
            Section::FeaturedArticles => "Featured Articles",
            Section::MapleVoices => "Maple Voices",
            Section::ExploreCanada => "Explore Canada",
            Section::Resources => "Resources",
            Section::Events => "Events",
            Section::Continent => "Continent",
            Section::Canada => "Canada",
            Section::YouMayHaveMissed => "You May Have Missed",
            Section::Africa => "Africa",
            Section::Americas => "Americas",
            Section::Australia => "Australia",
            Section::Asia => "Asia",
            Section::Europe => "Europe",
            Section::Uk => "UK",
            Section::BookNook => "BookNook",
            Section::TheFridayPost => "The Friday Post",
            Section::Lifestyle => "Lifestyle",
        }
    }

    /// How many posts the homepage shows for this section.
    pub fn default_limit(&self) -> u32 {
        if self.is_world_region() {
            1
        } else {
            3
        }
    }

    /// Regions rendered under `/world/{slug}`.
    pub fn is_world_region(&self) -> bool {
        matches!(
            self,
            Section::Africa
                | Section::Americas
                | Section::Australia
                | Section::Asia
                | Section::Europe
                | Section::Uk
                | Section::Canada
        )
    }

    pub fn from_slug(slug: &str) -> Option<Section> {
        Section::ALL.iter().copied().find(|s| s.slug() == slug)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SectionFeed {
    pub section: Section,
    pub title: String,
    pub posts: Vec<TransformedPost>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomepageFeed {
    pub latest_headlines: Vec<TransformedPost>,
    pub editors_picks: Vec<TransformedPost>,
    pub sections: Vec<SectionFeed>,
}

/// Fetch-transform service behind every listing page.
pub struct Sections {
    wp: Arc<WordPressClient>,
    transformer: PostTransformer,
}

impl Sections {
    pub fn new(wp: Arc<WordPressClient>, transformer: PostTransformer) -> Self {
        Self { wp, transformer }
    }

    pub fn wordpress(&self) -> &Arc<WordPressClient> {
        &self.wp
    }

    pub fn transformer(&self) -> PostTransformer {
        self.transformer
    }

    /// Posts for any category slug, newest first. Unknown slugs yield no posts.
    pub async fn get_section(&self, slug: &str, limit: u32) -> Vec<TransformedPost> {
        let posts = self
            .wp
            .get_posts_by_category(slug, limit.max(MIN_SECTION_FETCH))
            .await;
        self.transformer.transform_all(&posts)
    }

    pub async fn section(&self, section: Section, limit: u32) -> Vec<TransformedPost> {
        self.get_section(section.slug(), limit).await
    }

    pub async fn latest_headlines(&self, limit: u32) -> Vec<TransformedPost> {
        let posts = self.wp.get_posts(&PostQuery::latest(limit)).await;
        self.transformer.transform_all(&posts)
    }

    /// Walk the configured fallback chain; the first strategy with posts wins.
    /// Every returned post is marked featured.
    pub async fn editors_picks(&self, limit: u32) -> Vec<TransformedPost> {
        let fetch = limit.max(MIN_SECTION_FETCH);

        for source in &self.wp.config().editors_picks_chain {
            let posts = match source {
                PicksSource::Category(slug) => self.wp.get_posts_by_category(slug, fetch).await,
                PicksSource::Sticky => {
                    let query = PostQuery {
                        sticky: true,
                        ..PostQuery::latest(fetch)
                    };
                    self.wp.get_posts(&query).await
                }
                PicksSource::Recent => self.wp.get_posts(&PostQuery::latest(fetch)).await,
            };

            if !posts.is_empty() {
                tracing::debug!(?source, count = posts.len(), "editor's picks source selected");
                return self
                    .transformer
                    .transform_all(&posts)
                    .into_iter()
                    .map(|mut p| {
                        p.featured = true;
                        p
                    })
                    .collect();
            }
        }

        Vec::new()
    }

    /// Every homepage region, fetched concurrently. A failed or panicked
    /// branch becomes an empty section instead of failing the page.
    pub async fn homepage(self: &Arc<Self>) -> HomepageFeed {
        let mut tasks = JoinSet::new();
        for &section in Section::ALL {
            let this = Arc::clone(self);
            tasks.spawn(async move {
                let posts = this.section(section, section.default_limit()).await;
                (section, posts)
            });
        }

        let this = Arc::clone(self);
        let headlines = tokio::spawn(async move { this.latest_headlines(3).await });
        let this = Arc::clone(self);
        let picks = tokio::spawn(async move { this.editors_picks(3).await });

        let mut fetched = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(pair) => fetched.push(pair),
                Err(e) => tracing::error!(error = %e, "homepage section task failed"),
            }
        }

        let sections = Section::ALL
            .iter()
            .map(|&section| SectionFeed {
                section,
                title: section.title().to_string(),
                posts: fetched
                    .iter()
                    .find(|(s, _)| *s == section)
                    .map(|(_, posts)| posts.clone())
                    .unwrap_or_default(),
            })
            .collect();

        HomepageFeed {
            latest_headlines: headlines.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "latest headlines task failed");
                Vec::new()
            }),
            editors_picks: picks.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "editor's picks task failed");
                Vec::new()
            }),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::http::MockClient;
    use serde_json::json;

    const CATEGORIES_URL: &str = "https://api.test/wp-json/wp/v2/categories?per_page=100";

    fn config() -> Arc<SiteConfig> {
        Arc::new(SiteConfig::new("https://api.test/wp-json", "https://www.test").unwrap())
    }

    fn posts_url(query: &PostQuery) -> String {
        WordPressClient::new(Arc::new(MockClient::new()), config()).posts_url(query)
    }

    fn category_query(id: u64) -> PostQuery {
        PostQuery {
            categories: Some(id.to_string()),
            per_page: Some(MIN_SECTION_FETCH),
            ..PostQuery::default()
        }
    }

    fn sections(mock: MockClient) -> (Arc<Sections>, Arc<MockClient>) {
        let mock = Arc::new(mock);
        let wp = Arc::new(WordPressClient::new(mock.clone(), config()));
        (
            Arc::new(Sections::new(wp, PostTransformer::seeded())),
            mock,
        )
    }

    #[test]
    fn test_slug_table_round_trips() {
        for section in Section::ALL {
            assert_eq!(Section::from_slug(section.slug()), Some(*section));
        }
        assert_eq!(Section::from_slug("nope"), None);
        assert_eq!(Section::Uk.default_limit(), 1);
        assert_eq!(Section::BookNook.default_limit(), 3);
    }

    #[tokio::test]
    async fn test_get_section_fetches_at_least_minimum() {
        let (sections, mock) = sections(
            MockClient::new()
                .with_json(CATEGORIES_URL, json!([{"id": 8, "slug": "booknook"}]))
                .with_json(
                    &posts_url(&category_query(8)),
                    json!([{"id": 1, "title": {"rendered": "A"}}]),
                ),
        );

        let posts = sections.section(Section::BookNook, 3).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "A");
        assert!(mock.requests()[1].contains("per_page=20"));
    }

    #[tokio::test]
    async fn test_editors_picks_falls_through_chain() {
        let sticky = PostQuery {
            sticky: true,
            ..PostQuery::latest(MIN_SECTION_FETCH)
        };
        let (sections, mock) = sections(
            MockClient::new()
                .with_json(CATEGORIES_URL, json!([{"id": 1, "slug": "world"}]))
                .with_json(&posts_url(&sticky), json!([]))
                .with_json(
                    &posts_url(&PostQuery::latest(MIN_SECTION_FETCH)),
                    json!([{"id": 5}, {"id": 6}]),
                ),
        );

        let picks = sections.editors_picks(3).await;
        assert_eq!(picks.len(), 2);
        assert!(picks.iter().all(|p| p.featured));
        assert_eq!(mock.request_count("sticky=true"), 1);
    }

    #[tokio::test]
    async fn test_homepage_survives_total_failure() {
        let (sections, _) = sections(MockClient::new());
        let feed = sections.homepage().await;

        assert_eq!(feed.sections.len(), Section::ALL.len());
        assert!(feed.sections.iter().all(|s| s.posts.is_empty()));
        assert!(feed.latest_headlines.is_empty());
        assert!(feed.editors_picks.is_empty());
    }
}
