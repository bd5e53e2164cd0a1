use epoch_core::{
    AuthClient, FetchError, HttpClient, PostTransformer, Sections, SiteConfig, SitemapGenerator,
    WordPressClient, WordPressHttp, YoastClient,
};
use std::sync::Arc;

/// Application state shared across all handlers
pub type AppState = Arc<Services>;

/// Every upstream client the handlers use, built over one HTTP client.
pub struct Services {
    pub config: Arc<SiteConfig>,
    pub wordpress: Arc<WordPressClient>,
    pub sections: Arc<Sections>,
    pub yoast: YoastClient,
    pub sitemaps: SitemapGenerator,
    pub auth: AuthClient,
}

impl Services {
    pub fn new(
        http: Arc<dyn HttpClient>,
        config: Arc<SiteConfig>,
        transformer: PostTransformer,
    ) -> Self {
        let wordpress = Arc::new(WordPressClient::new(http.clone(), config.clone()));
        Self {
            sections: Arc::new(Sections::new(wordpress.clone(), transformer)),
            yoast: YoastClient::new(http.clone(), config.clone()),
            sitemaps: SitemapGenerator::new(http.clone(), config.clone()),
            auth: AuthClient::new(http, config.clone()),
            wordpress,
            config,
        }
    }

    /// Production services talking to the configured WordPress over reqwest.
    pub fn from_config(config: SiteConfig) -> Result<Self, FetchError> {
        let http = WordPressHttp::builder().timeout(config.http_timeout).build()?;
        Ok(Self::new(
            Arc::new(http),
            Arc::new(config),
            PostTransformer::default(),
        ))
    }

    pub fn transformer(&self) -> PostTransformer {
        self.sections.transformer()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use epoch_core::MockClient;

    pub const API_URL: &str = "https://api.test/wp-json";
    pub const FRONTEND_URL: &str = "https://www.test";

    /// State over a mock upstream, with deterministic cosmetics.
    pub fn state(mock: Arc<MockClient>) -> AppState {
        let config = SiteConfig::new(API_URL, FRONTEND_URL).unwrap();
        Arc::new(Services::new(
            mock,
            Arc::new(config),
            PostTransformer::seeded(),
        ))
    }
}
