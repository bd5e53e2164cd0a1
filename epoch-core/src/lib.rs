pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod robots;
pub mod sections;
pub mod seo;
pub mod sitemap;
pub mod transform;
pub mod wordpress;

pub use auth::{AuthClient, WordPressUser, AUTHOR_ROLE};
pub use config::{ConfigError, PicksSource, SiteConfig};
pub use error::{AuthError, FetchError, SitemapError};
pub use http::{
    FileUpload, HttpClient, MockCall, MockClient, MockResponse, WordPressHttp, WordPressHttpBuilder,
};
pub use robots::render_robots;
pub use sections::{HomepageFeed, Section, SectionFeed, Sections};
pub use seo::{MetadataBuilder, PageMetadata, YoastClient, YoastSeo};
pub use sitemap::{GeneratedSitemap, SitemapGenerator, SitemapKind};
pub use transform::{transform_post, CosmeticSource, PostTransformer, TransformedPost};
pub use wordpress::{Media, NewPost, PostChanges, PostQuery, PostStatus, RawPost, WordPressClient};
