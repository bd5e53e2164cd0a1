//! Sitemap generation and validation.

mod entry;
mod fetch;
mod generate;
mod utils;
mod validator;
mod xml;

pub use entry::{parse_lastmod, ChangeFrequency, IndexEntry, NewsEntry, SitemapEntry};
pub use fetch::{
    fetch_all_categories, fetch_all_posts, fetch_recent_posts, NewsPost, SitemapPost,
};
pub use generate::{GeneratedSitemap, SitemapGenerator, SitemapKind, SITEMAP_FILES};
pub use utils::{
    calculate_change_frequency, calculate_url_priority, deduplicate_sitemap_entries,
    is_valid_sitemap_url, log_sitemap_stats, normalize_sitemap_url, sitemap_stats,
    validate_sitemap_entry, SitemapStats,
};
pub use validator::{
    validate_sitemap, validate_sitemap_at, SitemapValidationResult, ValidationStats,
};
pub use xml::{write_news_urlset, write_sitemap_index, write_urlset};
