//! Pure helpers shared by the sitemap generators and the validator.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use url::Url;

use super::entry::{parse_lastmod, ChangeFrequency, SitemapEntry};

/// Top-level category pages.
pub const MAIN_CATEGORIES: &[&str] = &[
    "/world",
    "/politics",
    "/business",
    "/technology",
    "/health",
    "/sports",
    "/entertainment",
    "/lifestyle",
];

/// Editorial sections with their own landing pages.
pub const SPECIAL_SECTIONS: &[&str] = &[
    "/daily-maple",
    "/maple-travel",
    "/through-the-lens",
    "/featured-articles",
    "/maple-voices",
    "/explore-canada",
    "/resources",
    "/events",
    "/booknook",
    "/the-friday-post",
    "/editors-picks",
    "/you-may-have-missed",
];

/// Path prefixes that never belong in a sitemap.
pub const EXCLUDED_PATHS: &[&str] = &[
    "/api/",
    "/dashboard/",
    "/auth/",
    "/admin/",
    "/_next/",
    "/wp-admin/",
    "/wp-content/",
    "/wp-includes/",
];

/// True for http(s) URLs on the public origin outside the excluded paths.
pub fn is_valid_sitemap_url(url: &str, origin: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Ok(origin) = Url::parse(origin) else {
        return false;
    };
    if parsed.origin() != origin.origin() {
        return false;
    }

    let path = parsed.path();
    !EXCLUDED_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

/// Drop query and fragment and any trailing slash (the root keeps its slash).
/// Unparseable input is returned unchanged.
pub fn normalize_sitemap_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let path = parsed.path().to_string();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        parsed.set_path(if trimmed.is_empty() { "/" } else { trimmed });
    }
    parsed.set_query(None);
    parsed.set_fragment(None);
    parsed.to_string()
}

fn is_single_segment(path: &str) -> bool {
    path != "/" && path.split('/').count() == 2
}

pub fn calculate_url_priority(url: &str) -> f64 {
    let Ok(parsed) = Url::parse(url) else {
        return 0.5;
    };
    let path = parsed.path();

    if path == "/" {
        1.0
    } else if MAIN_CATEGORIES.contains(&path) || SPECIAL_SECTIONS.contains(&path) {
        0.9
    } else if path.starts_with("/world/") {
        0.9
    } else if path.starts_with("/article/") {
        0.8
    } else if is_single_segment(path) {
        0.9
    } else {
        0.7
    }
}

pub fn calculate_change_frequency(url: &str) -> ChangeFrequency {
    let Ok(parsed) = Url::parse(url) else {
        return ChangeFrequency::Weekly;
    };
    let path = parsed.path();

    if path == "/" {
        ChangeFrequency::Hourly
    } else if MAIN_CATEGORIES.contains(&path)
        || SPECIAL_SECTIONS.contains(&path)
        || path.starts_with("/world/")
        || path.starts_with("/article/")
        || is_single_segment(path)
    {
        ChangeFrequency::Daily
    } else {
        ChangeFrequency::Monthly
    }
}

pub fn validate_sitemap_entry(entry: &SitemapEntry, origin: &str) -> bool {
    !entry.url.is_empty()
        && !entry.last_modified.is_empty()
        && is_valid_sitemap_url(&entry.url, origin)
        && (0.0..=1.0).contains(&entry.priority)
        && parse_lastmod(&entry.last_modified).is_some()
}

/// Keep the first valid entry per normalized URL, rewriting its URL to the
/// normalized form. Invalid entries are dropped.
pub fn deduplicate_sitemap_entries(entries: Vec<SitemapEntry>, origin: &str) -> Vec<SitemapEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let normalized = normalize_sitemap_url(&entry.url);
            if seen.contains(&normalized) || !validate_sitemap_entry(&entry, origin) {
                return None;
            }
            seen.insert(normalized.clone());
            entry.url = normalized;
            Some(entry)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapStats {
    pub total_entries: usize,
    pub priority_distribution: BTreeMap<String, usize>,
    pub change_frequency_distribution: BTreeMap<String, usize>,
    pub path_type_distribution: BTreeMap<String, usize>,
}

fn path_type(url: &str) -> &'static str {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path();
            if path == "/" {
                "homepage"
            } else if path.starts_with("/article/") {
                "articles"
            } else if path.starts_with("/world/") {
                "world-subcategories"
            } else if path.split('/').count() == 2 {
                "categories"
            } else {
                "other"
            }
        }
        Err(_) => "invalid",
    }
}

pub fn sitemap_stats(entries: &[SitemapEntry]) -> SitemapStats {
    let mut stats = SitemapStats {
        total_entries: entries.len(),
        ..SitemapStats::default()
    };

    for entry in entries {
        *stats
            .priority_distribution
            .entry(entry.priority.to_string())
            .or_default() += 1;
        *stats
            .change_frequency_distribution
            .entry(entry.change_frequency.to_string())
            .or_default() += 1;
        *stats
            .path_type_distribution
            .entry(path_type(&entry.url).to_string())
            .or_default() += 1;
    }
    stats
}

pub fn log_sitemap_stats(entries: &[SitemapEntry]) {
    let stats = sitemap_stats(entries);
    tracing::info!(
        total = stats.total_entries,
        priorities = ?stats.priority_distribution,
        change_frequencies = ?stats.change_frequency_distribution,
        path_types = ?stats.path_type_distribution,
        "sitemap generation statistics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.mapleepoch.com";

    fn entry(url: &str) -> SitemapEntry {
        SitemapEntry::new(url, "2024-01-01T00:00:00", ChangeFrequency::Daily, 0.8)
    }

    #[test]
    fn test_url_validity() {
        assert!(is_valid_sitemap_url("https://www.mapleepoch.com/article/a", ORIGIN));
        assert!(is_valid_sitemap_url("https://www.mapleepoch.com", ORIGIN));
        assert!(!is_valid_sitemap_url("https://www.mapleepoch.com/api/search", ORIGIN));
        assert!(!is_valid_sitemap_url("https://www.mapleepoch.com/wp-content/x.png", ORIGIN));
        assert!(!is_valid_sitemap_url("https://other.com/article/a", ORIGIN));
        assert!(!is_valid_sitemap_url("https://www.mapleepoch.com.evil.net/a", ORIGIN));
        assert!(!is_valid_sitemap_url("ftp://www.mapleepoch.com/a", ORIGIN));
        assert!(!is_valid_sitemap_url("not a url", ORIGIN));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "https://www.mapleepoch.com",
            "https://www.mapleepoch.com/",
            "https://www.mapleepoch.com/world/",
            "https://www.mapleepoch.com/article/a/?utm_source=x#top",
            "https://www.mapleepoch.com/a//",
            "garbage",
        ] {
            let once = normalize_sitemap_url(raw);
            assert_eq!(normalize_sitemap_url(&once), once, "{}", raw);
        }
        assert_eq!(
            normalize_sitemap_url("https://www.mapleepoch.com/article/a/?utm_source=x#top"),
            "https://www.mapleepoch.com/article/a"
        );
        assert_eq!(
            normalize_sitemap_url("https://www.mapleepoch.com"),
            "https://www.mapleepoch.com/"
        );
    }

    #[test]
    fn test_priority_table() {
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/"), 1.0);
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/world"), 0.9);
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/booknook"), 0.9);
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/world/asia"), 0.9);
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/article/x"), 0.8);
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/some-category"), 0.9);
        assert_eq!(calculate_url_priority("https://www.mapleepoch.com/a/b"), 0.7);
        assert_eq!(calculate_url_priority("::"), 0.5);
    }

    #[test]
    fn test_change_frequency_table() {
        assert_eq!(
            calculate_change_frequency("https://www.mapleepoch.com/"),
            ChangeFrequency::Hourly
        );
        assert_eq!(
            calculate_change_frequency("https://www.mapleepoch.com/article/x"),
            ChangeFrequency::Daily
        );
        assert_eq!(
            calculate_change_frequency("https://www.mapleepoch.com/a/b"),
            ChangeFrequency::Monthly
        );
        assert_eq!(calculate_change_frequency("::"), ChangeFrequency::Weekly);
    }

    #[test]
    fn test_entry_validation() {
        assert!(validate_sitemap_entry(&entry("https://www.mapleepoch.com/a"), ORIGIN));

        let mut bad = entry("https://www.mapleepoch.com/a");
        bad.priority = 1.5;
        assert!(!validate_sitemap_entry(&bad, ORIGIN));

        let mut bad = entry("https://www.mapleepoch.com/a");
        bad.last_modified = "whenever".to_string();
        assert!(!validate_sitemap_entry(&bad, ORIGIN));

        assert!(!validate_sitemap_entry(&entry(""), ORIGIN));
    }

    #[test]
    fn test_deduplicate_first_wins() {
        let mut first = entry("https://www.mapleepoch.com/article/a/");
        first.priority = 0.6;
        let entries = vec![
            first,
            entry("https://www.mapleepoch.com/article/a?ref=1"),
            entry("https://www.mapleepoch.com/article/b"),
            entry("https://elsewhere.com/article/c"),
        ];
        let input_len = entries.len();

        let deduped = deduplicate_sitemap_entries(entries, ORIGIN);
        assert!(deduped.len() <= input_len);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].url, "https://www.mapleepoch.com/article/a");
        assert_eq!(deduped[0].priority, 0.6);

        let urls: HashSet<_> = deduped.iter().map(|e| normalize_sitemap_url(&e.url)).collect();
        assert_eq!(urls.len(), deduped.len());
    }

    #[test]
    fn test_stats_buckets() {
        let mut home = entry("https://www.mapleepoch.com/");
        home.priority = 1.0;
        let stats = sitemap_stats(&[
            home,
            entry("https://www.mapleepoch.com/article/a"),
            entry("https://www.mapleepoch.com/world/asia"),
        ]);

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.priority_distribution.get("1"), Some(&1));
        assert_eq!(stats.priority_distribution.get("0.8"), Some(&2));
        assert_eq!(stats.path_type_distribution.get("homepage"), Some(&1));
        assert_eq!(stats.path_type_distribution.get("world-subcategories"), Some(&1));
    }
}
