//! Whole-sitemap compliance checks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use url::Url;
use utoipa::ToSchema;

use super::entry::{parse_lastmod, SitemapEntry};

/// Hard limit on URLs per sitemap file.
pub const MAX_SITEMAP_URLS: usize = 50_000;

/// Size at which a warning is raised.
pub const WARN_SITEMAP_URLS: usize = 45_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub total_urls: usize,
    pub duplicate_urls: usize,
    pub invalid_urls: usize,
    pub priority_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SitemapValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

impl SitemapValidationResult {
    fn error(&mut self, message: String) {
        self.errors.push(message);
        self.is_valid = false;
    }
}

pub fn validate_sitemap(entries: &[SitemapEntry], origin: &str) -> SitemapValidationResult {
    validate_sitemap_at(entries, origin, Utc::now())
}

/// Validate against a fixed "now", which future-date warnings compare to.
pub fn validate_sitemap_at(
    entries: &[SitemapEntry],
    origin: &str,
    now: DateTime<Utc>,
) -> SitemapValidationResult {
    let mut result = SitemapValidationResult {
        is_valid: true,
        stats: ValidationStats {
            total_urls: entries.len(),
            ..ValidationStats::default()
        },
        ..SitemapValidationResult::default()
    };

    if entries.len() > MAX_SITEMAP_URLS {
        result.error("Sitemap exceeds maximum limit of 50,000 URLs".to_string());
    }
    if entries.len() > WARN_SITEMAP_URLS {
        result
            .warnings
            .push("Sitemap is approaching the 50,000 URL limit".to_string());
    }

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.url.is_empty() {
            result.error(format!("Entry {}: Missing URL", index + 1));
            result.stats.invalid_urls += 1;
            continue;
        }

        if !seen.insert(entry.url.as_str()) {
            result.error(format!("Duplicate URL found: {}", entry.url));
            result.stats.duplicate_urls += 1;
        }

        match Url::parse(&entry.url) {
            Ok(parsed) => {
                if !matches!(parsed.scheme(), "http" | "https") {
                    result.error(format!("Invalid protocol for URL: {}", entry.url));
                    result.stats.invalid_urls += 1;
                }
                if !entry.url.starts_with(origin) {
                    result
                        .warnings
                        .push(format!("URL uses different domain: {}", entry.url));
                }
            }
            Err(_) => {
                result.error(format!("Invalid URL format: {}", entry.url));
                result.stats.invalid_urls += 1;
            }
        }

        if (0.0..=1.0).contains(&entry.priority) {
            *result
                .stats
                .priority_distribution
                .entry(entry.priority.to_string())
                .or_default() += 1;
        } else {
            result.error(format!("Invalid priority for {}: {}", entry.url, entry.priority));
        }

        if !entry.last_modified.is_empty() {
            match parse_lastmod(&entry.last_modified) {
                Some(date) if date > now => result.warnings.push(format!(
                    "Future lastModified date for {}: {}",
                    entry.url, entry.last_modified
                )),
                Some(_) => {}
                None => result.error(format!(
                    "Invalid lastModified date for {}: {}",
                    entry.url, entry.last_modified
                )),
            }
        }
    }

    if entries.is_empty() {
        result.error("Sitemap is empty".to_string());
    }

    let homepage = format!("{}/", origin.trim_end_matches('/'));
    let has_homepage = entries
        .iter()
        .any(|e| e.url == homepage || e.url == homepage.trim_end_matches('/'));
    if !has_homepage {
        result.warnings.push("Homepage not found in sitemap".to_string());
    }

    if entries.iter().filter(|e| e.priority == 1.0).count() > 1 {
        result
            .warnings
            .push("Multiple URLs with priority 1.0 found".to_string());
    }

    result
}
