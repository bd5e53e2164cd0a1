//! Normalization of raw WordPress posts into the shape every page renders.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::wordpress::{RawPost, Term};

/// Stock photo used when a post has no featured media.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.pexels.com/photos/3184292/pexels-photo-3184292.jpeg?auto=compress&cs=tinysrgb&w=400";

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const DEFAULT_CATEGORY: &str = "General";
pub const UNTITLED: &str = "Untitled";

/// Reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

static BLANK_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("Invalid blank lines regex"));

static NUMERIC_ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("Invalid numeric entity regex")
});

/// A post as the front end consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformedPost {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    /// HTML, injected verbatim by the renderer.
    pub content: String,
    pub category: String,
    pub image: String,
    pub author: String,
    /// e.g. "3 min read"
    pub read_time: String,
    /// Cosmetic, e.g. "2.4k views"
    pub views: String,
    pub publish_date: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub is_trending: bool,
    pub is_breaking: bool,
}

/// Where the cosmetic `views`/`isTrending`/`isBreaking` values come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CosmeticSource {
    /// Fresh random values on every transform. Not stable across renders.
    #[default]
    Random,
    /// Derived from the post ID, so the same post always looks the same.
    Seeded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cosmetics {
    views: f64,
    trending: f64,
    breaking: f64,
}

impl CosmeticSource {
    fn roll(&self, post_id: u64) -> Cosmetics {
        match self {
            CosmeticSource::Random => Cosmetics {
                views: rand::random::<f64>(),
                trending: rand::random::<f64>(),
                breaking: rand::random::<f64>(),
            },
            CosmeticSource::Seeded => {
                let digest = Sha256::digest(format!("post:{}", post_id).as_bytes());
                let unit = |i: usize| {
                    let bytes = [digest[i], digest[i + 1]];
                    u16::from_be_bytes(bytes) as f64 / 65536.0
                };
                Cosmetics {
                    views: unit(0),
                    trending: unit(2),
                    breaking: unit(4),
                }
            }
        }
    }
}

/// Maps raw posts to `TransformedPost`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostTransformer {
    cosmetics: CosmeticSource,
}

impl PostTransformer {
    pub fn new(cosmetics: CosmeticSource) -> Self {
        Self { cosmetics }
    }

    /// Deterministic transformer, for fixtures and tests.
    pub fn seeded() -> Self {
        Self::new(CosmeticSource::Seeded)
    }

    /// `None` in, `None` out.
    pub fn transform_opt(&self, post: Option<&RawPost>) -> Option<TransformedPost> {
        post.map(|p| self.transform(p))
    }

    pub fn transform_all(&self, posts: &[RawPost]) -> Vec<TransformedPost> {
        posts.iter().map(|p| self.transform(p)).collect()
    }

    pub fn transform(&self, post: &RawPost) -> TransformedPost {
        let embedded = post.embedded.as_ref();

        let author = embedded
            .and_then(|e| e.author.first())
            .and_then(|a| a.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let image = embedded
            .and_then(|e| e.featured_media.first())
            .and_then(|m| m.source_url.clone())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| FALLBACK_IMAGE_URL.to_string());

        let terms = embedded.map(|e| e.terms.as_slice()).unwrap_or_default();

        let category = term_group(terms, "category", 0)
            .first()
            .map(|t| decode_entities(&t.name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let tags = term_group(terms, "post_tag", 1)
            .iter()
            .map(|t| decode_entities(&t.name))
            .collect();

        let raw_title = post.title.rendered.trim();
        let title = if raw_title.is_empty() {
            UNTITLED.to_string()
        } else {
            decode_entities(raw_title)
        };

        let excerpt_text = decode_entities(strip_html(&post.excerpt.rendered).trim());
        let excerpt = if excerpt_text.is_empty() {
            title.clone()
        } else {
            excerpt_text
        };

        let content = clean_content(&post.content.rendered);
        let rolled = self.cosmetics.roll(post.id);

        TransformedPost {
            id: post.id,
            title,
            excerpt,
            read_time: format!("{} min read", read_time_minutes(&content)),
            content,
            category,
            image,
            author,
            views: format!("{:.1}k views", rolled.views * 5.0 + 1.0),
            publish_date: post.date.clone(),
            slug: post.slug.clone(),
            tags,
            featured: post.sticky,
            is_trending: rolled.trending > 0.7,
            is_breaking: rolled.breaking > 0.9,
        }
    }
}

/// Transform with random cosmetics. `None` in, `None` out.
pub fn transform_post(post: Option<&RawPost>) -> Option<TransformedPost> {
    PostTransformer::default().transform_opt(post)
}

/// Resolve a term group by taxonomy name when the payload says which is which,
/// otherwise by WordPress's positional convention (0 = categories, 1 = tags).
fn term_group<'a>(groups: &'a [Vec<Term>], taxonomy: &str, position: usize) -> &'a [Term] {
    let labelled = groups
        .iter()
        .flatten()
        .any(|t| t.taxonomy.is_some());

    if labelled {
        return groups
            .iter()
            .find(|group| {
                group
                    .iter()
                    .any(|t| t.taxonomy.as_deref() == Some(taxonomy))
            })
            .map(|group| group.as_slice())
            .unwrap_or_default();
    }

    groups.get(position).map(|g| g.as_slice()).unwrap_or_default()
}

/// Remove every `<...>` tag.
pub fn strip_html(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").into_owned()
}

/// Normalize line endings and collapse runs of blank lines. Markup is kept.
pub fn clean_content(html: &str) -> String {
    let unix = html.replace("\r\n", "\n");
    BLANK_LINES_REGEX
        .replace_all(&unix, "\n\n")
        .trim()
        .to_string()
}

/// `max(1, ceil(words / 200))` over the tag-stripped text.
pub fn read_time_minutes(html: &str) -> usize {
    let words = strip_html(html).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Decode the entities WordPress emits in rendered titles and excerpts.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let numeric = NUMERIC_ENTITY_REGEX.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&hellip;", "\u{2026}")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
