//! WordPress REST shapes, as far as this crate reads them.
//!
//! Every field is defaulted: a post with missing or null fields still
//! deserializes and the transformer fills in placeholders.

use serde::{Deserialize, Deserializer, Serialize};

/// `{ "rendered": "..." }` wrapper used by title/content/excerpt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rendered: String,
}

impl Rendered {
    pub fn new(text: &str) -> Self {
        Self {
            rendered: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: Rendered,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Rendered,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: Rendered,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<u64>,
    #[serde(default)]
    pub author: u64,
    #[serde(default)]
    pub featured_media: u64,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub yoast_head_json: Option<serde_json::Value>,
}

/// The `_embedded` block produced by `_embed=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: Vec<EmbeddedAuthor>,
    #[serde(
        default,
        rename = "wp:featuredmedia",
        deserialize_with = "null_as_default"
    )]
    pub featured_media: Vec<EmbeddedMedia>,
    #[serde(default, rename = "wp:term", deserialize_with = "null_as_default")]
    pub terms: Vec<Vec<Term>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedAuthor {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedMedia {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    /// `category`, `post_tag`, or a custom taxonomy. Absent in some trimmed payloads.
    #[serde(default)]
    pub taxonomy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub parent: u64,
}

/// Query for `wp/v2/posts`.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    /// Comma-separated category IDs.
    pub categories: Option<String>,
    pub search: Option<String>,
    pub slug: Option<String>,
    pub author: Option<u64>,
    pub embed: bool,
    pub sticky: bool,
    /// Defaults to `publish` when empty.
    pub status: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            per_page: None,
            page: None,
            categories: None,
            search: None,
            slug: None,
            author: None,
            embed: true,
            sticky: false,
            status: None,
        }
    }
}

impl PostQuery {
    pub fn latest(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    /// Query parameters in the order WordPress receives them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(per_page) = self.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(categories) = &self.categories {
            params.push(("categories", categories.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(slug) = &self.slug {
            params.push(("slug", slug.clone()));
        }
        if let Some(author) = self.author {
            params.push(("author", author.to_string()));
        }
        if self.embed {
            params.push(("_embed", "true".to_string()));
        }
        if self.sticky {
            params.push(("sticky", "true".to_string()));
        }
        params.push((
            "status",
            self.status.clone().unwrap_or_else(|| "publish".to_string()),
        ));
        params.push(("orderby", "date".to_string()));
        params.push(("order", "desc".to_string()));
        params
    }
}

/// Accept `null` wherever a defaulted field would be.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
