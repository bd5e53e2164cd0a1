//! Page metadata rendered into `<head>`.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::config::SiteConfig;

use super::yoast::{OgImageField, YoastSeo};

const OG_IMAGE_WIDTH: u32 = 1200;
const OG_IMAGE_HEIGHT: u32 = 630;
const DEFAULT_LOCALE: &str = "en_US";
const DEFAULT_TWITTER_CARD: &str = "summary_large_image";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_graph: Option<OpenGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterMeta>,
    /// schema.org JSON-LD graph, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub site_name: String,
    pub images: Vec<MetaImage>,
    pub locale: String,
    #[serde(rename = "type")]
    pub og_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetaImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TwitterMeta {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

/// Builds `PageMetadata` from Yoast data, or from plain strings when there is none.
pub struct MetadataBuilder<'a> {
    config: &'a SiteConfig,
}

impl<'a> MetadataBuilder<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    fn headline(&self) -> String {
        format!("{} - Breaking News & Latest Updates", self.config.site_name)
    }

    /// Map Yoast head data onto page metadata.
    ///
    /// Without Yoast data only title and description are produced.
    pub fn to_page_metadata(
        &self,
        yoast: Option<&YoastSeo>,
        fallback_title: Option<&str>,
        fallback_description: Option<&str>,
    ) -> PageMetadata {
        let Some(yoast) = yoast else {
            return PageMetadata {
                title: fallback_title.map_or_else(|| self.headline(), str::to_string),
                description: fallback_description
                    .unwrap_or("Stay informed with real-time coverage of breaking news from around the world.")
                    .to_string(),
                canonical: None,
                open_graph: None,
                twitter: None,
                schema: None,
            };
        };

        let site_name = self.config.site_name.as_str();
        let title = first_of(&[yoast.title.as_deref(), fallback_title], site_name);
        let description = first_of(
            &[yoast.description.as_deref(), fallback_description],
            "Breaking news and latest updates",
        );
        let images = normalize_images(yoast.og_image.as_ref(), yoast.title.as_deref().unwrap_or(""));

        let og_title = first_of(&[yoast.og_title.as_deref()], &title);
        let og_description = first_of(&[yoast.og_description.as_deref()], &description);

        let twitter_images = match (&yoast.twitter_image, images.first()) {
            (Some(url), _) if !url.is_empty() => vec![url.clone()],
            (_, Some(image)) => vec![image.url.clone()],
            _ => Vec::new(),
        };

        PageMetadata {
            canonical: non_empty(yoast.canonical.as_deref()),
            open_graph: Some(OpenGraph {
                title: og_title.clone(),
                description: og_description.clone(),
                url: non_empty(yoast.og_url.as_deref()),
                site_name: first_of(&[yoast.og_site_name.as_deref()], site_name),
                images,
                locale: first_of(&[yoast.og_locale.as_deref()], DEFAULT_LOCALE),
                og_type: first_of(&[yoast.og_type.as_deref()], "website"),
            }),
            twitter: Some(TwitterMeta {
                card: first_of(&[yoast.twitter_card.as_deref()], DEFAULT_TWITTER_CARD),
                title: first_of(&[yoast.twitter_title.as_deref()], &og_title),
                description: first_of(&[yoast.twitter_description.as_deref()], &og_description),
                images: twitter_images,
            }),
            schema: yoast.schema.clone(),
            title,
            description,
        }
    }

    /// Complete metadata for pages with no Yoast data at all, such as 404s.
    ///
    /// A slug makes this an article page under `/article/{slug}`.
    pub fn fallback_metadata(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        slug: Option<&str>,
    ) -> PageMetadata {
        let title = title.map_or_else(|| self.headline(), str::to_string);
        let description = description
            .unwrap_or(
                "Stay informed with real-time coverage of breaking news, politics, business, \
                 technology, health, sports, and entertainment.",
            )
            .to_string();
        let url = match slug {
            Some(slug) => self.canonical_for(&format!("/article/{}", slug)),
            None => self.config.frontend_url.clone(),
        };
        let image = self.config.frontend("/img/Maple.png");

        PageMetadata {
            canonical: Some(url.clone()),
            open_graph: Some(OpenGraph {
                title: title.clone(),
                description: description.clone(),
                url: Some(url),
                site_name: self.config.site_name.clone(),
                images: vec![MetaImage {
                    url: image.clone(),
                    width: OG_IMAGE_WIDTH,
                    height: OG_IMAGE_HEIGHT,
                    alt: format!("{} News", self.config.site_name),
                }],
                locale: DEFAULT_LOCALE.to_string(),
                og_type: if slug.is_some() { "article" } else { "website" }.to_string(),
            }),
            twitter: Some(TwitterMeta {
                card: DEFAULT_TWITTER_CARD.to_string(),
                title: title.clone(),
                description: description.clone(),
                images: vec![image],
            }),
            schema: None,
            title,
            description,
        }
    }

    /// Canonical public URL for a site path.
    pub fn canonical_for(&self, path: &str) -> String {
        self.config.frontend(path)
    }
}

fn first_of(candidates: &[Option<&str>], default: &str) -> String {
    candidates
        .iter()
        .flatten()
        .find(|s| !s.is_empty())
        .copied()
        .unwrap_or(default)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

fn normalize_images(field: Option<&OgImageField>, default_alt: &str) -> Vec<MetaImage> {
    match field {
        None => Vec::new(),
        Some(OgImageField::Single(url)) if url.is_empty() => Vec::new(),
        Some(OgImageField::Single(url)) => vec![MetaImage {
            url: url.clone(),
            width: OG_IMAGE_WIDTH,
            height: OG_IMAGE_HEIGHT,
            alt: default_alt.to_string(),
        }],
        Some(OgImageField::List(images)) => images
            .iter()
            .map(|img| MetaImage {
                url: img.url.clone(),
                width: img.width.filter(|w| *w > 0).unwrap_or(OG_IMAGE_WIDTH),
                height: img.height.filter(|h| *h > 0).unwrap_or(OG_IMAGE_HEIGHT),
                alt: non_empty(img.alt.as_deref()).unwrap_or_else(|| default_alt.to_string()),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo::yoast::OgImage;

    #[test]
    fn test_no_yoast_gives_title_and_description_only() {
        let config = SiteConfig::default();
        let meta = MetadataBuilder::new(&config).to_page_metadata(None, None, None);

        assert_eq!(meta.title, "The Maple Epoch - Breaking News & Latest Updates");
        assert!(meta.description.starts_with("Stay informed"));
        assert!(meta.open_graph.is_none());
        assert!(meta.twitter.is_none());

        let meta = MetadataBuilder::new(&config).to_page_metadata(None, Some("Page"), Some("Desc"));
        assert_eq!(meta.title, "Page");
        assert_eq!(meta.description, "Desc");
    }

    #[test]
    fn test_single_image_is_normalized() {
        let config = SiteConfig::default();
        let yoast = YoastSeo {
            title: Some("Story".to_string()),
            og_image: Some(OgImageField::Single("https://cdn.test/a.jpg".to_string())),
            ..YoastSeo::default()
        };
        let meta = MetadataBuilder::new(&config).to_page_metadata(Some(&yoast), None, None);

        let og = meta.open_graph.unwrap();
        assert_eq!(
            og.images,
            vec![MetaImage {
                url: "https://cdn.test/a.jpg".to_string(),
                width: 1200,
                height: 630,
                alt: "Story".to_string(),
            }]
        );
        assert_eq!(og.site_name, "The Maple Epoch");
        assert_eq!(og.locale, "en_US");
        assert_eq!(og.og_type, "website");
        assert_eq!(meta.twitter.unwrap().images, vec!["https://cdn.test/a.jpg"]);
    }

    #[test]
    fn test_twitter_falls_back_to_open_graph() {
        let config = SiteConfig::default();
        let yoast = YoastSeo {
            title: Some("T".to_string()),
            og_title: Some("OG T".to_string()),
            og_description: Some("OG D".to_string()),
            og_image: Some(OgImageField::List(vec![OgImage {
                url: "https://cdn.test/b.jpg".to_string(),
                width: Some(640),
                height: None,
                alt: Some("b".to_string()),
            }])),
            ..YoastSeo::default()
        };
        let meta = MetadataBuilder::new(&config).to_page_metadata(Some(&yoast), None, Some("fallback"));

        assert_eq!(meta.description, "fallback");
        let twitter = meta.twitter.unwrap();
        assert_eq!(twitter.title, "OG T");
        assert_eq!(twitter.description, "OG D");
        assert_eq!(twitter.card, "summary_large_image");
        assert_eq!(twitter.images, vec!["https://cdn.test/b.jpg"]);

        let image = &meta.open_graph.unwrap().images[0];
        assert_eq!((image.width, image.height), (640, 630));
    }

    #[test]
    fn test_fallback_metadata_for_article() {
        let config = SiteConfig::default();
        let builder = MetadataBuilder::new(&config);

        let meta = builder.fallback_metadata(Some("Gone"), None, Some("missing-story"));
        assert_eq!(
            meta.canonical.as_deref(),
            Some("https://www.mapleepoch.com/article/missing-story")
        );
        let og = meta.open_graph.unwrap();
        assert_eq!(og.og_type, "article");
        assert_eq!(og.images[0].url, "https://www.mapleepoch.com/img/Maple.png");

        let home = builder.fallback_metadata(None, None, None);
        assert_eq!(home.canonical.as_deref(), Some("https://www.mapleepoch.com"));
        assert_eq!(home.open_graph.unwrap().og_type, "website");
    }
}
