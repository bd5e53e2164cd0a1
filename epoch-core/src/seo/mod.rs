//! Yoast SEO lookups and the page metadata built from them.

mod metadata;
mod rewrite;
mod yoast;

pub use metadata::{MetaImage, MetadataBuilder, OpenGraph, PageMetadata, TwitterMeta};
pub use rewrite::UrlRewriter;
pub use yoast::{OgImage, OgImageField, YoastClient, YoastSeo};
