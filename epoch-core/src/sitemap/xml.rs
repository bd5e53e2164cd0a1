//! Sitemap XML serialization.

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::fmt::Display;
use std::io::Cursor;

use crate::error::SitemapError;

use super::entry::{w3c_datetime, IndexEntry, NewsEntry, SitemapEntry};

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_err(e: impl Display) -> SitemapError {
    SitemapError::Xml(e.to_string())
}

fn start_document(root: &str, namespaces: &[(&str, &str)]) -> Result<XmlWriter, SitemapError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut start = BytesStart::new(root);
    for attr in namespaces {
        start.push_attribute(*attr);
    }
    writer.write_event(Event::Start(start)).map_err(xml_err)?;
    Ok(writer)
}

fn finish_document(mut writer: XmlWriter, root: &str) -> Result<String, SitemapError> {
    writer
        .write_event(Event::End(BytesEnd::new(root)))
        .map_err(xml_err)?;
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_err)
}

fn open(writer: &mut XmlWriter, name: &str) -> Result<(), SitemapError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn close(writer: &mut XmlWriter, name: &str) -> Result<(), SitemapError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

/// `<name>text</name>`; the text is escaped.
fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), SitemapError> {
    open(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    close(writer, name)
}

pub fn write_urlset(entries: &[SitemapEntry]) -> Result<String, SitemapError> {
    let mut writer = start_document("urlset", &[("xmlns", SITEMAP_NS)])?;

    for entry in entries {
        open(&mut writer, "url")?;
        text_element(&mut writer, "loc", &entry.url)?;
        text_element(&mut writer, "lastmod", &entry.lastmod())?;
        text_element(&mut writer, "changefreq", entry.change_frequency.as_str())?;
        text_element(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        close(&mut writer, "url")?;
    }

    finish_document(writer, "urlset")
}

/// Google News sitemap: one `<news:news>` block per article.
pub fn write_news_urlset(
    entries: &[NewsEntry],
    publication: &str,
    language: &str,
) -> Result<String, SitemapError> {
    let mut writer = start_document(
        "urlset",
        &[("xmlns", SITEMAP_NS), ("xmlns:news", NEWS_NS)],
    )?;

    for entry in entries {
        open(&mut writer, "url")?;
        text_element(&mut writer, "loc", &entry.url)?;
        open(&mut writer, "news:news")?;
        open(&mut writer, "news:publication")?;
        text_element(&mut writer, "news:name", publication)?;
        text_element(&mut writer, "news:language", language)?;
        close(&mut writer, "news:publication")?;
        text_element(
            &mut writer,
            "news:publication_date",
            &w3c_datetime(entry.publication_date),
        )?;
        text_element(&mut writer, "news:title", &entry.title)?;
        close(&mut writer, "news:news")?;
        close(&mut writer, "url")?;
    }

    finish_document(writer, "urlset")
}

pub fn write_sitemap_index(entries: &[IndexEntry]) -> Result<String, SitemapError> {
    let mut writer = start_document("sitemapindex", &[("xmlns", SITEMAP_NS)])?;

    for entry in entries {
        open(&mut writer, "sitemap")?;
        text_element(&mut writer, "loc", &entry.url)?;
        text_element(&mut writer, "lastmod", &entry.last_modified)?;
        close(&mut writer, "sitemap")?;
    }

    finish_document(writer, "sitemapindex")
}

/// Homepage-only sitemap built without the writer, so it cannot fail.
pub fn minimal_urlset(homepage: &str, lastmod: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"{}\">\n  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    \
         <changefreq>hourly</changefreq>\n    <priority>1.0</priority>\n  </url>\n</urlset>",
        SITEMAP_NS,
        quick_xml::escape::escape(homepage),
        quick_xml::escape::escape(lastmod),
    )
}

/// News sitemap with no articles.
pub fn empty_news_urlset() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\" xmlns:news=\"{}\">\n</urlset>",
        SITEMAP_NS, NEWS_NS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::ChangeFrequency;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_urlset_structure() {
        let xml = write_urlset(&[
            SitemapEntry::new(
                "https://www.test/",
                "2024-01-01T00:00:00",
                ChangeFrequency::Hourly,
                1.0,
            ),
            SitemapEntry::new(
                "https://www.test/article/a?x=1&y=2",
                "2024-01-02T03:04:05Z",
                ChangeFrequency::Daily,
                0.8,
            ),
        ])
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains("<loc>https://www.test/</loc>"));
        assert!(xml.contains("<lastmod>2024-01-01T00:00:00Z</lastmod>"));
        assert!(xml.contains("<changefreq>hourly</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.contains("x=1&amp;y=2"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_news_titles_are_escaped() {
        let xml = write_news_urlset(
            &[NewsEntry {
                url: "https://www.test/article/a".to_string(),
                title: "Fish & Chips <Live>".to_string(),
                publication_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            }],
            "The Maple Epoch",
            "en",
        )
        .unwrap();

        assert!(xml.contains("xmlns:news=\"http://www.google.com/schemas/sitemap-news/0.9\""));
        assert!(xml.contains("<news:name>The Maple Epoch</news:name>"));
        assert!(xml.contains("<news:language>en</news:language>"));
        assert!(xml.contains("<news:publication_date>2024-06-01T09:30:00Z</news:publication_date>"));
        assert!(xml.contains("<news:title>Fish &amp; Chips &lt;Live&gt;</news:title>"));
    }

    #[test]
    fn test_index_and_fallbacks() {
        let xml = write_sitemap_index(&[IndexEntry {
            url: "https://www.test/sitemap.xml".to_string(),
            last_modified: "2024-01-01T00:00:00Z".to_string(),
        }])
        .unwrap();
        assert!(xml.contains("<sitemapindex xmlns="));
        assert!(xml.contains("<loc>https://www.test/sitemap.xml</loc>"));

        let minimal = minimal_urlset("https://www.test", "2024-01-01T00:00:00Z");
        assert!(minimal.contains("<loc>https://www.test</loc>"));
        assert!(empty_news_urlset().contains("xmlns:news="));
        assert!(!empty_news_urlset().contains("<url>"));
    }
}
