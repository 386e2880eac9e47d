//! RSS document parsing

use super::{NewsItem, DEFAULT_SOURCE};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("malformed feed: {0}")]
pub struct FeedError(String);

impl From<quick_xml::Error> for FeedError {
    fn from(e: quick_xml::Error) -> Self {
        FeedError(e.to_string())
    }
}

impl From<quick_xml::DeError> for FeedError {
    fn from(e: quick_xml::DeError) -> Self {
        FeedError(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<RawSource>,
}

/// `<source url="...">Outlet name</source>`
#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(rename = "$text")]
    name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawItem {
    /// Items without a title or link can't be cited, so they are dropped.
    fn into_news_item(self) -> Option<NewsItem> {
        Some(NewsItem {
            title: non_empty(self.title)?,
            link: non_empty(self.link)?,
            publication_date: non_empty(self.pub_date).unwrap_or_default(),
            source: non_empty(self.source.and_then(|s| s.name))
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
    }
}

/// Parse a feed into at most `limit` items, in document order.
///
/// `<item>` elements are collected at any depth, so RSS 2.0 (items inside
/// `<channel>`) and RSS 1.0/RDF (items beside it) both work.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsItem>, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();

    while items.len() < limit {
        match reader.read_event()? {
            Event::Start(start) if start.local_name().as_ref() == b"item" => {
                let span = reader.read_to_end(start.name())?;
                let inner = span_text(xml, span.start, span.end)?;
                let raw: RawItem = quick_xml::de::from_str(&format!("<item>{inner}</item>"))?;
                items.extend(raw.into_news_item());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

fn span_text<P>(xml: &str, start: P, end: P) -> Result<&str, FeedError>
where
    usize: TryFrom<P>,
{
    let start = usize::try_from(start).ok();
    let end = usize::try_from(end).ok();
    start
        .zip(end)
        .and_then(|(start, end)| xml.get(start..end))
        .ok_or_else(|| FeedError("item content out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> String {
        format!(
            "<item><title>Headline {n}</title><link>https://news.example.com/{n}</link>\
             <guid isPermaLink=\"false\">g{n}</guid><pubDate>Mon, 0{n} Jan 2024 10:00:00 GMT</pubDate>\
             <description>&lt;a href=\"x\"&gt;desc&lt;/a&gt;</description>\
             <source url=\"https://outlet{n}.example.com\">Outlet {n}</source></item>"
        )
    }

    fn feed(items: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss version=\"2.0\"><channel>\
             <generator>NFE/5.0</generator><title>\"medical news\" - Google News</title>\
             <link>https://news.google.com/search?q=medical</link><language>en-US</language>\
             {items}</channel></rss>"
        )
    }

    #[test]
    fn test_parses_items_in_order() {
        let xml = feed(&(1..=3).map(item).collect::<String>());
        let items = parse_feed(&xml, 5).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            NewsItem {
                title: "Headline 1".to_string(),
                link: "https://news.example.com/1".to_string(),
                publication_date: "Mon, 01 Jan 2024 10:00:00 GMT".to_string(),
                source: "Outlet 1".to_string(),
            }
        );
        assert_eq!(items[2].link, "https://news.example.com/3");
    }

    #[test]
    fn test_caps_at_limit() {
        let xml = feed(&(1..=8).map(item).collect::<String>());
        let items = parse_feed(&xml, 5).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[4].title, "Headline 5");
    }

    #[test]
    fn test_missing_source_defaults() {
        let xml = feed(
            "<item><title>Flu season peaks</title><link>https://cdc.example/flu</link>\
             <pubDate>Tue, 02 Jan 2024</pubDate></item>",
        );
        let items = parse_feed(&xml, 5).unwrap();
        assert_eq!(items[0].source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_entities_and_cdata_are_decoded() {
        let xml = feed(
            "<item><title>Heart &amp; lung study</title>\
             <link><![CDATA[https://x.example/a?b=1&c=2]]></link></item>",
        );
        let items = parse_feed(&xml, 5).unwrap();
        assert_eq!(items[0].title, "Heart & lung study");
        assert_eq!(items[0].link, "https://x.example/a?b=1&c=2");
        assert_eq!(items[0].publication_date, "");
    }

    #[test]
    fn test_items_without_link_are_skipped() {
        let xml = feed(&format!(
            "<item><title>No link here</title></item>{}",
            item(1)
        ));
        let items = parse_feed(&xml, 5).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Headline 1");
    }

    #[test]
    fn test_empty_channel() {
        assert!(parse_feed(&feed(""), 5).unwrap().is_empty());
    }

    #[test]
    fn test_rdf_items_outside_channel() {
        let xml = "<?xml version=\"1.0\"?>\
             <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\" xmlns=\"http://purl.org/rss/1.0/\">\
             <channel rdf:about=\"https://a.example\"><title>Feed</title><link>https://a.example</link></channel>\
             <item rdf:about=\"https://a.example/1\"><title>A</title><link>https://a.example/1</link></item>\
             </rdf:RDF>";
        let items = parse_feed(xml, 5).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[0].link, "https://a.example/1");
        assert_eq!(items[0].source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_items_found_at_any_depth() {
        let xml = format!(
            "<feed><group><section>{}</section></group>{}</feed>",
            item(1),
            item(2)
        );
        let items = parse_feed(&xml, 5).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Headline 1", "Headline 2"]);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let xml = "<rss><channel><item><title>Broken</link></item></channel></rss>";
        assert!(parse_feed(xml, 5).is_err());
    }
}
