//! RSS feed source. One instance per configured feed URL.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::article::Article;
use crate::ingest::ArticleSource;

/// Top-of-feed cap, matching the per-feed batch the pipeline expects.
const MAX_ITEMS_PER_FEED: usize = 10;
const MAX_SUMMARY_CHARS: usize = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RssFeedSource {
    url: String,
    http: reqwest::Client,
}

impl RssFeedSource {
    pub fn new(url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (compatible; macrowire/0.1)")
            .build()
            .context("failed to build rss http client")?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }
}

#[async_trait::async_trait]
impl ArticleSource for RssFeedSource {
    async fn fetch(&self) -> Result<Vec<Article>> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("rss request failed: {}", self.url))?
            .text()
            .await
            .context("rss body read failed")?;

        parse_feed(&body, &self.url)
    }

    fn name(&self) -> &str {
        &self.url
    }
}

/// Parse an RSS document into articles. The channel title becomes the source
/// name, falling back to the feed URL.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<Vec<Article>> {
    let rss: Rss = quick_xml::de::from_str(xml).context("parsing rss xml")?;
    let source = rss
        .channel
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| feed_url.to_string());

    let mut out = Vec::new();
    for item in rss.channel.items.into_iter().take(MAX_ITEMS_PER_FEED) {
        let (Some(title), Some(link)) = (item.title, item.link) else {
            continue;
        };
        let summary: String = item
            .description
            .unwrap_or_default()
            .chars()
            .take(MAX_SUMMARY_CHARS)
            .collect();

        let pub_date = item
            .pub_date
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        out.push(Article {
            title,
            summary,
            link,
            pub_date,
            source: source.clone(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Business News</title>
    <item>
      <title>Fed hikes rates amid inflation fears</title>
      <link>https://example.com/fed-hike</link>
      <pubDate>Sat, 30 Aug 2026 12:00:00 GMT</pubDate>
      <description>Markets brace for impact.</description>
    </item>
    <item>
      <title>Untitled item is skipped</title>
    </item>
    <item>
      <title>No date still parses</title>
      <link>https://example.com/no-date</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_with_channel_title_as_source() {
        let articles = parse_feed(FIXTURE, "https://example.com/rss").unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.title, "Fed hikes rates amid inflation fears");
        assert_eq!(first.link, "https://example.com/fed-hike");
        assert_eq!(first.source, "Example Business News");
        assert_eq!(first.summary, "Markets brace for impact.");
        assert_eq!(
            first.pub_date.to_rfc2822(),
            "Sat, 30 Aug 2026 12:00:00 +0000"
        );

        // Linkless item dropped; dateless item defaults to now.
        assert_eq!(articles[1].link, "https://example.com/no-date");
    }

    #[test]
    fn falls_back_to_feed_url_when_channel_untitled() {
        let xml = r#"<rss><channel><item>
            <title>t</title><link>https://example.com/x</link>
        </item></channel></rss>"#;
        let articles = parse_feed(xml, "https://example.com/rss").unwrap();
        assert_eq!(articles[0].source, "https://example.com/rss");
    }

    #[test]
    fn caps_items_and_summary_length() {
        let mut xml = String::from("<rss><channel><title>S</title>");
        let long_desc = "x".repeat(2_000);
        for i in 0..15 {
            xml.push_str(&format!(
                "<item><title>t{i}</title><link>https://example.com/{i}</link><description>{long_desc}</description></item>"
            ));
        }
        xml.push_str("</channel></rss>");

        let articles = parse_feed(&xml, "u").unwrap();
        assert_eq!(articles.len(), 10);
        assert_eq!(articles[0].summary.chars().count(), 500);
    }

    #[test]
    fn invalid_xml_is_an_error() {
        assert!(parse_feed("not xml at all", "u").is_err());
    }
}
