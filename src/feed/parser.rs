//! Tolerant feed model and the `feed-rs` adapter that fills it.
//!
//! Source formats disagree about which fields exist, so every field here is
//! optional and the "detail" flags record whether the source carried the
//! structured form of a text field. Parsing never fails: input `feed-rs`
//! cannot interpret produces an empty [`ParsedFeed`] whose `malformed` note
//! says why.

use chrono::{DateTime, Utc};
use feed_rs::model;
use feed_rs::parser;

/// A media object reference (`media:thumbnail`, `media:content`, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
}

/// A link reference carrying an `href`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub media_thumbnail: Option<Vec<MediaRef>>,
    /// Legacy key used by a few producers; `feed-rs` has no equivalent, so
    /// only hand-built entries carry it.
    pub media_context: Option<Vec<MediaRef>>,
    pub media_content: Option<Vec<MediaRef>>,
    /// Links pointing at attached media (enclosures, image links)
    pub links: Option<Vec<LinkRef>>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Set when the source could not be interpreted. No other field may be
    /// trusted while this is present.
    pub malformed: Option<String>,
    pub title: Option<String>,
    pub title_detail: bool,
    pub link: Option<String>,
    pub description: Option<String>,
    pub description_detail: bool,
    pub published: Option<DateTime<Utc>>,
    /// `href` of the feed image
    pub image: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

impl ParsedFeed {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            malformed: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }
}

/// Parse raw RSS/Atom/JSON Feed bytes.
pub fn parse_feed(bytes: &[u8]) -> ParsedFeed {
    match parser::parse(bytes) {
        Ok(feed) => from_model(feed),
        Err(e) => ParsedFeed::malformed(e.to_string()),
    }
}

fn from_model(feed: model::Feed) -> ParsedFeed {
    let title_detail = feed.title.is_some();
    let description_detail = feed.description.is_some();

    ParsedFeed {
        malformed: None,
        title: feed.title.map(|t| t.content),
        title_detail,
        link: primary_link(&feed.links),
        description: feed.description.map(|t| t.content),
        description_detail,
        published: feed.published,
        image: feed.logo.or(feed.icon).map(|image| image.uri),
        entries: feed.entries.into_iter().map(entry_from_model).collect(),
    }
}

fn entry_from_model(entry: model::Entry) -> ParsedEntry {
    let link = primary_link(&entry.links);

    let media_links: Vec<LinkRef> = entry
        .links
        .iter()
        .filter(|l| is_media_link(l))
        .map(|l| LinkRef {
            href: l.href.clone(),
        })
        .collect();

    let thumbnails: Vec<MediaRef> = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| MediaRef {
            url: t.image.uri.clone(),
        })
        .collect();

    let contents: Vec<MediaRef> = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|c| c.url.as_ref())
        .map(|url| MediaRef {
            url: url.to_string(),
        })
        .collect();

    let summary = entry.summary.map(|s| s.content);
    let description = summary
        .clone()
        .or_else(|| entry.content.and_then(|c| c.body));

    ParsedEntry {
        title: entry.title.map(|t| t.content),
        link,
        description,
        published: entry.published,
        media_thumbnail: non_empty(thumbnails),
        media_context: None,
        media_content: non_empty(contents),
        links: non_empty(media_links),
        summary,
    }
}

/// The `alternate` link (or a link without `rel`), falling back to the first.
fn primary_link(links: &[model::Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

fn is_media_link(link: &model::Link) -> bool {
    link.rel.as_deref() == Some("enclosure")
        || link
            .media_type
            .as_deref()
            .is_some_and(|t| t.starts_with("image/"))
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
