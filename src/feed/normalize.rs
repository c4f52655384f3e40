//! Field normalization from the tolerant parsed model onto stored records.
//!
//! Everything here is pure: callers pass in the current time and the rules,
//! and get the record back with its fields set.

use std::fmt;

use crate::feed::parser::{MediaRef, ParsedEntry, ParsedFeed};
use crate::storage::{Feed, NewEntry};
use crate::util::{exceeds_cap, strip_markup, truncate_field};

/// Default column cap for titles and image URLs
pub const MAX_FIELD_LENGTH: usize = 2000;

/// Image extensions the summary heuristic looks for
const SUMMARY_IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".gif"];

/// Knobs for field normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    /// Column cap for titles and image URLs, in characters
    pub max_length: usize,
    /// Fall back to scraping an image URL out of the entry summary
    pub scrape_summary_images: bool,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            max_length: MAX_FIELD_LENGTH,
            scrape_summary_images: true,
        }
    }
}

/// A required feed-level field the parsed feed did not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    TitleDetail,
    Link,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Title => "title",
            MissingField::TitleDetail => "title_detail",
            MissingField::Link => "link",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an entry was filtered out before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySkip {
    BlankTitle,
    MissingLink,
    MissingDescription,
}

impl fmt::Display for EntrySkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntrySkip::BlankTitle => "blank title",
            EntrySkip::MissingLink => "no link",
            EntrySkip::MissingDescription => "no description",
        })
    }
}

// ============================================================================
// Feed
// ============================================================================

/// Check the fields a feed must expose before any of them is copied.
pub fn check_required(parsed: &ParsedFeed) -> Result<(), MissingField> {
    if parsed.title.is_none() {
        return Err(MissingField::Title);
    }
    if !parsed.title_detail {
        return Err(MissingField::TitleDetail);
    }
    if parsed.link.is_none() {
        return Err(MissingField::Link);
    }
    Ok(())
}

/// Copy feed-level fields from a validated parse onto `feed`.
///
/// `published` is only overwritten when the source carries one. Missing
/// description and image become empty strings.
pub fn normalize_feed(feed: &mut Feed, parsed: &ParsedFeed, rules: &FieldRules, now: i64) {
    if let Some(published) = parsed.published {
        feed.published = Some(published.timestamp());
    }

    feed.title = parsed
        .title
        .as_deref()
        .map(|t| truncate_field(t, rules.max_length).into_owned());
    feed.link = parsed.link.clone();

    feed.description = match (&parsed.description, parsed.description_detail) {
        (Some(description), true) => Some(description.clone()),
        _ => Some(String::new()),
    };

    feed.last_polled = Some(now);

    feed.image = parsed
        .image
        .as_deref()
        .map(|href| truncate_field(href, rules.max_length).into_owned())
        .unwrap_or_default();
}

// ============================================================================
// Entry
// ============================================================================

/// Decide whether a parsed entry is filtered out before reconciliation.
///
/// A missing title is allowed; an empty one is not.
pub fn entry_skip_reason(parsed: &ParsedEntry) -> Option<EntrySkip> {
    if parsed.title.as_deref() == Some("") {
        return Some(EntrySkip::BlankTitle);
    }
    if parsed.link.as_deref().map_or(true, str::is_empty) {
        return Some(EntrySkip::MissingLink);
    }
    if parsed.description.is_none() {
        return Some(EntrySkip::MissingDescription);
    }
    None
}

/// Populate a freshly created entry shell from its parsed source.
pub fn normalize_entry(entry: &mut NewEntry, parsed: &ParsedEntry, rules: &FieldRules) {
    if let Some(published) = parsed.published {
        entry.published = Some(published.timestamp());
    }

    entry.title = parsed
        .title
        .as_deref()
        .map(|t| truncate_field(t, rules.max_length).into_owned());

    entry.image = Some(entry_image(parsed, rules));

    entry.description = parsed.description.as_deref().map(strip_markup);
}

/// Pick an entry image from the first source that is present, in order:
/// `media_thumbnail`, `media_context`, `media_content`, `links`, then the
/// summary heuristic.
///
/// A chosen URL over the cap is discarded rather than truncated, since a
/// truncated URL no longer points at the image.
pub fn entry_image(parsed: &ParsedEntry, rules: &FieldRules) -> String {
    let candidate = first_media_url(&parsed.media_thumbnail)
        .or_else(|| first_media_url(&parsed.media_context))
        .or_else(|| first_media_url(&parsed.media_content))
        .or_else(|| {
            parsed
                .links
                .as_ref()
                .and_then(|l| l.first())
                .map(|l| l.href.clone())
        })
        .or_else(|| {
            if !rules.scrape_summary_images {
                return None;
            }
            parsed
                .summary
                .as_deref()
                .and_then(find_summary_image)
                .map(str::to_string)
        });

    match candidate {
        Some(url) if !exceeds_cap(&url, rules.max_length) => url,
        _ => String::new(),
    }
}

fn first_media_url(refs: &Option<Vec<MediaRef>>) -> Option<String> {
    refs.as_ref()
        .and_then(|r| r.first())
        .map(|m| m.url.clone())
}

/// Find an image URL inside free-form summary text.
///
/// Takes the earliest `.jpg`, `.png` or `.gif` that has an `http` somewhere
/// before it and returns the text from the nearest such `http` through the
/// extension.
pub fn find_summary_image(summary: &str) -> Option<&str> {
    let mut matches: Vec<(usize, &str)> = SUMMARY_IMAGE_EXTENSIONS
        .iter()
        .flat_map(|ext| summary.match_indices(*ext))
        .collect();
    matches.sort_unstable_by_key(|(idx, _)| *idx);

    matches.into_iter().find_map(|(idx, ext)| {
        summary[..idx]
            .rfind("http")
            .map(|start| &summary[start..idx + ext.len()])
    })
}
