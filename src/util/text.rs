use std::borrow::Cow;

use scraper::Html;

/// Truncates a stored field to fit a column cap.
///
/// Length is counted in characters. A value longer than `cap` keeps its first
/// `cap - 1` characters; a value at or under `cap` is returned unchanged
/// (borrowed, no allocation).
///
/// # Examples
///
/// ```
/// use rssfeed::util::truncate_field;
///
/// assert_eq!(truncate_field("short", 10), "short");
/// assert_eq!(truncate_field("abcdef", 4), "abc");
/// ```
pub fn truncate_field(s: &str, cap: usize) -> Cow<'_, str> {
    match s.char_indices().nth(cap) {
        // More than `cap` characters: cut at the start of character cap-1
        Some(_) => {
            let end = s
                .char_indices()
                .nth(cap.saturating_sub(1))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            Cow::Owned(s[..end].to_string())
        }
        None => Cow::Borrowed(s),
    }
}

/// Returns true if `s` has more than `cap` characters.
pub fn exceeds_cap(s: &str, cap: usize) -> bool {
    s.chars().nth(cap).is_some()
}

/// Elements whose text content is never shown to a reader
const NON_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Strips markup from an HTML fragment, keeping only its visible text.
///
/// Entities are decoded and runs of whitespace collapse to a single space.
/// Script and style bodies are dropped. Plain text passes through with only
/// whitespace normalized.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);

    let mut visible = String::new();
    for node in fragment.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_TEXT_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            visible.push_str(text);
        }
    }

    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}
