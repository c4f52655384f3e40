use thiserror::Error;
use url::Url;

/// Longest feed URL the `feeds.url` column accepts
pub const MAX_FEED_URL_LENGTH: usize = 255;

/// Errors that can occur during feed URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL is longer than the stored column allows.
    #[error("URL is {0} characters long (max {MAX_FEED_URL_LENGTH})")]
    TooLong(usize),
}

/// Validates a URL string for use as a feed source.
///
/// Rejects unparsable URLs, non-HTTP(S) schemes and URLs longer than
/// [`MAX_FEED_URL_LENGTH`] characters. The original string is what gets
/// stored, so the length check runs on the input, not the normalized form.
///
/// # Examples
///
/// ```
/// use rssfeed::util::validate_feed_url;
///
/// assert!(validate_feed_url("https://example.com/feed.xml").is_ok());
/// assert!(validate_feed_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_feed_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let len = url_str.chars().count();
    if len > MAX_FEED_URL_LENGTH {
        return Err(UrlValidationError::TooLong(len));
    }

    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    Ok(url)
}
