use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

use crate::feed::parser::{parse_feed, ParsedFeed};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

const MAX_REDIRECTS: usize = 3;

/// Default request timeout for a single feed fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level failures while retrieving a feed.
///
/// Parse problems are not errors here: they come back as a malformed
/// [`ParsedFeed`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Build the HTTP client shared by every poll.
///
/// Follows at most 3 redirects and rejects loops. The per-request bound is
/// applied by [`fetch`], not here.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(redirect_policy())
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}

fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        let hops = attempt.previous().len();
        if attempt.previous().contains(attempt.url()) {
            attempt.error("redirect loop")
        } else if hops >= MAX_REDIRECTS {
            attempt.error(format!("more than {MAX_REDIRECTS} redirects"))
        } else {
            tracing::debug!(to = %attempt.url(), hop = hops + 1, "Following feed redirect");
            attempt.follow()
        }
    })
}

/// Fetch `url` and parse the body into the tolerant feed model.
///
/// The whole request, body included, is bounded by `timeout`. There are no
/// retries: a failed fetch waits for the next poll.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Request exceeded `timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
/// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<ParsedFeed, FetchError> {
    let bytes = tokio::time::timeout(timeout, fetch_bytes(client, url))
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;

    Ok(parse_feed(&bytes))
}

/// GET `url` and collect a body of at most [`MAX_FEED_SIZE`] bytes.
async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let mut response = client.get(url).send().await?;

    // 4xx and 5xx fail immediately; the next scheduled poll is the retry
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let declared = response.content_length();
    if declared.is_some_and(|len| len > MAX_FEED_SIZE as u64) {
        return Err(FetchError::ResponseTooLarge);
    }

    let mut body = Vec::with_capacity(declared.map_or(0, |len| len as usize));
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > MAX_FEED_SIZE {
            return Err(FetchError::ResponseTooLarge);
        }
        body.extend_from_slice(&chunk);
    }

    match declared {
        Some(expected) if (body.len() as u64) < expected => Err(FetchError::IncompleteResponse {
            expected,
            received: body.len(),
        }),
        _ => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Test</title>
    <link>https://example.com/</link>
    <item><title>Item</title><link>https://example.com/1</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/xml"),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());
        let parsed = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await.unwrap();

        assert!(!parsed.is_malformed());
        assert_eq!(parsed.title.as_deref(), Some("Test"));
        assert_eq!(parsed.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/feed", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&mock_server)
            .await;

        let client = build_client("rssfeed-test").unwrap();
        let url = format!("{}/old", mock_server.uri());
        let parsed = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await.unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn test_fetch_redirect_loop_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/loop", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;

        let client = build_client("rssfeed-test").unwrap();
        let url = format!("{}/loop", mock_server.uri());
        let result = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_too_many_redirects_rejected() {
        let mock_server = MockServer::start().await;
        for hop in 0..4 {
            Mock::given(method("GET"))
                .and(path(format!("/hop{hop}")))
                .respond_with(ResponseTemplate::new(302).insert_header(
                    "Location",
                    format!("{}/hop{}", mock_server.uri(), hop + 1).as_str(),
                ))
                .mount(&mock_server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/hop4"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = build_client("rssfeed-test").unwrap();
        let url = format!("{}/hop0", mock_server.uri());
        let result = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());
        match fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());
        let result = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());
        let result = fetch(&client, &url, Duration::from_millis(200)).await;
        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_not_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());
        let parsed = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await.unwrap();
        assert!(parsed.is_malformed());
    }

    #[tokio::test]
    async fn test_fetch_response_too_large() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b' '; MAX_FEED_SIZE + 1]))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());
        let result = fetch(&client, &url, DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = reqwest::Client::new();
        // Port 9 (discard) is closed on test hosts
        let result = fetch(&client, "http://127.0.0.1:9/feed", DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(
            result,
            Err(FetchError::Network(_)) | Err(FetchError::Timeout(_))
        ));
    }
}
