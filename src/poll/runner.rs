use futures::stream::{self, StreamExt};

use super::reconcile::reconcile;
use super::{PollError, PollOptions, PollResult, PollSummary, SubscribeError};
use crate::feed::{check_required, entry_skip_reason, fetch, normalize_feed, ParsedFeed};
use crate::storage::{Database, Feed};
use crate::util::validate_feed_url;

/// Result of [`subscribe`]
#[derive(Debug)]
pub struct Subscription {
    pub feed: Feed,
    /// False when the URL was already subscribed
    pub created: bool,
    /// The immediate poll run for a newly created feed
    pub initial_poll: Option<PollResult>,
}

/// Polls every known feed, one independent poll per feed.
///
/// Polls run `options.concurrency` at a time. A failing feed only affects its
/// own [`PollResult`]; results come back in completion order.
pub async fn poll_all(
    db: &Database,
    client: &reqwest::Client,
    options: &PollOptions,
) -> Vec<PollResult> {
    let feed_ids = match db.list_feed_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list feeds to poll");
            return Vec::new();
        }
    };

    let results: Vec<PollResult> = stream::iter(feed_ids)
        .map(|feed_id| poll_feed(db, client, feed_id, options))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    tracing::info!(
        feeds = results.len(),
        failed = failed,
        "Poll cycle finished"
    );

    results
}

/// Polls one feed: fetch, validate, refresh the feed record, then reconcile
/// up to `options.max_entries` entries.
///
/// Never fails as a call; the outcome is in [`PollResult::result`].
pub async fn poll_feed(
    db: &Database,
    client: &reqwest::Client,
    feed_id: i64,
    options: &PollOptions,
) -> PollResult {
    let result = fetch_and_ingest(db, client, feed_id, options).await;

    if let Err(e) = &result {
        diagnostic!(options.verbose, feed_id = feed_id, error = %e, "Poll stopped");
    }

    PollResult { feed_id, result }
}

/// Creates a feed for `url` if none exists and polls it right away.
///
/// An already subscribed URL is returned as-is without polling; the periodic
/// trigger takes care of it.
pub async fn subscribe(
    db: &Database,
    client: &reqwest::Client,
    url: &str,
    options: &PollOptions,
) -> Result<Subscription, SubscribeError> {
    validate_feed_url(url)?;

    let (feed, created) = db
        .create_feed(url)
        .await
        .map_err(|e| SubscribeError::Database(e.to_string()))?;

    if !created {
        tracing::debug!(feed_id = feed.id, url = %url, "Feed already subscribed");
        return Ok(Subscription {
            feed,
            created,
            initial_poll: None,
        });
    }

    tracing::info!(feed_id = feed.id, url = %url, "Subscribed to feed");
    let initial_poll = poll_feed(db, client, feed.id, options).await;

    // Reload so the caller sees what the initial poll stored
    let feed = db
        .get_feed(feed.id)
        .await
        .map_err(|e| SubscribeError::Database(e.to_string()))?
        .unwrap_or(feed);

    Ok(Subscription {
        feed,
        created,
        initial_poll: Some(initial_poll),
    })
}

async fn fetch_and_ingest(
    db: &Database,
    client: &reqwest::Client,
    feed_id: i64,
    options: &PollOptions,
) -> Result<PollSummary, PollError> {
    let mut feed = db
        .get_feed(feed_id)
        .await
        .map_err(PollError::database)?
        .ok_or(PollError::FeedNotFound(feed_id))?;

    let parsed = fetch(client, &feed.url, options.fetch_timeout).await?;

    ingest(db, &mut feed, &parsed, options).await
}

/// Applies an already fetched feed to the store.
///
/// Checks the malformed note and the required fields before touching
/// anything; on either failure nothing is written.
pub async fn ingest(
    db: &Database,
    feed: &mut Feed,
    parsed: &ParsedFeed,
    options: &PollOptions,
) -> Result<PollSummary, PollError> {
    if let Some(reason) = &parsed.malformed {
        return Err(PollError::Malformed(reason.clone()));
    }

    check_required(parsed).map_err(PollError::Incomplete)?;

    let now = chrono::Utc::now().timestamp();
    normalize_feed(feed, parsed, &options.rules, now);
    db.save_feed(feed).await.map_err(PollError::database)?;

    let title = feed.title.as_deref().unwrap_or_default();
    diagnostic!(
        options.verbose,
        feed_id = feed.id,
        title = %title,
        entries = parsed.entries.len(),
        "Entries to process"
    );

    let mut summary = PollSummary {
        over_cap: parsed.entries.len().saturating_sub(options.max_entries),
        ..PollSummary::default()
    };

    for entry in parsed.entries.iter().take(options.max_entries) {
        summary.processed += 1;

        if let Some(reason) = entry_skip_reason(entry) {
            diagnostic!(
                options.verbose,
                feed_id = feed.id,
                link = entry.link.as_deref().unwrap_or_default(),
                reason = %reason,
                "Skipping entry"
            );
            summary.skipped += 1;
            continue;
        }

        // entry_skip_reason rejects entries without a link
        let Some(link) = entry.link.as_deref() else {
            continue;
        };

        let (_, created) = reconcile(db, feed.id, link, entry, &options.rules)
            .await
            .map_err(PollError::database)?;

        if created {
            summary.created += 1;
        } else {
            summary.existing += 1;
        }
    }

    diagnostic!(
        options.verbose,
        feed_id = feed.id,
        created = summary.created,
        existing = summary.existing,
        skipped = summary.skipped,
        over_cap = summary.over_cap,
        "Feed polled"
    );

    Ok(summary)
}
