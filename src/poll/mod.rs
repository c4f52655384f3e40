//! The poll-and-reconcile pipeline.
//!
//! One poll fetches a feed, validates it, refreshes the stored feed record and
//! creates any entries not seen before. Every failure is terminal for that
//! poll only: [`poll_all`] isolates feeds from each other and nothing is
//! raised to the caller beyond the per-feed [`PollResult`].
//!
//! - [`reconcile`] - lookup-or-create of one entry keyed by `(feed, link)`
//! - [`runner`] - the per-feed state machine, batch driver and subscribe hook

use std::time::Duration;
use thiserror::Error;

use crate::feed::{FetchError, FieldRules, MissingField, DEFAULT_FETCH_TIMEOUT};
use crate::util::UrlValidationError;

/// Emit a poll diagnostic: `info` when the caller asked for verbose output,
/// `debug` otherwise.
macro_rules! diagnostic {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

pub mod reconcile;
pub mod runner;

pub use reconcile::reconcile;
pub use runner::{ingest, poll_all, poll_feed, subscribe, Subscription};

/// Default number of entries processed per poll
pub const MAX_ENTRIES_PER_POLL: usize = 20;

/// Default number of feeds polled at once by [`poll_all`]
pub const DEFAULT_POLL_CONCURRENCY: usize = 4;

/// Settings threaded through one poll invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Log diagnostics at `info` instead of `debug`
    pub verbose: bool,
    /// Entries beyond this many (in feed order) are ignored
    pub max_entries: usize,
    pub fetch_timeout: Duration,
    pub rules: FieldRules,
    /// Feeds polled at once by [`poll_all`]
    pub concurrency: usize,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            max_entries: MAX_ENTRIES_PER_POLL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            rules: FieldRules::default(),
            concurrency: DEFAULT_POLL_CONCURRENCY,
        }
    }
}

/// Why a poll stopped without updating the feed.
#[derive(Debug, Error)]
pub enum PollError {
    /// No feed with this id is stored
    #[error("Feed {0} not found")]
    FeedNotFound(i64),
    /// The feed could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The body could not be interpreted as a feed
    #[error("Malformed feed: {0}")]
    Malformed(String),
    /// The feed lacks a required field
    #[error("Incomplete feed: no {0}")]
    Incomplete(MissingField),
    /// Reading or writing the store failed
    #[error("Database error: {0}")]
    Database(String),
}

impl PollError {
    pub(crate) fn database(err: anyhow::Error) -> Self {
        PollError::Database(err.to_string())
    }
}

/// Counts for one successful poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Entries looked at (at most `max_entries`)
    pub processed: usize,
    /// New entries stored
    pub created: usize,
    /// Entries that were already stored
    pub existing: usize,
    /// Entries filtered out (blank title, no link, no description)
    pub skipped: usize,
    /// Entries past the per-poll cap, not looked at
    pub over_cap: usize,
}

/// Outcome of polling a single feed.
#[derive(Debug)]
pub struct PollResult {
    pub feed_id: i64,
    pub result: Result<PollSummary, PollError>,
}

/// Errors from [`subscribe`].
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlValidationError),
    #[error("Database error: {0}")]
    Database(String),
}
