//! Feed retrieval and field normalization.
//!
//! - [`fetcher`] - HTTP retrieval with a bounded timeout and size limit
//! - [`parser`] - The tolerant [`ParsedFeed`] model, filled from `feed-rs`
//! - [`normalize`] - Pure functions that copy parsed fields onto stored records
//!
//! # Example
//!
//! ```ignore
//! use rssfeed::feed::{fetch, check_required, normalize_feed, FieldRules};
//!
//! let parsed = fetch(&client, &feed.url, timeout).await?;
//! if !parsed.is_malformed() && check_required(&parsed).is_ok() {
//!     normalize_feed(&mut feed, &parsed, &FieldRules::default(), now);
//! }
//! ```

pub mod fetcher;
pub mod normalize;
pub mod parser;

pub use fetcher::{build_client, fetch, FetchError, DEFAULT_FETCH_TIMEOUT};
pub use normalize::{
    check_required, entry_image, entry_skip_reason, find_summary_image, normalize_entry,
    normalize_feed, EntrySkip, FieldRules, MissingField, MAX_FIELD_LENGTH,
};
pub use parser::{parse_feed, LinkRef, MediaRef, ParsedEntry, ParsedFeed};
