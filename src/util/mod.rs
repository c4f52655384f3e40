//! Utility functions for common operations.
//!
//! - **URL validation**: feed URLs must be http(s) and fit the stored column
//! - **Text processing**: column-cap truncation and markup stripping

mod text;
mod url_validator;

pub use text::{exceeds_cap, strip_markup, truncate_field};
pub use url_validator::{validate_feed_url, UrlValidationError, MAX_FEED_URL_LENGTH};
