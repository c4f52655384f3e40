//! Poll RSS/Atom feeds and keep their entries in SQLite.
//!
//! A poll fetches one feed, refreshes the stored feed record from it and
//! creates any entries not stored before. Stored entries are never rewritten.

pub mod config;
pub mod feed;
pub mod poll;
pub mod storage;
pub mod util;
