use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds the database lock past the busy timeout
    #[error("The feed database is locked by another process. Please try again.")]
    Locked,

    /// The database file could not be opened or created
    #[error("Failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::Locked;
        }
        DatabaseError::Other(err)
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6) surface as these messages through
/// sqlx. SQLITE_CANTOPEN is a path problem, not contention.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
}

// ============================================================================
// Data Structures
// ============================================================================

/// A subscribed feed.
///
/// `url` is the identity. Everything else is refreshed by each successful
/// poll. `image` is never null: feeds without an image store an empty string.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Feed {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Unix seconds
    pub published: Option<i64>,
    /// Unix seconds
    pub last_polled: Option<i64>,
    pub image: String,
}

/// A stored feed entry. Written once, at creation.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub feed_id: i64,
    pub link: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Unix seconds
    pub published: i64,
    pub read: bool,
}

/// An entry that has not been persisted yet.
///
/// Bound to its `(feed_id, link)` key on construction; the remaining fields
/// are filled in by the normalizer before [`Database::create_entry`] stores it.
///
/// [`Database::create_entry`]: super::Database::create_entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub feed_id: i64,
    pub link: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Unix seconds; `None` stores the creation time
    pub published: Option<i64>,
}

impl NewEntry {
    pub fn shell(feed_id: i64, link: impl Into<String>) -> Self {
        Self {
            feed_id,
            link: link.into(),
            title: None,
            description: None,
            image: None,
            published: None,
        }
    }
}
