use anyhow::Result;

use super::schema::Database;
use super::types::{Entry, NewEntry};

const ENTRY_COLUMNS: &str = "id, feed_id, link, title, description, image, published, read";

/// Maximum number of entries to return from any single query (OOM protection)
const MAX_ENTRIES: i64 = 2000;

impl Database {
    // ========================================================================
    // Entry Operations
    // ========================================================================

    /// Find the entry stored for `(feed_id, link)`
    pub async fn find_entry(&self, feed_id: i64, link: &str) -> Result<Option<Entry>> {
        let entry = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE feed_id = ? AND link = ?"
        ))
        .bind(feed_id)
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    /// Insert a fully populated entry unless `(feed_id, link)` is taken.
    ///
    /// Returns `None` when another row already holds the key; the existing
    /// row is left untouched. A missing `published` is stored as the
    /// creation time.
    pub async fn create_entry(&self, entry: &NewEntry) -> Result<Option<Entry>> {
        let published = entry
            .published
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let created = sqlx::query_as(&format!(
            r#"
                INSERT INTO entries (feed_id, link, title, description, image, published)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(feed_id, link) DO NOTHING
                RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.feed_id)
        .bind(&entry.link)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(&entry.image)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    /// Entries of one feed, newest first
    pub async fn entries_for_feed(&self, feed_id: i64) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE feed_id = ? ORDER BY published DESC, id DESC LIMIT ?"
        ))
        .bind(feed_id)
        .bind(MAX_ENTRIES)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Most recent entries across all feeds, ordered by published time
    /// descending. `limit` is clamped to [`MAX_ENTRIES`].
    pub async fn recent_entries(&self, limit: usize) -> Result<Vec<Entry>> {
        let limit = i64::try_from(limit).unwrap_or(MAX_ENTRIES).min(MAX_ENTRIES);
        let entries = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY published DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Count of stored entries for one feed
    pub async fn count_entries(&self, feed_id: i64) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Mark an entry as read. Returns false if the entry does not exist.
    pub async fn mark_entry_read(&self, entry_id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE entries SET read = 1 WHERE id = ?")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
