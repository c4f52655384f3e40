use anyhow::Result;

use super::schema::Database;
use super::types::Feed;

const FEED_COLUMNS: &str = "id, url, title, link, description, published, last_polled, image";

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Create a feed for `url` unless one already exists.
    ///
    /// Returns the stored feed and whether this call created it. The insert
    /// is conflict-tolerant on `url`, so two callers racing on the same URL
    /// get one row and exactly one `true`.
    pub async fn create_feed(&self, url: &str) -> Result<(Feed, bool)> {
        let inserted: Option<Feed> = sqlx::query_as(&format!(
            "INSERT INTO feeds (url) VALUES (?) ON CONFLICT(url) DO NOTHING RETURNING {FEED_COLUMNS}"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(feed) = inserted {
            return Ok((feed, true));
        }

        let existing: Feed =
            sqlx::query_as(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?"))
                .bind(url)
                .fetch_one(&self.pool)
                .await?;
        Ok((existing, false))
    }

    /// Look up a feed by id
    pub async fn get_feed(&self, feed_id: i64) -> Result<Option<Feed>> {
        let feed = sqlx::query_as(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?"))
            .bind(feed_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(feed)
    }

    /// Persist every mutable feed field. `url` is the identity and is never
    /// rewritten.
    pub async fn save_feed(&self, feed: &Feed) -> Result<()> {
        sqlx::query(
            r#"
                UPDATE feeds SET
                    title = ?, link = ?, description = ?,
                    published = ?, last_polled = ?, image = ?
                WHERE id = ?
            "#,
        )
        .bind(&feed.title)
        .bind(&feed.link)
        .bind(&feed.description)
        .bind(feed.published)
        .bind(feed.last_polled)
        .bind(&feed.image)
        .bind(feed.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Ids of every known feed, oldest first
    pub async fn list_feed_ids(&self) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM feeds ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_feed_defaults() {
        let db = test_db().await;
        let (feed, created) = db.create_feed("https://example.com/rss").await.unwrap();

        assert!(created);
        assert!(feed.id > 0);
        assert_eq!(feed.url, "https://example.com/rss");
        assert_eq!(feed.title, None);
        assert_eq!(feed.last_polled, None);
        assert_eq!(feed.image, "");
    }

    #[tokio::test]
    async fn test_create_feed_duplicate_url_returns_existing() {
        let db = test_db().await;
        let (first, created_first) = db.create_feed("https://example.com/rss").await.unwrap();
        let (second, created_second) = db.create_feed("https://example.com/rss").await.unwrap();

        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first.id, second.id);
        assert_eq!(db.list_feed_ids().await.unwrap(), vec![first.id]);
    }

    #[tokio::test]
    async fn test_create_feed_rejects_overlong_url() {
        let db = test_db().await;
        let url = format!("https://example.com/{}", "a".repeat(250));
        assert!(db.create_feed(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_get_feed_missing() {
        let db = test_db().await;
        assert!(db.get_feed(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_feed_round_trip() {
        let db = test_db().await;
        let (mut feed, _) = db.create_feed("https://example.com/rss").await.unwrap();

        feed.title = Some("BBC News - Home".to_string());
        feed.link = Some("https://www.bbc.co.uk/news".to_string());
        feed.description = Some(String::new());
        feed.published = Some(1_483_272_000);
        feed.last_polled = Some(1_700_000_000);
        feed.image = "http://news.bbcimg.co.uk/nol/shared/img/bbc_news_120x60.gif".to_string();
        db.save_feed(&feed).await.unwrap();

        let stored = db.get_feed(feed.id).await.unwrap().unwrap();
        assert_eq!(stored, feed);
    }

    #[tokio::test]
    async fn test_save_feed_keeps_url() {
        let db = test_db().await;
        let (mut feed, _) = db.create_feed("https://example.com/rss").await.unwrap();
        feed.url = "https://elsewhere.example.com/rss".to_string();
        db.save_feed(&feed).await.unwrap();

        let stored = db.get_feed(feed.id).await.unwrap().unwrap();
        assert_eq!(stored.url, "https://example.com/rss");
    }

    #[tokio::test]
    async fn test_list_feed_ids_ordered() {
        let db = test_db().await;
        let (a, _) = db.create_feed("https://a.example.com/rss").await.unwrap();
        let (b, _) = db.create_feed("https://b.example.com/rss").await.unwrap();
        let (c, _) = db.create_feed("https://c.example.com/rss").await.unwrap();

        assert_eq!(db.list_feed_ids().await.unwrap(), vec![a.id, b.id, c.id]);
    }
}
