use anyhow::Result;

use crate::feed::{normalize_entry, FieldRules, ParsedEntry};
use crate::storage::{Database, Entry, NewEntry};

/// Lookup-or-create the entry for `(feed_id, link)`.
///
/// An existing entry is returned untouched with `created = false`. Otherwise
/// a shell bound to the key is populated from `parsed` and inserted. The
/// insert is conflict-tolerant, so a concurrent poller that wins the race
/// makes this call return the winner's row with `created = false`.
pub async fn reconcile(
    db: &Database,
    feed_id: i64,
    link: &str,
    parsed: &ParsedEntry,
    rules: &FieldRules,
) -> Result<(Entry, bool)> {
    if let Some(existing) = db.find_entry(feed_id, link).await? {
        return Ok((existing, false));
    }

    let mut shell = NewEntry::shell(feed_id, link);
    normalize_entry(&mut shell, parsed, rules);

    match db.create_entry(&shell).await? {
        Some(created) => Ok((created, true)),
        None => {
            tracing::debug!(feed_id, link, "Entry created concurrently by another poller");
            let existing = db
                .find_entry(feed_id, link)
                .await?
                .ok_or_else(|| anyhow::anyhow!("entry {link} vanished after insert conflict"))?;
            Ok((existing, false))
        }
    }
}
