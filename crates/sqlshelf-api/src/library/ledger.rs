use std::sync::Arc;

use sqlshelf_db::Database;
use sqlshelf_db::models::HistoryRow;
use sqlshelf_types::models::HistoryEntry;
use uuid::Uuid;

use super::{blocking, now, parse_timestamp, parse_uuid};
use crate::error::{AppError, Result};

/// Append-only log of every title/text state a user's queries passed through.
///
/// Entries carry no query id and are never updated; they are only inserted,
/// removed one at a time, or cleared per owner.
#[derive(Clone)]
pub struct HistoryLedger {
    db: Arc<Database>,
}

impl HistoryLedger {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn record(&self, owner_id: Uuid, title: &str, text: &str) -> Result<HistoryEntry> {
        let (created_at, ts) = now();
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            query: text.to_string(),
            created_at,
        };
        let row = HistoryRow {
            id: entry.id.to_string(),
            owner_id: owner_id.to_string(),
            title: entry.title.clone(),
            query_text: entry.query.clone(),
            created_at: ts,
        };

        blocking(&self.db, move |db| db.insert_history(&row)).await?;
        Ok(entry)
    }

    /// Newest first.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<HistoryEntry>> {
        let rows = blocking(&self.db, move |db| db.list_history(&owner_id.to_string())).await?;
        rows.into_iter()
            .map(to_entry)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(AppError::Store)
    }

    pub async fn remove(&self, owner_id: Uuid, entry_id: Uuid) -> Result<()> {
        let removed = blocking(&self.db, move |db| {
            db.delete_history_entry(&owner_id.to_string(), &entry_id.to_string())
        })
        .await?;

        if removed { Ok(()) } else { Err(AppError::NotFound) }
    }

    /// Irreversible. Returns how many entries were dropped.
    pub async fn clear_all(&self, owner_id: Uuid) -> Result<usize> {
        blocking(&self.db, move |db| db.clear_history(&owner_id.to_string())).await
    }
}

fn to_entry(row: HistoryRow) -> anyhow::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: parse_uuid(&row.id)?,
        owner_id: parse_uuid(&row.owner_id)?,
        created_at: parse_timestamp(&row.created_at)?,
        title: row.title,
        query: row.query_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::{db, user};

    #[tokio::test]
    async fn list_is_newest_first() {
        let db = db();
        let alice = user(&db, "alice");
        let ledger = HistoryLedger::new(db);

        ledger.record(alice, "one", "SELECT 1").await.unwrap();
        ledger.record(alice, "two", "SELECT 2").await.unwrap();
        ledger.record(alice, "three", "SELECT 3").await.unwrap();

        let titles: Vec<_> = ledger.list(alice).await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, ["three", "two", "one"]);
    }

    #[tokio::test]
    async fn clear_all_leaves_other_owners_alone() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let ledger = HistoryLedger::new(db);

        ledger.record(alice, "a", "SELECT 'a'").await.unwrap();
        ledger.record(bob, "b", "SELECT 'b'").await.unwrap();

        assert_eq!(ledger.clear_all(alice).await.unwrap(), 1);
        assert!(ledger.list(alice).await.unwrap().is_empty());

        let bobs = ledger.list(bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].owner_id, bob);
    }

    #[tokio::test]
    async fn remove_hides_existence_from_other_owners() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let ledger = HistoryLedger::new(db);

        let entry = ledger.record(alice, "a", "SELECT 1").await.unwrap();

        assert!(matches!(ledger.remove(bob, entry.id).await, Err(AppError::NotFound)));
        assert!(matches!(ledger.remove(alice, Uuid::new_v4()).await, Err(AppError::NotFound)));
        ledger.remove(alice, entry.id).await.unwrap();
        assert!(ledger.list(alice).await.unwrap().is_empty());
    }
}
