use std::sync::Arc;

use sqlshelf_db::Database;
use sqlshelf_db::models::QueryRow;
use sqlshelf_types::models::SavedQuery;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{HistoryLedger, blocking, now, parse_timestamp, parse_uuid, require_text};
use crate::error::{AppError, Result};

/// Owns each user's current saved queries.
///
/// Every mutation also appends to the [`HistoryLedger`]. The append is a
/// separate store write: if it fails after the primary write committed, the
/// failure is logged and the mutation still succeeds. A crash between the
/// two loses that history entry. Deletes append *before* removing the row,
/// so the last living state is recorded whenever the delete goes through.
#[derive(Clone)]
pub struct QueryRepository {
    db: Arc<Database>,
    ledger: HistoryLedger,
}

impl QueryRepository {
    pub fn new(db: Arc<Database>, ledger: HistoryLedger) -> Self {
        Self { db, ledger }
    }

    /// Most recently updated first.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<SavedQuery>> {
        let rows = blocking(&self.db, move |db| db.list_queries(&owner_id.to_string())).await?;
        rows.into_iter()
            .map(to_saved_query)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(AppError::Store)
    }

    pub async fn create(&self, owner_id: Uuid, title: &str, text: &str) -> Result<SavedQuery> {
        require_text("title", title)?;
        require_text("query", text)?;

        let (created_at, ts) = now();
        let query = SavedQuery {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            query: text.to_string(),
            created_at,
            updated_at: created_at,
        };
        let row = QueryRow {
            id: query.id.to_string(),
            owner_id: owner_id.to_string(),
            title: query.title.clone(),
            query_text: query.query.clone(),
            created_at: ts.clone(),
            updated_at: ts,
        };

        blocking(&self.db, move |db| db.insert_query(&row)).await?;
        debug!("Query {} created by {}", query.id, owner_id);

        self.record_history(owner_id, &query.title, &query.query).await;
        Ok(query)
    }

    /// Last write wins. `updatedAt` moves even if nothing else changed.
    pub async fn update(
        &self,
        owner_id: Uuid,
        query_id: Uuid,
        title: &str,
        text: &str,
    ) -> Result<SavedQuery> {
        require_text("title", title)?;
        require_text("query", text)?;

        let (_, ts) = now();
        let (t, q) = (title.to_string(), text.to_string());
        let row = blocking(&self.db, move |db| {
            db.update_query(&owner_id.to_string(), &query_id.to_string(), &t, &q, &ts)
        })
        .await?
        .ok_or(AppError::NotFound)?;

        let query = to_saved_query(row).map_err(AppError::Store)?;
        self.record_history(owner_id, &query.title, &query.query).await;
        Ok(query)
    }

    pub async fn delete(&self, owner_id: Uuid, query_id: Uuid) -> Result<()> {
        let last = self.get_owned(owner_id, query_id).await?;
        self.record_history(owner_id, &last.title, &last.query).await;

        let removed = blocking(&self.db, move |db| {
            db.delete_query(&owner_id.to_string(), &query_id.to_string())
        })
        .await?;

        // Lost a race with a concurrent delete of the same query.
        if !removed {
            return Err(AppError::NotFound);
        }

        debug!("Query {} deleted by {}", query_id, owner_id);
        Ok(())
    }

    /// `NotFound` both when the query doesn't exist and when someone else owns it.
    pub async fn get_owned(&self, owner_id: Uuid, query_id: Uuid) -> Result<SavedQuery> {
        let row = blocking(&self.db, move |db| {
            db.get_query(&owner_id.to_string(), &query_id.to_string())
        })
        .await?
        .ok_or(AppError::NotFound)?;

        to_saved_query(row).map_err(AppError::Store)
    }

    async fn record_history(&self, owner_id: Uuid, title: &str, text: &str) {
        if let Err(e) = self.ledger.record(owner_id, title, text).await {
            warn!("History append failed for owner {}: {}", owner_id, e);
        }
    }
}

fn to_saved_query(row: QueryRow) -> anyhow::Result<SavedQuery> {
    Ok(SavedQuery {
        id: parse_uuid(&row.id)?,
        owner_id: parse_uuid(&row.owner_id)?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
        title: row.title,
        query: row.query_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::{components, db, user};

    #[tokio::test]
    async fn create_lists_query_and_records_history() {
        let db = db();
        let alice = user(&db, "alice");
        let (repo, ledger, _) = components(&db);

        let q = repo.create(alice, "greet", "SELECT 1").await.unwrap();

        let listed = repo.list(alice).await.unwrap();
        assert_eq!(listed, vec![q.clone()]);

        let history = ledger.list(alice).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "greet");
        assert_eq!(history[0].query, "SELECT 1");
        assert!(history[0].created_at >= q.created_at);
    }

    #[tokio::test]
    async fn create_rejects_blank_fields_without_touching_the_store() {
        let db = db();
        let alice = user(&db, "alice");
        let (repo, ledger, _) = components(&db);

        assert!(matches!(repo.create(alice, "", "SELECT 1").await, Err(AppError::Validation(_))));
        assert!(matches!(repo.create(alice, "t", "   ").await, Err(AppError::Validation(_))));

        assert!(repo.list(alice).await.unwrap().is_empty());
        assert!(ledger.list(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cross_owner_access_is_not_found() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let (repo, ledger, _) = components(&db);

        let q = repo.create(alice, "mine", "SELECT 1").await.unwrap();

        assert!(matches!(repo.update(bob, q.id, "x", "SELECT 2").await, Err(AppError::NotFound)));
        assert!(matches!(repo.delete(bob, q.id).await, Err(AppError::NotFound)));
        assert!(matches!(repo.get_owned(bob, q.id).await, Err(AppError::NotFound)));

        assert_eq!(repo.get_owned(alice, q.id).await.unwrap().title, "mine");
        assert!(ledger.list(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_always_moves_updated_at() {
        let db = db();
        let alice = user(&db, "alice");
        let (repo, _, _) = components(&db);

        let q = repo.create(alice, "same", "SELECT 1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let u = repo.update(alice, q.id, "same", "SELECT 1").await.unwrap();

        assert_eq!(u.created_at, q.created_at);
        assert!(u.updated_at > q.updated_at);
    }

    #[tokio::test]
    async fn list_puts_recently_updated_first() {
        let db = db();
        let alice = user(&db, "alice");
        let (repo, _, _) = components(&db);

        let a = repo.create(alice, "a", "SELECT 'a'").await.unwrap();
        repo.create(alice, "b", "SELECT 'b'").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        repo.update(alice, a.id, "a2", "SELECT 'a'").await.unwrap();

        let titles: Vec<_> = repo.list(alice).await.unwrap().into_iter().map(|q| q.title).collect();
        assert_eq!(titles, ["a2", "b"]);
    }

    #[tokio::test]
    async fn delete_records_last_state_first() {
        let db = db();
        let alice = user(&db, "alice");
        let (repo, ledger, _) = components(&db);

        let q = repo.create(alice, "greet", "SELECT 1").await.unwrap();
        repo.update(alice, q.id, "greet2", "SELECT 2").await.unwrap();
        repo.delete(alice, q.id).await.unwrap();

        assert!(matches!(repo.get_owned(alice, q.id).await, Err(AppError::NotFound)));
        assert!(matches!(repo.delete(alice, q.id).await, Err(AppError::NotFound)));

        let history = ledger.list(alice).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!((history[0].title.as_str(), history[0].query.as_str()), ("greet2", "SELECT 2"));
    }

    #[tokio::test]
    async fn history_failure_does_not_undo_the_mutation() {
        let db = db();
        let alice = user(&db, "alice");
        let (repo, _, _) = components(&db);

        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE query_history")?;
            Ok(())
        })
        .unwrap();

        let q = repo.create(alice, "kept", "SELECT 1").await.unwrap();
        let updated = repo.update(alice, q.id, "kept2", "SELECT 2").await.unwrap();
        assert_eq!(updated.title, "kept2");
        assert_eq!(repo.list(alice).await.unwrap().len(), 1);

        repo.delete(alice, q.id).await.unwrap();
        assert!(repo.list(alice).await.unwrap().is_empty());
    }
}
