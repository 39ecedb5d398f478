use crate::Database;
use crate::models::HistoryRow;
use anyhow::Result;

impl Database {
    pub fn insert_history(&self, row: &HistoryRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO query_history (id, owner_id, title, query_text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![row.id, row.owner_id, row.title, row.query_text, row.created_at],
            )?;
            Ok(())
        })
    }

    /// Newest first; entries recorded in the same microsecond keep insertion order.
    pub fn list_history(&self, owner_id: &str) -> Result<Vec<HistoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, title, query_text, created_at
                 FROM query_history
                 WHERE owner_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([owner_id], |row| {
                    Ok(HistoryRow {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                        title: row.get(2)?,
                        query_text: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_history_entry(&self, owner_id: &str, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM query_history WHERE id = ?1 AND owner_id = ?2",
                [id, owner_id],
            )?;
            Ok(n > 0)
        })
    }

    /// Returns the number of entries removed.
    pub fn clear_history(&self, owner_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM query_history WHERE owner_id = ?1", [owner_id])?;
            Ok(n)
        })
    }
}
