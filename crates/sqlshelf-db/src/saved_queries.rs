use crate::Database;
use crate::models::QueryRow;
use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

const QUERY_COLUMNS: &str = "id, owner_id, title, query_text, created_at, updated_at";

impl Database {
    pub fn insert_query(&self, row: &QueryRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO queries (id, owner_id, title, query_text, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    row.id,
                    row.owner_id,
                    row.title,
                    row.query_text,
                    row.created_at,
                    row.updated_at
                ],
            )?;
            Ok(())
        })
    }

    /// Most recently updated first.
    pub fn list_queries(&self, owner_id: &str) -> Result<Vec<QueryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUERY_COLUMNS} FROM queries
                 WHERE owner_id = ?1
                 ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([owner_id], map_query)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_query(&self, owner_id: &str, id: &str) -> Result<Option<QueryRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {QUERY_COLUMNS} FROM queries WHERE id = ?1 AND owner_id = ?2"),
                    [id, owner_id],
                    map_query,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Overwrites title and text. `None` when no such query belongs to `owner_id`.
    pub fn update_query(
        &self,
        owner_id: &str,
        id: &str,
        title: &str,
        query_text: &str,
        updated_at: &str,
    ) -> Result<Option<QueryRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "UPDATE queries SET title = ?3, query_text = ?4, updated_at = ?5
                         WHERE id = ?1 AND owner_id = ?2
                         RETURNING {QUERY_COLUMNS}"
                    ),
                    [id, owner_id, title, query_text, updated_at],
                    map_query,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns whether a row was removed.
    pub fn delete_query(&self, owner_id: &str, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM queries WHERE id = ?1 AND owner_id = ?2",
                [id, owner_id],
            )?;
            Ok(n > 0)
        })
    }
}

fn map_query(row: &Row<'_>) -> rusqlite::Result<QueryRow> {
    Ok(QueryRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        query_text: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
