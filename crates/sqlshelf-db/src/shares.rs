use crate::models::ShareRow;
use crate::{Database, is_unique_violation};
use anyhow::Result;
use rusqlite::OptionalExtension;

impl Database {
    /// Returns `false` if the token is already taken; the caller picks a new one.
    pub fn insert_share(&self, row: &ShareRow) -> Result<bool> {
        self.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO shared_queries (share_token, title, query_text, original_owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    row.share_token,
                    row.title,
                    row.query_text,
                    row.original_owner_id,
                    row.created_at
                ],
            ) {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_share(&self, share_token: &str) -> Result<Option<ShareRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT share_token, title, query_text, original_owner_id, created_at
                     FROM shared_queries WHERE share_token = ?1",
                    [share_token],
                    |row| {
                        Ok(ShareRow {
                            share_token: row.get(0)?,
                            title: row.get(1)?,
                            query_text: row.get(2)?,
                            original_owner_id: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }
}
