use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sqlshelf_db::Database;
use sqlshelf_db::models::ShareRow;
use sqlshelf_types::models::SharedSnapshot;
use tracing::{info, warn};
use uuid::Uuid;

use super::{QueryRepository, blocking, now, parse_timestamp, parse_uuid};
use crate::error::{AppError, Result};

/// 192 bits of entropy per token.
const TOKEN_BYTES: usize = 24;

const MAX_TOKEN_ATTEMPTS: usize = 4;

/// Publishes immutable snapshots of saved queries under unguessable tokens.
/// Snapshots have a single state: once written they are never edited or revoked.
#[derive(Clone)]
pub struct ShareRegistry {
    db: Arc<Database>,
    queries: QueryRepository,
}

/// Random URL-safe share token, independent of time or sequence.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl ShareRegistry {
    pub fn new(db: Arc<Database>, queries: QueryRepository) -> Self {
        Self { db, queries }
    }

    /// Copies the query's current title and text. Later edits to the source
    /// never reach the snapshot.
    pub async fn create(&self, owner_id: Uuid, query_id: Uuid) -> Result<SharedSnapshot> {
        let source = self.queries.get_owned(owner_id, query_id).await?;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let (created_at, ts) = now();
            let snapshot = SharedSnapshot {
                share_token: generate_share_token(),
                title: source.title.clone(),
                query: source.query.clone(),
                original_owner_id: owner_id,
                created_at,
            };
            let row = ShareRow {
                share_token: snapshot.share_token.clone(),
                title: snapshot.title.clone(),
                query_text: snapshot.query.clone(),
                original_owner_id: owner_id.to_string(),
                created_at: ts,
            };

            if blocking(&self.db, move |db| db.insert_share(&row)).await? {
                info!("Query {} shared by {}", query_id, owner_id);
                return Ok(snapshot);
            }
            warn!("Share token collision, retrying");
        }

        Err(AppError::Store(anyhow::anyhow!(
            "no free share token after {} attempts",
            MAX_TOKEN_ATTEMPTS
        )))
    }

    /// Public lookup; no caller identity involved.
    pub async fn get(&self, share_token: &str) -> Result<SharedSnapshot> {
        let token = share_token.to_string();
        let row = blocking(&self.db, move |db| db.get_share(&token))
            .await?
            .ok_or(AppError::NotFound)?;

        to_snapshot(row).map_err(AppError::Store)
    }
}

fn to_snapshot(row: ShareRow) -> anyhow::Result<SharedSnapshot> {
    Ok(SharedSnapshot {
        original_owner_id: parse_uuid(&row.original_owner_id)?,
        created_at: parse_timestamp(&row.created_at)?,
        share_token: row.share_token,
        title: row.title,
        query: row.query_text,
    })
}
