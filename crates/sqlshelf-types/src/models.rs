use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved SQL snippet. Only its owner can read or change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One title/text state a query passed through.
///
/// Entries are not linked to a query id, so they outlive the query that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

/// Frozen public copy of a query, readable by anyone holding the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSnapshot {
    pub share_token: String,
    pub title: String,
    pub query: String,
    pub original_owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}
