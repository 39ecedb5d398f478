/// Database row types — these map directly to SQLite rows.
/// Ids are UUID strings and timestamps are fixed-width RFC 3339 UTC strings,
/// so `ORDER BY` on them is chronological.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct QueryRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub query_text: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct HistoryRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub query_text: String,
    pub created_at: String,
}

pub struct ShareRow {
    pub share_token: String,
    pub title: String,
    pub query_text: String,
    pub original_owner_id: String,
    pub created_at: String,
}
