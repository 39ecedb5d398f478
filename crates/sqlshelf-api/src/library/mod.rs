//! The stateful core: saved queries, their append-only history, and frozen
//! public share snapshots. Every store call filters or writes with the
//! owner id taken from the verified token.

mod ledger;
mod registry;
mod repository;

pub use ledger::HistoryLedger;
pub use registry::{ShareRegistry, generate_share_token};
pub use repository::QueryRepository;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlshelf_db::Database;
use tracing::error;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Runs a blocking store call off the async runtime.
pub(crate) async fn blocking<F, T>(db: &Arc<Database>, f: F) -> Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    run_blocking(move || f(&db)).await
}

/// Runs blocking work (store calls, password hashing) on the blocking pool.
/// Join failures and `f`'s own errors both surface as `AppError::Store`.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Store(anyhow!("blocking task failed: {}", e))
        })?
        .map_err(AppError::Store)
}

/// Current time at the precision the store keeps, plus its stored form.
pub(crate) fn now() -> (DateTime<Utc>, String) {
    let now = Utc::now().trunc_subsecs(6);
    (now, now.to_rfc3339_opts(SecondsFormat::Micros, true))
}

pub(crate) fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(raw).with_context(|| format!("corrupt timestamp '{}'", raw))?;
    Ok(ts.with_timezone(&Utc))
}

pub(crate) fn parse_uuid(raw: &str) -> anyhow::Result<Uuid> {
    raw.parse().with_context(|| format!("corrupt id '{}'", raw))
}

/// Path ids that are not UUIDs cannot name anything, so they are plain
/// not-found rather than a format error.
pub fn path_id(raw: &str) -> Result<Uuid> {
    raw.parse().map_err(|_| AppError::NotFound)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}
