use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use sqlshelf_types::api::Claims;
use sqlshelf_types::models::HistoryEntry;

use crate::error::Result;
use crate::library::path_id;
use crate::state::AppState;

/// GET /api/history — newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.history.list(claims.sub).await?))
}

/// DELETE /api/history/all
pub async fn clear_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    let removed = state.history.clear_all(claims.sub).await?;
    info!("Cleared {} history entries for {}", removed, claims.sub);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/history/{id}
pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    state.history.remove(claims.sub, path_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
