use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use sqlshelf_types::api::{Claims, SaveQueryRequest};
use sqlshelf_types::models::SavedQuery;

use crate::error::Result;
use crate::extract::AppJson;
use crate::library::path_id;
use crate::state::AppState;

/// GET /api/queries
pub async fn list_queries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<SavedQuery>>> {
    Ok(Json(state.queries.list(claims.sub).await?))
}

/// POST /api/queries
pub async fn create_query(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<SaveQueryRequest>,
) -> Result<impl IntoResponse> {
    let query = state.queries.create(claims.sub, &req.title, &req.query).await?;
    Ok((StatusCode::CREATED, Json(query)))
}

/// GET /api/queries/{id}
pub async fn get_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SavedQuery>> {
    let query = state.queries.get_owned(claims.sub, path_id(&id)?).await?;
    Ok(Json(query))
}

/// POST /api/queries/update/{id}
pub async fn update_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<SaveQueryRequest>,
) -> Result<Json<SavedQuery>> {
    let query = state
        .queries
        .update(claims.sub, path_id(&id)?, &req.title, &req.query)
        .await?;
    Ok(Json(query))
}

/// DELETE /api/queries/{id}
pub async fn delete_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    state.queries.delete(claims.sub, path_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
