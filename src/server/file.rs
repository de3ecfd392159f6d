//! File-record routes. Upload mechanics live elsewhere; these store and read
//! the metadata the notifiers consume.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::file::{FilePayload, FileRecord},
    runtime::Runtime,
    server::{
        auth,
        error::{ApiError, ApiResult},
    },
};

/// `POST /api/file/insert`.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<FilePayload>) -> ApiResult<Json<FileRecord>> {
    auth::require(&auth)?;

    Ok(Json(runtime.db.insert_file(payload, auth.sub.as_deref()).await?))
}

/// `GET /api/file/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<FileRecord>> {
    auth::require(&auth)?;

    let file = runtime.db.get_file(&id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(file))
}
