//! User routes. Root-only; responses carry the sanitized [`UserView`].

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::user::{UserPayload, UserView},
    runtime::Runtime,
    server::{
        auth,
        error::{ApiError, ApiResult},
    },
};

/// `POST /api/user/insert`.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<UserPayload>) -> ApiResult<Json<UserView>> {
    auth::require_root(&auth)?;

    let user = runtime.db.create_user(payload.into_fresh(chrono::Utc::now())?).await?;

    Ok(Json(user.into()))
}

/// `GET /api/user/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<UserView>> {
    auth::require_root(&auth)?;

    let user = runtime.db.get_user(&id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(user.into()))
}

/// `GET /api/user/getAll`.
#[instrument(skip_all)]
pub async fn get_all(State(runtime): State<Runtime>, auth: AuthState) -> ApiResult<Json<Vec<UserView>>> {
    auth::require_root(&auth)?;

    let users = runtime.db.list_users().await?;

    Ok(Json(users.into_iter().map(UserView::from).collect()))
}
