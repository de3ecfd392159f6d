//! Contact routes.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::contact::{Contact, ContactPayload},
    runtime::Runtime,
    server::{
        auth,
        error::{ApiError, ApiResult},
        RemovePayload,
    },
};

/// `POST /api/contact/insert`.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<ContactPayload>) -> ApiResult<Json<Contact>> {
    auth::require(&auth)?;

    Ok(Json(runtime.db.insert_contact(payload).await?))
}

/// `GET /api/contact/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<Contact>> {
    auth::require(&auth)?;

    let contact = runtime.db.get_contact(&id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(contact))
}

/// `GET /api/contact/getAll`.
#[instrument(skip_all)]
pub async fn get_all(State(runtime): State<Runtime>, auth: AuthState) -> ApiResult<Json<Vec<Contact>>> {
    auth::require(&auth)?;

    Ok(Json(runtime.db.list_contacts().await?))
}

/// `POST /api/contact/remove`.
#[instrument(skip_all)]
pub async fn remove(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<RemovePayload>) -> ApiResult<Json<Contact>> {
    auth::require(&auth)?;

    let removed = runtime.db.remove_contact(&payload.id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(removed))
}
