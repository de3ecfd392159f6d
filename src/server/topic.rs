//! Topic routes, including root-only secret-key issuance.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::topic::{Topic, TopicPayload},
    runtime::Runtime,
    server::{
        auth,
        error::{ApiError, ApiResult},
        RemovePayload,
    },
};

#[derive(Debug, Deserialize)]
pub struct CreateSecretPayload {
    /// Topic record key to issue the key for.
    pub id: String,
}

/// `POST /api/topic/insert`.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<TopicPayload>) -> ApiResult<Json<Topic>> {
    auth::require_root(&auth)?;

    Ok(Json(runtime.db.insert_topic(payload, auth.sub.as_deref()).await?))
}

/// `GET /api/topic/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<Topic>> {
    auth::require(&auth)?;

    let topic = runtime.db.get_topic(&id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(topic))
}

/// `GET /api/topic/getAll`.
#[instrument(skip_all)]
pub async fn get_all(State(runtime): State<Runtime>, auth: AuthState) -> ApiResult<Json<Vec<Topic>>> {
    auth::require(&auth)?;

    Ok(Json(runtime.db.list_topics().await?))
}

/// `POST /api/topic/remove`.
#[instrument(skip_all)]
pub async fn remove(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<RemovePayload>) -> ApiResult<Json<Topic>> {
    auth::require_root(&auth)?;

    let removed = runtime.db.remove_topic(&payload.id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(removed))
}

/// `POST /api/topic/createSecret`: issue the topic's broadcast-gateway key.
/// Root only; a topic's key is issued exactly once.
#[instrument(skip_all)]
pub async fn create_secret(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<CreateSecretPayload>) -> ApiResult<Json<Topic>> {
    auth::require_root(&auth)?;

    Ok(Json(runtime.db.create_topic_secret(&payload.id).await?))
}
