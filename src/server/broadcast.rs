//! Broadcast routes: root-managed announcements plus the public gateway
//! that external clients poll with their topic's secret key.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::{
        broadcast::{Broadcast, BroadcastPayload},
        record_key,
    },
    runtime::Runtime,
    server::{
        auth,
        error::{ApiError, ApiResult},
        RemovePayload,
    },
};

#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    #[serde(default)]
    pub offset: u64,
}

/// `POST /api/broadcast/insert`.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<BroadcastPayload>) -> ApiResult<Json<Broadcast>> {
    auth::require_root(&auth)?;

    Ok(Json(runtime.db.insert_broadcast(payload).await?))
}

/// `GET /api/broadcast/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<Broadcast>> {
    auth::require(&auth)?;

    let broadcast = runtime.db.get_broadcast(&id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(broadcast))
}

/// `GET /api/broadcast/getAll`.
#[instrument(skip_all)]
pub async fn get_all(State(runtime): State<Runtime>, auth: AuthState) -> ApiResult<Json<Vec<Broadcast>>> {
    auth::require(&auth)?;

    Ok(Json(runtime.db.all_broadcasts().await?))
}

/// `POST /api/broadcast/remove`.
#[instrument(skip_all)]
pub async fn remove(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<RemovePayload>) -> ApiResult<Json<Broadcast>> {
    auth::require_root(&auth)?;

    let removed = runtime.db.remove_broadcast(&payload.id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(removed))
}

/// `GET /api/broadcast/gateway?offset=...`: the public polling endpoint.
/// The `x-client-token` header identifies the topic; pages hold ten
/// broadcasts, newest first.
#[instrument(skip_all)]
pub async fn gateway(State(runtime): State<Runtime>, headers: HeaderMap, Query(query): Query<GatewayQuery>) -> ApiResult<Json<Vec<Broadcast>>> {
    let token = headers
        .get("x-client-token")
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .ok_or_else(ApiError::unauthorized)?;

    let topic = runtime.db.find_topic_by_secret(token).await?.ok_or_else(ApiError::unauthorized)?;
    let topic_id = topic.id.as_ref().map(record_key).ok_or_else(ApiError::internal)?;

    Ok(Json(runtime.db.list_broadcasts(&topic_id, query.offset).await?))
}
