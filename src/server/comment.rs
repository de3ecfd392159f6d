//! Comment routes: insert, per-ticket listing, and likes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::comment::{Comment, CommentPayload},
    interaction::comment_event::handle_comment_event,
    runtime::Runtime,
    server::{
        auth,
        error::{ApiError, ApiResult},
        RemovePayload,
    },
};

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub ticket: String,
}

#[derive(Debug, Deserialize)]
pub struct LikePayload {
    pub comment_id: String,
}

/// `POST /api/comment/insert`: attach a comment to a ticket, then fan the
/// WhatsApp notifications out without blocking the response.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<CommentPayload>) -> ApiResult<Json<Comment>> {
    auth::require(&auth)?;

    let comment = runtime.db.insert_comment(payload, auth.sub.as_deref()).await?;

    handle_comment_event(comment.clone(), runtime.config.clone(), runtime.db.clone(), runtime.messenger.clone());

    Ok(Json(comment))
}

/// `GET /api/comment/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<Comment>> {
    auth::require(&auth)?;

    let comment = runtime.db.get_comment(&id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(comment))
}

/// `GET /api/comment/getAll?ticket=...`.
#[instrument(skip_all)]
pub async fn get_all(State(runtime): State<Runtime>, auth: AuthState, Query(query): Query<TicketQuery>) -> ApiResult<Json<Vec<Comment>>> {
    auth::require(&auth)?;

    Ok(Json(runtime.db.comments_for_ticket(&query.ticket).await?))
}

/// `POST /api/comment/remove`.
#[instrument(skip_all)]
pub async fn remove(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<RemovePayload>) -> ApiResult<Json<Comment>> {
    auth::require(&auth)?;

    let removed = runtime.db.remove_comment(&payload.id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(removed))
}

/// `POST /api/comment/addLike`.
#[instrument(skip_all)]
pub async fn add_like(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<LikePayload>) -> ApiResult<Json<Comment>> {
    let sub = auth::require(&auth)?;

    Ok(Json(runtime.db.set_comment_like(&payload.comment_id, sub, true).await?))
}

/// `POST /api/comment/removeLike`.
#[instrument(skip_all)]
pub async fn remove_like(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<LikePayload>) -> ApiResult<Json<Comment>> {
    let sub = auth::require(&auth)?;

    Ok(Json(runtime.db.set_comment_like(&payload.comment_id, sub, false).await?))
}
