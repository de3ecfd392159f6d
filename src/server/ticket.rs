//! Ticket routes: upsert, reads, removal, and the count aggregation.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{error, instrument};

use crate::{
    base::types::AuthState,
    collection::{
        comment::Comment,
        record_key,
        ticket::{Ticket, TicketPayload},
    },
    interaction::ticket_event::handle_ticket_event,
    runtime::Runtime,
    service::db::TicketCounts,
    server::{
        auth,
        error::{ApiError, ApiResult},
        RemovePayload,
    },
};

/// A ticket with its comments inlined, the shape the dashboard reads.
#[derive(Debug, Serialize)]
pub struct TicketWithComments {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub comments: Vec<Comment>,
}

/// `POST /api/ticket/insert`: create or update a ticket, then kick off the
/// chat notification without blocking the response.
#[instrument(skip_all)]
pub async fn insert(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<TicketPayload>) -> ApiResult<Json<Ticket>> {
    auth::require(&auth)?;

    let upsert = runtime.db.upsert_ticket(payload, auth.sub.as_deref()).await?;

    handle_ticket_event(upsert.clone(), auth, runtime.config.clone(), runtime.db.clone(), runtime.chat.clone());

    Ok(Json(upsert.ticket))
}

/// `GET /api/ticket/get/:id`.
#[instrument(skip_all)]
pub async fn get(State(runtime): State<Runtime>, auth: AuthState, Path(id): Path<String>) -> ApiResult<Json<TicketWithComments>> {
    auth::require(&auth)?;

    let ticket = runtime.db.get_ticket(&id).await?.ok_or_else(ApiError::not_found)?;
    let comments = runtime.db.comments_for_ticket(&id).await?;

    Ok(Json(TicketWithComments { ticket, comments }))
}

/// `GET /api/ticket/getAll`. Every ticket carries its comments, same as `get`.
#[instrument(skip_all)]
pub async fn get_all(State(runtime): State<Runtime>, auth: AuthState) -> ApiResult<Json<Vec<TicketWithComments>>> {
    auth::require(&auth)?;

    let mut listing = Vec::new();
    for ticket in runtime.db.list_tickets().await? {
        let comments = match ticket.id.as_ref() {
            Some(id) => runtime.db.comments_for_ticket(&record_key(id)).await?,
            None => Vec::new(),
        };

        listing.push(TicketWithComments { ticket, comments });
    }

    Ok(Json(listing))
}

/// `POST /api/ticket/remove`.
#[instrument(skip_all)]
pub async fn remove(State(runtime): State<Runtime>, auth: AuthState, Json(payload): Json<RemovePayload>) -> ApiResult<Json<Ticket>> {
    auth::require(&auth)?;

    let removed = runtime.db.remove_ticket(&payload.id).await?.ok_or_else(ApiError::not_found)?;

    Ok(Json(removed))
}

/// `GET /api/ticket/countAll`: the grouped count aggregation. Aggregation
/// failures surface with their own error code rather than the generic 500.
#[instrument(skip_all)]
pub async fn count_all(State(runtime): State<Runtime>, auth: AuthState) -> ApiResult<Json<TicketCounts>> {
    auth::require(&auth)?;

    let counts = runtime.db.ticket_counts().await.map_err(|err| {
        error!("Ticket count aggregation failed: {:#}", err);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "TICKET_COUNT_AGGREGATION_FAILED")
    })?;

    Ok(Json(counts))
}
