//! The HTTP API surface.
//!
//! Routes live under `/api`; writes are `POST`, reads are `GET`. Every route
//! except login and the broadcast gateway requires a bearer session token.

pub mod auth;
pub mod broadcast;
pub mod comment;
pub mod contact;
pub mod error;
pub mod file;
pub mod ticket;
pub mod topic;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::runtime::Runtime;

/// Shared payload for the `remove` routes.
#[derive(Debug, Deserialize)]
pub struct RemovePayload {
    pub id: String,
}

/// Build the API router over the runtime state.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/ticket/insert", post(ticket::insert))
        .route("/api/ticket/get/:id", get(ticket::get))
        .route("/api/ticket/getAll", get(ticket::get_all))
        .route("/api/ticket/remove", post(ticket::remove))
        .route("/api/ticket/countAll", get(ticket::count_all))
        .route("/api/comment/insert", post(comment::insert))
        .route("/api/comment/get/:id", get(comment::get))
        .route("/api/comment/getAll", get(comment::get_all))
        .route("/api/comment/remove", post(comment::remove))
        .route("/api/comment/addLike", post(comment::add_like))
        .route("/api/comment/removeLike", post(comment::remove_like))
        .route("/api/topic/insert", post(topic::insert))
        .route("/api/topic/get/:id", get(topic::get))
        .route("/api/topic/getAll", get(topic::get_all))
        .route("/api/topic/remove", post(topic::remove))
        .route("/api/topic/createSecret", post(topic::create_secret))
        .route("/api/broadcast/insert", post(broadcast::insert))
        .route("/api/broadcast/get/:id", get(broadcast::get))
        .route("/api/broadcast/getAll", get(broadcast::get_all))
        .route("/api/broadcast/remove", post(broadcast::remove))
        .route("/api/broadcast/gateway", get(broadcast::gateway))
        .route("/api/contact/insert", post(contact::insert))
        .route("/api/contact/get/:id", get(contact::get))
        .route("/api/contact/getAll", get(contact::get_all))
        .route("/api/contact/remove", post(contact::remove))
        .route("/api/file/insert", post(file::insert))
        .route("/api/file/get/:id", get(file::get))
        .route("/api/user/insert", post(user::insert))
        .route("/api/user/get/:id", get(user::get))
        .route("/api/user/getAll", get(user::get_all))
        .with_state(runtime)
}
