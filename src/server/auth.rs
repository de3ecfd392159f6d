//! Bearer-token authentication and the login route.

use std::convert::Infallible;

use axum::{
    Json,
    async_trait,
    extract::{FromRequestParts, State},
    http::{HeaderMap, request::Parts},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::{
    base::types::AuthState,
    collection::record_key,
    runtime::Runtime,
    server::error::{ApiError, ApiResult},
};

/// Resolve the caller's bearer token to an [`AuthState`].
///
/// Extraction never rejects: a missing, malformed, or unknown token yields the
/// default (unauthenticated) state, and each handler decides what it accepts.
#[async_trait]
impl FromRequestParts<Runtime> for AuthState {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, runtime: &Runtime) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(AuthState::default());
        };

        let user = match runtime.db.session_user(&token).await {
            Ok(Some(user)) => user,
            _ => return Ok(AuthState::default()),
        };

        Ok(AuthState {
            authenticated: true,
            sub: user.id.as_ref().map(record_key),
            roles: user.roles,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get("authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    (!token.is_empty()).then(|| token.to_string())
}

/// Require an authenticated caller, returning its user record key.
pub fn require(auth: &AuthState) -> Result<&str, ApiError> {
    match (auth.authenticated, auth.sub.as_deref()) {
        (true, Some(sub)) => Ok(sub),
        _ => Err(ApiError::unauthorized()),
    }
}

/// Require an authenticated caller holding the admin role.
pub fn require_root(auth: &AuthState) -> Result<&str, ApiError> {
    let sub = require(auth)?;

    if auth.is_root() { Ok(sub) } else { Err(ApiError::unauthorized()) }
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login`: exchange credentials for a session token.
#[instrument(skip_all)]
pub async fn login(State(runtime): State<Runtime>, Json(payload): Json<LoginPayload>) -> ApiResult<Json<Value>> {
    let Some(user) = runtime.db.find_user_by_email(&payload.email).await? else {
        return Err(ApiError::unauthorized());
    };

    if !user.verify_password(&payload.password) {
        return Err(ApiError::unauthorized());
    }

    let user_id = user.id.as_ref().map(record_key).ok_or_else(ApiError::internal)?;
    let token = runtime.db.create_session(&user_id).await?;

    Ok(Json(json!({ "token": token })))
}

/// `POST /api/auth/logout`: discard the caller's session token.
#[instrument(skip_all)]
pub async fn logout(State(runtime): State<Runtime>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let token = bearer_token(&headers).ok_or_else(ApiError::unauthorized)?;

    runtime.db.delete_session(&token).await?;

    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed(roles: &[&str]) -> AuthState {
        AuthState {
            authenticated: true,
            sub: Some("alice".to_string()),
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }

    #[test]
    fn require_rejects_the_default_state() {
        assert!(require(&AuthState::default()).is_err());
        assert_eq!(require(&authed(&[])).unwrap(), "alice");
    }

    #[test]
    fn require_root_needs_the_root_role() {
        assert!(require_root(&authed(&["support"])).is_err());
        assert_eq!(require_root(&authed(&["root"])).unwrap(), "alice");
    }
}
