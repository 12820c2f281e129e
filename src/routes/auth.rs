// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication routes.
//!
//! The identity provider here is deliberately minimal: a valid session token
//! restores the prior identity, anything else mints a fresh anonymous one,
//! matching the app's frictionless first-run flow.

use axum::{
    extract::State,
    http::header,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, verify_jwt, SESSION_COOKIE};
use crate::models::UserRecord;
use crate::services::session::Identity;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(start_session))
        .route("/auth/signout", post(sign_out))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserRecord,
    /// Session JWT, also set as a cookie
    pub token: String,
}

/// Start (or restore) a session.
///
/// Emits the auth event into the session store, which loads or auto-creates
/// the profile and latches the auth-ready barrier.
async fn start_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let identity = restore_identity(&state, &jar, &headers).unwrap_or_else(|| {
        let identity = Identity::anonymous();
        tracing::info!(user_id = %identity.id, "Minted anonymous identity");
        identity
    });

    let user = state
        .session
        .on_auth_event(Some(identity))
        .await?
        .ok_or(AppError::NoActiveSession)?;

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(SessionResponse { user, token })))
}

/// Resolve an identity from an existing session token, if one is presented.
fn restore_identity(
    state: &AppState,
    jar: &CookieJar,
    headers: &axum::http::HeaderMap,
) -> Option<Identity> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|t| t.to_string())
        })?;

    let user_id = verify_jwt(&token, &state.config.jwt_signing_key).ok()?;
    tracing::debug!(%user_id, "Restoring identity from session token");
    Some(Identity {
        id: user_id,
        is_anonymous: true,
    })
}

#[derive(Serialize)]
pub struct SignOutResponse {
    pub signed_out: bool,
}

/// Sign out the current session and clear the cookie.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SignOutResponse>)> {
    state.session.on_auth_event(None).await?;

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    Ok((jar, Json(SignOutResponse { signed_out: true })))
}
