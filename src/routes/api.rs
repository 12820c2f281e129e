// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{LessonSummary, UserRecord};
use crate::services::gate::{Flow, GateDecision};
use crate::services::progression::{self, XpProgress};
use crate::time_utils::today_utc;
use crate::AppState;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/gate/{flow}", get(evaluate_gate))
        .route("/api/lessons/daily", get(get_daily_lesson))
        .route("/api/lessons/{lesson_id}/complete", post(complete_lesson))
        .route("/api/onboarding/complete", post(complete_onboarding))
}

/// The bound session user, which must match the token subject.
fn session_user(state: &AppState, auth: &AuthUser) -> Result<UserRecord> {
    state
        .session
        .current()
        .filter(|user| user.id == auth.user_id)
        .ok_or(AppError::NoActiveSession)
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response with display-ready progression data.
#[derive(Serialize)]
pub struct MeResponse {
    pub user: UserRecord,
    pub xp_progress: XpProgress,
    pub xp_to_next_level: u32,
    pub progress_text: String,
    pub streak_emoji: &'static str,
}

/// Get current user profile and progression summary.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let user = session_user(&state, &auth)?;

    Ok(Json(MeResponse {
        xp_progress: progression::xp_progress_within_level(user.xp),
        xp_to_next_level: progression::xp_remaining_to_next_level(user.xp),
        progress_text: progression::level_progress_text(user.xp),
        streak_emoji: progression::streak_emoji(user.current_streak),
        user,
    }))
}

// ─── Access Gate ─────────────────────────────────────────────

/// Evaluate whether the caller may enter a flow.
async fn evaluate_gate(
    State(state): State<Arc<AppState>>,
    Path(flow): Path<String>,
) -> Result<Json<GateDecision>> {
    let flow = match flow.as_str() {
        "onboarding" => Flow::Onboarding,
        "main" => Flow::Main,
        other => {
            return Err(AppError::InvalidInput(format!("unknown flow: {}", other)));
        }
    };

    let decision = state.gate.evaluate(flow).await?;
    Ok(Json(decision))
}

// ─── Daily Lesson ────────────────────────────────────────────

/// Get the lesson assigned to the user for today.
async fn get_daily_lesson(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<LessonSummary>> {
    session_user(&state, &auth)?;

    let lesson = state.selector.select_for_today(today_utc()).await?;
    Ok(Json(lesson))
}

// ─── Completion ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CompleteRequest {
    /// Optional XP override; defaults to the catalog reward
    #[serde(default)]
    pub xp_reward: Option<u32>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub user: UserRecord,
    pub newly_completed: bool,
    pub xp_earned: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    pub message: String,
}

/// Mark a lesson complete and credit progression.
async fn complete_lesson(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(lesson_id): Path<String>,
    body: Option<Json<CompleteRequest>>,
) -> Result<Json<CompleteResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let outcome = state
        .workflow
        .complete(&auth.user_id, &lesson_id, request.xp_reward)
        .await?;

    Ok(Json(CompleteResponse {
        user: outcome.user,
        newly_completed: outcome.newly_completed,
        xp_earned: outcome.xp_earned,
        new_level: outcome.new_level,
        message: outcome.message,
    }))
}

// ─── Onboarding ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OnboardingRequest {
    pub selected_topics: Vec<String>,
}

/// Finish onboarding with the chosen topics.
async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Json<UserRecord>> {
    session_user(&state, &auth)?;

    if request.selected_topics.iter().any(|t| t.trim().is_empty()) {
        return Err(AppError::InvalidInput(
            "topic ids must be non-empty".to_string(),
        ));
    }

    let user = state
        .session
        .complete_onboarding(request.selected_topics)
        .await?;

    Ok(Json(user))
}
