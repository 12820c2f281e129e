// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Lesson-Tracker: progress tracking and content gating for a daily
//! micro-learning habit.
//!
//! This crate decides which flow a user may enter (first-run onboarding vs.
//! the main experience) and tracks XP, levels, completion streaks and the
//! one lesson assigned per calendar day.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::{ContentStore, ProfileStore, ProgressStore};
use services::{AccessGate, CompletionWorkflow, DailySelector, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub gate: AccessGate,
    pub selector: DailySelector,
    pub workflow: CompletionWorkflow,
}

impl AppState {
    /// Wire the engine over the given store backends.
    pub fn new(
        config: Config,
        profiles: Arc<dyn ProfileStore>,
        progress: Arc<dyn ProgressStore>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(profiles));
        let gate = AccessGate::new(session.clone());
        let selector = DailySelector::new(content.clone(), session.clone());
        let workflow = CompletionWorkflow::new(session.clone(), progress, content);

        Self {
            config,
            session,
            gate,
            selector,
            workflow,
        }
    }
}
