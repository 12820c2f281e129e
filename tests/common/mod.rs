// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use lesson_tracker::config::Config;
use lesson_tracker::db::{ContentStore, MemoryDb, ProfileStore, ProgressStore};
use lesson_tracker::services::session::Identity;
use lesson_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test app over an in-memory store seeded with the builtin catalog.
#[allow(dead_code)]
pub fn test_state() -> (Arc<MemoryDb>, Arc<AppState>) {
    let db = Arc::new(MemoryDb::with_builtin_catalog());
    let state = Arc::new(AppState::new(
        Config::test_default(),
        db.clone() as Arc<dyn ProfileStore>,
        db.clone() as Arc<dyn ProgressStore>,
        db.clone() as Arc<dyn ContentStore>,
    ));
    (db, state)
}

/// Test app with a session already bound to `user_id`.
#[allow(dead_code)]
pub async fn bound_state(user_id: &str) -> (Arc<MemoryDb>, Arc<AppState>) {
    let (db, state) = test_state();
    state
        .session
        .on_auth_event(Some(Identity {
            id: user_id.to_string(),
            is_anonymous: true,
        }))
        .await
        .expect("Failed to bind test session");
    (db, state)
}
