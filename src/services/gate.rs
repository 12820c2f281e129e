// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access gate: authorizes entry into the onboarding or main flow.
//!
//! Each evaluation waits once for the session store's auth-ready barrier,
//! then consults a single session snapshot. There is no standing
//! subscription and no re-evaluation mid-navigation, so a decision can never
//! be made from a stale pre-auth state or flip while a navigation is in
//! flight.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::session::SessionStore;

/// Navigation flows guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Onboarding,
    Main,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    Redirect { target: Flow },
}

pub struct AccessGate {
    session: Arc<SessionStore>,
}

impl AccessGate {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Authorize entry into `flow`.
    ///
    /// Suspends until the first auth settle, then decides from exactly one
    /// session snapshot:
    /// - no user, or onboarding unfinished: onboarding allowed, main redirects
    ///   to onboarding;
    /// - onboarding finished: main allowed, onboarding redirects to main.
    pub async fn evaluate(&self, flow: Flow) -> Result<GateDecision> {
        self.session.auth_ready().await?;

        let onboarded = self
            .session
            .current()
            .map(|user| user.onboarding_complete)
            .unwrap_or(false);

        let decision = match (flow, onboarded) {
            (Flow::Onboarding, false) => GateDecision::Allow,
            (Flow::Onboarding, true) => GateDecision::Redirect { target: Flow::Main },
            (Flow::Main, true) => GateDecision::Allow,
            (Flow::Main, false) => GateDecision::Redirect {
                target: Flow::Onboarding,
            },
        };

        tracing::debug!(?flow, ?decision, "Gate evaluated");

        Ok(decision)
    }
}
