// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod gate;
pub mod progression;
pub mod selector;
pub mod session;
pub mod workflow;

pub use gate::{AccessGate, Flow, GateDecision};
pub use selector::DailySelector;
pub use session::{Identity, SessionSnapshot, SessionState, SessionStore};
pub use workflow::{CompletionOutcome, CompletionWorkflow};
