// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod lesson;
pub mod user;

pub use lesson::{Difficulty, LessonProgress, LessonSummary, ProgressStatus};
pub use user::{ProfileUpdate, UserRecord};
