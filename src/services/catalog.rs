// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Builtin lesson catalog and startup seeding.
//!
//! The app ships a small catalog so a fresh deployment (or the in-memory
//! backend) has content before any editorial lessons land in the store.

use std::sync::Arc;

use futures_util::{stream, StreamExt};

use crate::db::ContentStore;
use crate::error::AppError;
use crate::models::{Difficulty, LessonSummary};

const MAX_CONCURRENT_SEED_WRITES: usize = 10;

fn lesson(
    id: &str,
    title: &str,
    topic_id: &str,
    category: &str,
    difficulty: Difficulty,
    xp_reward: u32,
    estimated_minutes: u32,
) -> LessonSummary {
    LessonSummary {
        id: id.to_string(),
        title: title.to_string(),
        topic_id: topic_id.to_string(),
        category: category.to_string(),
        difficulty,
        xp_reward,
        estimated_minutes,
    }
}

/// The builtin lesson set.
pub fn builtin_lessons() -> Vec<LessonSummary> {
    use Difficulty::{Advanced, Beginner, Intermediate};

    vec![
        lesson("lesson-tech-001", "What is Docker?", "topic-tech", "TECHNOLOGY", Beginner, 10, 1),
        lesson("lesson-tech-002", "Git Fundamentals", "topic-tech", "TECHNOLOGY", Beginner, 10, 1),
        lesson("lesson-tech-003", "REST API Design", "topic-tech", "TECHNOLOGY", Intermediate, 15, 2),
        lesson("lesson-tech-004", "TypeScript Types Mastery", "topic-tech", "TECHNOLOGY", Advanced, 20, 2),
        lesson("lesson-biz-001", "Understanding OKRs", "topic-biz", "BUSINESS", Beginner, 15, 2),
        lesson("lesson-biz-002", "Product Strategy Basics", "topic-biz", "BUSINESS", Intermediate, 15, 2),
        lesson("lesson-prod-001", "Time Blocking 101", "topic-prod", "PRODUCTIVITY", Beginner, 10, 1),
        lesson("lesson-prod-002", "The Two-Minute Rule", "topic-prod", "PRODUCTIVITY", Beginner, 10, 1),
        lesson("lesson-health-001", "The Power of Morning Routines", "topic-health", "HEALTH", Beginner, 10, 2),
        lesson("lesson-pd-001", "Growth Mindset vs Fixed Mindset", "topic-pd", "PERSONAL_DEVELOPMENT", Beginner, 12, 2),
        lesson("lesson-sci-001", "The Scientific Method", "topic-sci", "SCIENCE", Beginner, 12, 2),
        lesson("lesson-lang-001", "Language Learning Hacks", "topic-lang", "LANGUAGE", Beginner, 12, 2),
        lesson("lesson-fin-001", "Personal Finance 101", "topic-fin", "FINANCE", Beginner, 12, 2),
    ]
}

/// Seed the builtin catalog into an empty content store.
///
/// No-op when the store already has lessons. Writes run concurrently with a
/// bounded fan-out.
pub async fn seed_if_empty(store: &Arc<dyn ContentStore>) -> Result<usize, AppError> {
    if !store.list_lessons().await?.is_empty() {
        return Ok(0);
    }

    let lessons = builtin_lessons();
    let count = lessons.len();

    stream::iter(lessons)
        .map(|lesson| {
            let store = store.clone();
            async move { store.put_lesson(&lesson).await }
        })
        .buffer_unordered(MAX_CONCURRENT_SEED_WRITES)
        .collect::<Vec<Result<(), AppError>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<()>, AppError>>()?;

    tracing::info!(count, "Seeded builtin lesson catalog");

    Ok(count)
}
