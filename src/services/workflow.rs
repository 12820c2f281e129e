// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion workflow: credits a finished lesson exactly once.
//!
//! The read-modify-write over the user record is serialized per user through
//! a lock map; concurrent completions for different users proceed in
//! parallel. Idempotence is per `(user, lesson)` key: re-completing an
//! already-completed lesson is a no-op, and a failed persist rolls the
//! progress record back so the whole operation can be retried safely.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::db::{ContentStore, ProgressStore};
use crate::error::{AppError, Result};
use crate::models::{LessonProgress, ProfileUpdate, UserRecord};
use crate::services::progression;
use crate::services::session::SessionStore;
use crate::time_utils::{classify_streak_day, today_utc};

/// Result of a completion attempt.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// User record after the attempt (unchanged for a repeat completion)
    pub user: UserRecord,
    /// False when the lesson had already been completed
    pub newly_completed: bool,
    /// XP credited by this call (0 for a repeat)
    pub xp_earned: u32,
    /// New level when this completion crossed a boundary
    pub new_level: Option<u32>,
    /// Display message for the completion toast
    pub message: String,
}

pub struct CompletionWorkflow {
    session: Arc<SessionStore>,
    progress: Arc<dyn ProgressStore>,
    content: Arc<dyn ContentStore>,
    /// One lock per user id; completions for a user never interleave.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CompletionWorkflow {
    pub fn new(
        session: Arc<SessionStore>,
        progress: Arc<dyn ProgressStore>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            session,
            progress,
            content,
            locks: DashMap::new(),
        }
    }

    /// Complete `lesson_id` for `user_id` today.
    ///
    /// `xp_reward` overrides the catalog reward when given; it must be
    /// positive.
    pub async fn complete(
        &self,
        user_id: &str,
        lesson_id: &str,
        xp_reward: Option<u32>,
    ) -> Result<CompletionOutcome> {
        self.complete_on(user_id, lesson_id, xp_reward, today_utc())
            .await
    }

    /// `complete` with an explicit calendar date.
    pub async fn complete_on(
        &self,
        user_id: &str,
        lesson_id: &str,
        xp_reward: Option<u32>,
        today: NaiveDate,
    ) -> Result<CompletionOutcome> {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Snapshot the session *after* acquiring the lock so an earlier
        // completion's update is visible here.
        let user = self
            .session
            .current()
            .filter(|user| user.id == user_id)
            .ok_or(AppError::NoActiveSession)?;

        let lesson = self
            .content
            .get_lesson(lesson_id)
            .await?
            .ok_or_else(|| AppError::UnknownLesson(lesson_id.to_string()))?;

        let xp_earned = xp_reward.unwrap_or(lesson.xp_reward);
        if xp_earned == 0 {
            return Err(AppError::InvalidInput(format!(
                "xp reward for lesson {} must be positive",
                lesson_id
            )));
        }

        // Idempotence: an already-completed key is a no-op.
        let prior = self.progress.get_progress(user_id, lesson_id).await?;
        if prior.as_ref().is_some_and(|p| p.is_completed()) {
            tracing::debug!(user_id, lesson_id, "Lesson already completed (idempotent skip)");
            return Ok(CompletionOutcome {
                newly_completed: false,
                xp_earned: 0,
                new_level: None,
                message: "Already completed".to_string(),
                user,
            });
        }

        let completed = prior
            .clone()
            .unwrap_or_else(|| LessonProgress::new(user_id, lesson_id))
            .completed(xp_earned);
        self.progress.upsert_progress(&completed).await?;

        let day = classify_streak_day(user.last_completion_date, today);
        let updated = progression::apply_completion(&user, xp_earned, day);

        let persisted = self
            .session
            .update(ProfileUpdate {
                xp: Some(updated.xp),
                level: Some(updated.level),
                current_streak: Some(updated.current_streak),
                longest_streak: Some(updated.longest_streak),
                total_lessons_completed: Some(updated.total_lessons_completed),
                last_completion_date: Some(today),
                cached_daily_lesson_id: Some(lesson_id.to_string()),
                daily_lesson_date: Some(today),
                ..Default::default()
            })
            .await;

        let persisted = match persisted {
            Ok(user) => user,
            Err(err) => {
                // Undo the progress write so a retry re-runs the whole
                // operation instead of hitting the idempotent skip.
                self.rollback_progress(user_id, lesson_id, prior).await;
                return Err(err);
            }
        };

        let new_level =
            progression::leveled_up(user.xp, persisted.xp).then_some(persisted.level);

        tracing::info!(
            user_id,
            lesson_id,
            xp_earned,
            level = persisted.level,
            streak = persisted.current_streak,
            "Lesson completed"
        );

        Ok(CompletionOutcome {
            message: progression::completion_message(
                xp_earned,
                persisted.current_streak,
                new_level,
            ),
            user: persisted,
            newly_completed: true,
            xp_earned,
            new_level,
        })
    }

    async fn rollback_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        prior: Option<LessonProgress>,
    ) {
        let result = match prior {
            Some(record) => self.progress.upsert_progress(&record).await,
            None => self.progress.delete_progress(user_id, lesson_id).await,
        };
        if let Err(err) = result {
            tracing::error!(
                user_id,
                lesson_id,
                error = %err,
                "Progress rollback failed; record may show completed without credit"
            );
        }
    }
}
