// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily lesson selection.
//!
//! Selection is a pure function of the calendar date, the candidate set and
//! the user's topic preferences; no randomness, so a restart mid-day lands on
//! the same lesson. The chosen id is memoized on the user record together
//! with the selection date, and reused for the rest of that day even if the
//! catalog changes underneath.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{LessonSummary, ProfileUpdate, UserRecord};
use crate::services::session::SessionStore;
use crate::time_utils::day_of_year;

/// Pick the lesson for a date from a candidate catalog.
///
/// Candidates are filtered to the user's selected topics (falling back to the
/// full catalog when the filter empties it), sorted by id so catalog order
/// cannot change the outcome, and indexed by `day_of_year(date) % len`
/// (1-based day of year).
pub fn pick(
    catalog: &[LessonSummary],
    selected_topics: &[String],
    date: NaiveDate,
) -> Result<LessonSummary> {
    if catalog.is_empty() {
        return Err(AppError::NoContentAvailable);
    }

    let mut candidates: Vec<&LessonSummary> = if selected_topics.is_empty() {
        catalog.iter().collect()
    } else {
        let filtered: Vec<&LessonSummary> = catalog
            .iter()
            .filter(|lesson| selected_topics.contains(&lesson.topic_id))
            .collect();
        if filtered.is_empty() {
            catalog.iter().collect()
        } else {
            filtered
        }
    };

    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    let index = day_of_year(date) as usize % candidates.len();
    Ok(candidates[index].clone())
}

pub struct DailySelector {
    content: Arc<dyn ContentStore>,
    session: Arc<SessionStore>,
}

impl DailySelector {
    pub fn new(content: Arc<dyn ContentStore>, session: Arc<SessionStore>) -> Self {
        Self { content, session }
    }

    /// The lesson assigned to the bound user for `today`.
    ///
    /// Returns the memoized selection when one was already made today;
    /// otherwise selects, memoizes onto the user record (persisted through
    /// the session store) and returns it.
    pub async fn select_for_today(&self, today: NaiveDate) -> Result<LessonSummary> {
        let user = self.session.current().ok_or(AppError::NoActiveSession)?;

        if let Some(lesson) = self.cached_for(&user, today).await? {
            tracing::debug!(user_id = %user.id, lesson_id = %lesson.id, "Daily lesson from cache");
            return Ok(lesson);
        }

        let catalog = self.content.list_lessons().await?;
        let lesson = pick(&catalog, &user.selected_topics, today)?;

        self.session
            .update(ProfileUpdate {
                cached_daily_lesson_id: Some(lesson.id.clone()),
                daily_lesson_date: Some(today),
                ..Default::default()
            })
            .await?;

        tracing::info!(user_id = %user.id, lesson_id = %lesson.id, "Daily lesson selected");

        Ok(lesson)
    }

    /// Resolve the memoized lesson if it was selected for `today`.
    ///
    /// A memoized id that no longer resolves in the catalog falls through to
    /// reselection.
    async fn cached_for(
        &self,
        user: &UserRecord,
        today: NaiveDate,
    ) -> Result<Option<LessonSummary>> {
        if user.daily_lesson_date != Some(today) {
            return Ok(None);
        }
        let Some(ref lesson_id) = user.cached_daily_lesson_id else {
            return Ok(None);
        };
        self.content.get_lesson(lesson_id).await
    }
}
