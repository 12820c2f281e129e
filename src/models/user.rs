//! User record model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time_utils::now_rfc3339;

/// User profile and progression state stored in Firestore.
///
/// `level` is derived from `xp` (`xp / 100 + 1`) and is never written
/// independently; `longest_streak >= current_streak` holds at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque identity ID (also used as document ID)
    pub id: String,
    /// Whether the identity was created anonymously
    pub is_anonymous: bool,
    /// Total experience points
    pub xp: u32,
    /// Derived level (xp / 100 + 1)
    pub level: u32,
    /// Consecutive calendar days with at least one completion
    pub current_streak: u32,
    /// Best streak ever reached
    pub longest_streak: u32,
    /// Completions credited, exactly once per (user, lesson)
    pub total_lessons_completed: u32,
    /// First-run onboarding finished; never reverts to false
    pub onboarding_complete: bool,
    /// Topic IDs chosen during onboarding (may be empty)
    #[serde(default)]
    pub selected_topics: Vec<String>,
    /// Calendar date of the most recent completion
    #[serde(default)]
    pub last_completion_date: Option<NaiveDate>,
    /// Lesson already selected for `daily_lesson_date`
    #[serde(default)]
    pub cached_daily_lesson_id: Option<String>,
    /// Date the cached daily lesson was selected for
    #[serde(default)]
    pub daily_lesson_date: Option<NaiveDate>,
    /// Local-notification reminders enabled (scheduling is external)
    #[serde(default)]
    pub notifications_enabled: bool,
    /// Preferred reminder time, "HH:mm"
    #[serde(default)]
    pub notification_time: Option<String>,
    /// When the profile was created (RFC3339)
    pub created_at: String,
    /// Last profile update (RFC3339)
    pub updated_at: String,
}

impl UserRecord {
    /// Fresh profile for a newly authenticated identity.
    pub fn new(id: impl Into<String>, is_anonymous: bool) -> Self {
        let now = now_rfc3339();
        Self {
            id: id.into(),
            is_anonymous,
            xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            total_lessons_completed: 0,
            onboarding_complete: false,
            selected_topics: Vec::new(),
            last_completion_date: None,
            cached_daily_lesson_id: None,
            daily_lesson_date: None,
            notifications_enabled: true,
            notification_time: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial profile update merged into the current record.
///
/// Only `Some` fields are applied. `onboarding_complete` can only move to
/// true; a `Some(false)` is ignored once onboarding has finished.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lessons_completed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completion_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_daily_lesson_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_lesson_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<String>,
}

impl ProfileUpdate {
    /// Apply this partial update to a record, refreshing `updated_at`.
    pub fn apply_to(&self, user: &UserRecord) -> UserRecord {
        let mut updated = user.clone();
        if let Some(xp) = self.xp {
            updated.xp = xp;
        }
        if let Some(level) = self.level {
            updated.level = level;
        }
        if let Some(v) = self.current_streak {
            updated.current_streak = v;
        }
        if let Some(v) = self.longest_streak {
            updated.longest_streak = v;
        }
        if let Some(v) = self.total_lessons_completed {
            updated.total_lessons_completed = v;
        }
        if let Some(v) = self.onboarding_complete {
            // Onboarding completion is a one-way latch.
            updated.onboarding_complete = updated.onboarding_complete || v;
        }
        if let Some(ref v) = self.selected_topics {
            updated.selected_topics = v.clone();
        }
        if let Some(v) = self.last_completion_date {
            updated.last_completion_date = Some(v);
        }
        if let Some(ref v) = self.cached_daily_lesson_id {
            updated.cached_daily_lesson_id = Some(v.clone());
        }
        if let Some(v) = self.daily_lesson_date {
            updated.daily_lesson_date = Some(v);
        }
        if let Some(v) = self.notifications_enabled {
            updated.notifications_enabled = v;
        }
        if let Some(ref v) = self.notification_time {
            updated.notification_time = Some(v.clone());
        }
        updated.updated_at = now_rfc3339();
        updated
    }
}
