//! Lesson catalog and per-user progress models.

use serde::{Deserialize, Serialize};

use crate::time_utils::now_rfc3339;

/// Lesson difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Read-only catalog entry supplied by the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSummary {
    /// Lesson ID (also used as document ID)
    pub id: String,
    /// Display title
    pub title: String,
    /// Topic this lesson belongs to (matched against onboarding selections)
    pub topic_id: String,
    /// Category label, e.g. "TECHNOLOGY"
    pub category: String,
    pub difficulty: Difficulty,
    /// XP earned on completion; always positive
    pub xp_reward: u32,
    /// Rough reading time
    pub estimated_minutes: u32,
}

/// Completion status of a lesson for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Per-user lesson progress, keyed by `(user_id, lesson_id)`.
///
/// At most one `Completed` record exists per key; completion is an upsert,
/// so re-completing a lesson never double-credits XP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
    pub user_id: String,
    pub lesson_id: String,
    pub status: ProgressStatus,
    pub xp_earned: u32,
    /// Set when `status` becomes `Completed` (RFC3339)
    #[serde(default)]
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl LessonProgress {
    /// Fresh, not-started progress record.
    pub fn new(user_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        let now = now_rfc3339();
        Self {
            user_id: user_id.into(),
            lesson_id: lesson_id.into(),
            status: ProgressStatus::NotStarted,
            xp_earned: 0,
            completed_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Completed copy of this record crediting `xp_earned`.
    pub fn completed(&self, xp_earned: u32) -> Self {
        let now = now_rfc3339();
        Self {
            status: ProgressStatus::Completed,
            xp_earned,
            completed_at: Some(now.clone()),
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_starts_not_started() {
        let progress = LessonProgress::new("user-1", "lesson-tech-001");
        assert_eq!(progress.status, ProgressStatus::NotStarted);
        assert_eq!(progress.xp_earned, 0);
        assert!(progress.completed_at.is_none());
    }

    #[test]
    fn test_completed_sets_status_and_xp() {
        let progress = LessonProgress::new("user-1", "lesson-tech-001").completed(10);
        assert!(progress.is_completed());
        assert_eq!(progress.xp_earned, 10);
        assert!(progress.completed_at.is_some());
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Intermediate).unwrap();
        assert_eq!(json, "\"intermediate\"");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProgressStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }
}
