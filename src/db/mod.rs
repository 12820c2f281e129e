//! Storage layer: store contracts plus Firestore and in-memory backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{LessonProgress, LessonSummary, UserRecord};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const LESSONS: &str = "lessons";
    /// Per-user lesson progress (keyed by `{user_id}_{lesson_id}`)
    pub const LESSON_PROGRESS: &str = "user_lesson_progress";
}

/// Profile persistence contract.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError>;

    /// Create or fully replace a user record (last writer wins).
    async fn upsert_user(&self, user: &UserRecord) -> Result<(), AppError>;
}

/// Lesson progress persistence contract.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>, AppError>;

    /// Create or replace the progress record for its `(user_id, lesson_id)` key.
    async fn upsert_progress(&self, progress: &LessonProgress) -> Result<(), AppError>;

    /// Remove the record for a key. Used only to roll back a failed completion.
    async fn delete_progress(&self, user_id: &str, lesson_id: &str) -> Result<(), AppError>;
}

/// Read-only lesson catalog contract.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_lessons(&self) -> Result<Vec<LessonSummary>, AppError>;

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<LessonSummary>, AppError>;

    /// Write a catalog entry (startup seeding only).
    async fn put_lesson(&self, lesson: &LessonSummary) -> Result<(), AppError>;
}
