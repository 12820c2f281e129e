// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store backend for tests and offline mode.
//!
//! Implements all three store contracts over `RwLock`ed maps. A write-failure
//! switch lets tests exercise the `PersistenceFailed` paths without a real
//! database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::db::{ContentStore, ProfileStore, ProgressStore};
use crate::error::AppError;
use crate::models::{LessonProgress, LessonSummary, UserRecord};

#[derive(Default)]
pub struct MemoryDb {
    users: RwLock<HashMap<String, UserRecord>>,
    progress: RwLock<HashMap<String, LessonProgress>>,
    lessons: RwLock<HashMap<String, LessonSummary>>,
    fail_writes: AtomicBool,
    fail_profile_writes: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory store pre-seeded with the builtin lesson catalog.
    pub fn with_builtin_catalog() -> Self {
        let db = Self::new();
        {
            let mut lessons = db.lessons.write().expect("lesson map poisoned");
            for lesson in crate::services::catalog::builtin_lessons() {
                lessons.insert(lesson.id.clone(), lesson);
            }
        }
        db
    }

    /// Make all subsequent writes fail with `PersistenceFailed`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make only profile writes fail, leaving progress and lesson writes
    /// working. Exercises mid-workflow failure paths.
    pub fn set_fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::PersistenceFailed(
                "write failure injected".to_string(),
            ));
        }
        Ok(())
    }

    fn progress_key(user_id: &str, lesson_id: &str) -> String {
        format!("{}_{}", user_id, lesson_id)
    }
}

#[async_trait]
impl ProfileStore for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .read()
            .expect("user map poisoned")
            .get(user_id)
            .cloned())
    }

    async fn upsert_user(&self, user: &UserRecord) -> Result<(), AppError> {
        self.check_writable()?;
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(AppError::PersistenceFailed(
                "profile write failure injected".to_string(),
            ));
        }
        self.users
            .write()
            .expect("user map poisoned")
            .insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for MemoryDb {
    async fn get_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>, AppError> {
        Ok(self
            .progress
            .read()
            .expect("progress map poisoned")
            .get(&Self::progress_key(user_id, lesson_id))
            .cloned())
    }

    async fn upsert_progress(&self, progress: &LessonProgress) -> Result<(), AppError> {
        self.check_writable()?;
        self.progress.write().expect("progress map poisoned").insert(
            Self::progress_key(&progress.user_id, &progress.lesson_id),
            progress.clone(),
        );
        Ok(())
    }

    async fn delete_progress(&self, user_id: &str, lesson_id: &str) -> Result<(), AppError> {
        self.check_writable()?;
        self.progress
            .write()
            .expect("progress map poisoned")
            .remove(&Self::progress_key(user_id, lesson_id));
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryDb {
    async fn list_lessons(&self) -> Result<Vec<LessonSummary>, AppError> {
        Ok(self
            .lessons
            .read()
            .expect("lesson map poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<LessonSummary>, AppError> {
        Ok(self
            .lessons
            .read()
            .expect("lesson map poisoned")
            .get(lesson_id)
            .cloned())
    }

    async fn put_lesson(&self, lesson: &LessonSummary) -> Result<(), AppError> {
        self.check_writable()?;
        self.lessons
            .write()
            .expect("lesson map poisoned")
            .insert(lesson.id.clone(), lesson.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_roundtrip() {
        let db = MemoryDb::new();
        let user = UserRecord::new("user-1", true);

        db.upsert_user(&user).await.unwrap();
        let loaded = db.get_user("user-1").await.unwrap().unwrap();

        assert_eq!(loaded.id, "user-1");
        assert!(db.get_user("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_progress_keyed_per_user_and_lesson() {
        let db = MemoryDb::new();
        let a = LessonProgress::new("user-1", "lesson-a").completed(10);
        let b = LessonProgress::new("user-2", "lesson-a").completed(10);

        db.upsert_progress(&a).await.unwrap();
        db.upsert_progress(&b).await.unwrap();

        assert!(db
            .get_progress("user-1", "lesson-a")
            .await
            .unwrap()
            .unwrap()
            .is_completed());
        assert!(db.get_progress("user-1", "lesson-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_failure_injection() {
        let db = MemoryDb::new();
        db.set_fail_writes(true);

        let err = db.upsert_user(&UserRecord::new("user-1", true)).await;
        assert!(matches!(err, Err(AppError::PersistenceFailed(_))));

        db.set_fail_writes(false);
        assert!(db.upsert_user(&UserRecord::new("user-1", true)).await.is_ok());
    }

    #[tokio::test]
    async fn test_builtin_catalog_seeded() {
        let db = MemoryDb::with_builtin_catalog();
        let lessons = db.list_lessons().await.unwrap();
        assert!(!lessons.is_empty());
        assert!(db
            .get_lesson("lesson-tech-001")
            .await
            .unwrap()
            .is_some());
    }
}
