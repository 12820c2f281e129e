// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore store backend with typed operations.
//!
//! Provides the store contracts over three collections:
//! - Users (profile + progression state)
//! - Lessons (content catalog)
//! - Lesson progress (per-user completion records)

use async_trait::async_trait;

use crate::db::{collections, ContentStore, ProfileStore, ProgressStore};
use crate::error::AppError;
use crate::models::{LessonProgress, LessonSummary, UserRecord};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::PersistenceFailed(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::PersistenceFailed(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Document ID for a progress record.
    ///
    /// Lesson IDs are caller-supplied, so encode them to keep the composite
    /// key unambiguous.
    fn progress_doc_id(user_id: &str, lesson_id: &str) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(user_id),
            urlencoding::encode(lesson_id)
        )
    }
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))
    }

    async fn upsert_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for FirestoreDb {
    async fn get_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::LESSON_PROGRESS)
            .obj()
            .one(&Self::progress_doc_id(user_id, lesson_id))
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))
    }

    async fn upsert_progress(&self, progress: &LessonProgress) -> Result<(), AppError> {
        let doc_id = Self::progress_doc_id(&progress.user_id, &progress.lesson_id);
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::LESSON_PROGRESS)
            .document_id(&doc_id)
            .object(progress)
            .execute()
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;
        Ok(())
    }

    async fn delete_progress(&self, user_id: &str, lesson_id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::LESSON_PROGRESS)
            .document_id(&Self::progress_doc_id(user_id, lesson_id))
            .execute()
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FirestoreDb {
    async fn list_lessons(&self) -> Result<Vec<LessonSummary>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::LESSONS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<LessonSummary>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::LESSONS)
            .obj()
            .one(lesson_id)
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))
    }

    async fn put_lesson(&self, lesson: &LessonSummary) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::LESSONS)
            .document_id(&lesson.id)
            .object(lesson)
            .execute()
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;
        Ok(())
    }
}
