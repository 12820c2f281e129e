// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: authoritative in-memory copy of the current user record.
//!
//! Owns the auth-ready barrier and publishes every state change through a
//! watch channel. Mutations persist through the profile store *before* the
//! new state is published, so subscribers never observe state that outruns
//! durable storage.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::db::ProfileStore;
use crate::error::{AppError, Result};
use crate::models::{ProfileUpdate, UserRecord};

/// An authenticated identity reported by the identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub is_anonymous: bool,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            is_anonymous: true,
        }
    }
}

/// Session lifecycle states.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No auth event received yet
    Unbound,
    /// Auth event received, profile fetch in flight
    Loading,
    /// Profile loaded or freshly created
    Bound(UserRecord),
    /// Explicit sign-out
    SignedOut,
}

/// Published session snapshot: state plus the latch-once auth-ready flag.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Set once, at the end of the first auth settle (success or failure),
    /// and never reset for the lifetime of the store.
    pub auth_ready: bool,
    pub state: SessionState,
}

pub struct SessionStore {
    profiles: Arc<dyn ProfileStore>,
    tx: watch::Sender<SessionSnapshot>,
    /// Serializes mutations so publish order matches persist order.
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot {
            auth_ready: false,
            state: SessionState::Unbound,
        });
        Self {
            profiles,
            tx,
            write_lock: Mutex::new(()),
        }
    }

    /// Handle an identity event from the auth subsystem.
    ///
    /// `Some(identity)` fetches the matching profile, auto-creating one on
    /// first sign-in; `None` is a sign-out. Either path latches `auth_ready`
    /// afterward, including when the profile fetch fails.
    pub async fn on_auth_event(&self, identity: Option<Identity>) -> Result<Option<UserRecord>> {
        let _guard = self.write_lock.lock().await;

        let Some(identity) = identity else {
            self.publish(SessionState::SignedOut);
            self.latch_ready();
            return Ok(None);
        };

        self.publish(SessionState::Loading);

        let result = self.fetch_or_create(&identity).await;
        match result {
            Ok(user) => {
                self.publish(SessionState::Bound(user.clone()));
                self.latch_ready();
                Ok(Some(user))
            }
            Err(err) => {
                tracing::error!(user_id = %identity.id, error = %err, "Profile load failed");
                self.publish(SessionState::SignedOut);
                self.latch_ready();
                Err(err)
            }
        }
    }

    async fn fetch_or_create(&self, identity: &Identity) -> Result<UserRecord> {
        if let Some(user) = self.profiles.get_user(&identity.id).await? {
            tracing::debug!(user_id = %identity.id, "Profile loaded");
            return Ok(user);
        }

        let user = UserRecord::new(identity.id.clone(), identity.is_anonymous);
        self.profiles.upsert_user(&user).await?;
        tracing::info!(user_id = %identity.id, "Profile created on first sign-in");
        Ok(user)
    }

    /// Synchronous snapshot of the bound user, if any. Never blocks.
    pub fn current(&self) -> Option<UserRecord> {
        match &self.tx.borrow().state {
            SessionState::Bound(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Whether the first auth settle has happened.
    pub fn is_auth_ready(&self) -> bool {
        self.tx.borrow().auth_ready
    }

    /// One-shot barrier: resolves once `auth_ready` is latched.
    ///
    /// Cancellation-safe; dropping the future unregisters the waiter.
    pub async fn auth_ready(&self) -> Result<()> {
        let mut rx = self.tx.subscribe();
        rx.wait_for(|snapshot| snapshot.auth_ready)
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session store closed")))?;
        Ok(())
    }

    /// Subscribe to session changes. Each subscriber sees updates in publish
    /// order; delivery across subscribers is unordered.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Merge a partial update into the bound record, persist, republish.
    pub async fn update(&self, partial: ProfileUpdate) -> Result<UserRecord> {
        let _guard = self.write_lock.lock().await;

        let user = self.current().ok_or(AppError::NoActiveSession)?;
        let merged = partial.apply_to(&user);

        // Durable first, visible second.
        self.profiles.upsert_user(&merged).await?;
        self.publish(SessionState::Bound(merged.clone()));

        Ok(merged)
    }

    /// Record onboarding completion with the chosen topics.
    pub async fn complete_onboarding(&self, topics: Vec<String>) -> Result<UserRecord> {
        let user = self
            .update(ProfileUpdate {
                onboarding_complete: Some(true),
                selected_topics: Some(topics),
                ..Default::default()
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            topics = user.selected_topics.len(),
            "Onboarding complete"
        );

        Ok(user)
    }

    fn publish(&self, state: SessionState) {
        self.tx.send_modify(|snapshot| snapshot.state = state);
    }

    fn latch_ready(&self) {
        self.tx.send_modify(|snapshot| snapshot.auth_ready = true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn store_with_db() -> (Arc<MemoryDb>, SessionStore) {
        let db = Arc::new(MemoryDb::new());
        let session = SessionStore::new(db.clone() as Arc<dyn ProfileStore>);
        (db, session)
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_profile() {
        let (db, session) = store_with_db();

        let identity = Identity::anonymous();
        let user = session
            .on_auth_event(Some(identity.clone()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.id, identity.id);
        assert!(!user.onboarding_complete);
        assert!(session.is_auth_ready());
        // Persisted before published
        assert!(db.get_user(&identity.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_existing_profile_is_loaded_not_recreated() {
        let (db, session) = store_with_db();

        let mut existing = UserRecord::new("user-1", true);
        existing.xp = 120;
        existing.level = 2;
        db.upsert_user(&existing).await.unwrap();

        let user = session
            .on_auth_event(Some(Identity {
                id: "user-1".to_string(),
                is_anonymous: true,
            }))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.xp, 120);
        assert_eq!(user.level, 2);
    }

    #[tokio::test]
    async fn test_sign_out_latches_ready_with_no_user() {
        let (_, session) = store_with_db();

        session.on_auth_event(None).await.unwrap();

        assert!(session.is_auth_ready());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_auth_ready_latches_even_on_profile_failure() {
        let db = Arc::new(MemoryDb::new());
        db.set_fail_writes(true);
        let session = SessionStore::new(db.clone() as Arc<dyn ProfileStore>);

        let result = session.on_auth_event(Some(Identity::anonymous())).await;

        assert!(result.is_err());
        assert!(session.is_auth_ready());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_update_requires_active_session() {
        let (_, session) = store_with_db();

        let err = session.update(ProfileUpdate::default()).await;
        assert!(matches!(err, Err(AppError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_update_persists_before_publishing() {
        let (db, session) = store_with_db();
        session
            .on_auth_event(Some(Identity {
                id: "user-1".to_string(),
                is_anonymous: true,
            }))
            .await
            .unwrap();

        // A failed persist must not change the published state.
        db.set_fail_writes(true);
        let err = session
            .update(ProfileUpdate {
                xp: Some(999),
                ..Default::default()
            })
            .await;
        assert!(matches!(err, Err(AppError::PersistenceFailed(_))));
        assert_eq!(session.current().unwrap().xp, 0);

        db.set_fail_writes(false);
        let updated = session
            .update(ProfileUpdate {
                xp: Some(50),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.xp, 50);
        assert_eq!(db.get_user("user-1").await.unwrap().unwrap().xp, 50);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates_in_order() {
        let (_, session) = store_with_db();
        let mut rx = session.subscribe();

        session
            .on_auth_event(Some(Identity {
                id: "user-1".to_string(),
                is_anonymous: true,
            }))
            .await
            .unwrap();

        // The receiver coalesces to the latest value; after the auth event it
        // must land on a ready, bound snapshot.
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.auth_ready);
        assert!(matches!(snapshot.state, SessionState::Bound(_)));
    }

    #[tokio::test]
    async fn test_auth_ready_barrier_releases_pending_waiter() {
        let (_, session) = store_with_db();
        let session = Arc::new(session);

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.auth_ready().await })
        };

        // Give the waiter a chance to park before the event arrives.
        tokio::task::yield_now().await;
        session.on_auth_event(None).await.unwrap();

        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_complete_onboarding_sets_topics_and_latch() {
        let (_, session) = store_with_db();
        session
            .on_auth_event(Some(Identity::anonymous()))
            .await
            .unwrap();

        let user = session
            .complete_onboarding(vec!["topic-tech".to_string(), "topic-fin".to_string()])
            .await
            .unwrap();

        assert!(user.onboarding_complete);
        assert_eq!(user.selected_topics.len(), 2);
    }
}
