//! Session verification service.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::Result;
use crate::store::SessionStore;

/// A session the verification service vouches for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedSession {
    pub token: String,
    pub user_id: String,
    pub active_organization_id: Option<String>,
}

/// Turns a credential token into a live session, or nothing.
///
/// Implement this to plug in an external session service. Return `Ok(None)`
/// for unknown, revoked or expired tokens; reserve `Err` for failures of the
/// service itself.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Option<VerifiedSession>>;
}

/// Verifies tokens against the session table of the identity store.
#[derive(Clone)]
pub struct StoreSessionVerifier<S> {
    store: S,
}

impl<S: SessionStore> StoreSessionVerifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: SessionStore> SessionVerifier for StoreSessionVerifier<S> {
    async fn verify(&self, token: &str) -> Result<Option<VerifiedSession>> {
        let Some(session) = self.store.find_session(token).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            debug!(user_id = %session.user_id, "Session expired");
            return Ok(None);
        }

        Ok(Some(VerifiedSession {
            token: session.token,
            user_id: session.user_id,
            active_organization_id: session.active_organization_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Session;
    use crate::store::InMemoryStore;
    use chrono::Duration;

    #[tokio::test]
    async fn test_verifies_live_session() {
        let store = InMemoryStore::new();
        let session = store.issue_session("alice").await;
        let verifier = StoreSessionVerifier::new(store);

        let verified = verifier.verify(&session.token).await.unwrap().unwrap();
        assert_eq!(verified.user_id, "alice");
        assert_eq!(verified.token, session.token);
    }

    #[tokio::test]
    async fn test_unknown_and_expired_sessions_are_none() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .insert_session(Session {
                token: "stale".to_string(),
                user_id: "alice".to_string(),
                active_organization_id: None,
                created_at: now - Duration::days(2),
                expires_at: now - Duration::days(1),
            })
            .await;
        let verifier = StoreSessionVerifier::new(store);

        assert!(verifier.verify("missing").await.unwrap().is_none());
        assert!(verifier.verify("stale").await.unwrap().is_none());
    }
}
