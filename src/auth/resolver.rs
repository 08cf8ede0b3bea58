//! Session-to-identity resolution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::credentials::RequestContext;
use super::guards::Authorizer;
use super::verifier::{SessionVerifier, VerifiedSession};
use crate::error::{BulkheadError, Result};
use crate::model::Identity;
use crate::store::UserStore;

/// An authenticated caller together with the session it presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub identity: Identity,
    pub session: VerifiedSession,
}

/// Resolves the request credential to a verified [`Identity`].
///
/// The session service only vouches for the user id. Role, verification flag
/// and ban state are re-read from the user store on every call so that a role
/// change or a ban takes effect on the very next request.
///
/// Every failure surfaces as [`BulkheadError::Unauthenticated`]; the reason
/// is only logged.
pub struct SessionResolver<U> {
    verifier: Arc<dyn SessionVerifier>,
    users: U,
}

impl<U: Clone> Clone for SessionResolver<U> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            users: self.users.clone(),
        }
    }
}

impl<U: UserStore> SessionResolver<U> {
    pub fn new(verifier: Arc<dyn SessionVerifier>, users: U) -> Self {
        Self { verifier, users }
    }

    pub async fn resolve(&self, ctx: &RequestContext) -> Result<Principal> {
        let Some(token) = ctx.credential() else {
            debug!("No session credential on request");
            return Err(BulkheadError::Unauthenticated);
        };

        let Some(session) = self.verifier.verify(token).await? else {
            debug!("Session token unknown or expired");
            return Err(BulkheadError::Unauthenticated);
        };

        let Some(user) = self.users.find_user(&session.user_id).await? else {
            debug!(user_id = %session.user_id, "Session refers to a missing user");
            return Err(BulkheadError::Unauthenticated);
        };

        if user.banned {
            debug!(user_id = %user.id, "Session belongs to a banned account");
            return Err(BulkheadError::Unauthenticated);
        }

        Ok(Principal {
            identity: user.identity(),
            session,
        })
    }
}

#[async_trait]
impl<U: UserStore> Authorizer for SessionResolver<U> {
    type Output = Principal;

    async fn evaluate(&self, ctx: &RequestContext) -> Result<Principal> {
        self.resolve(ctx).await
    }
}
