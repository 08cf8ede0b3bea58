//! Active-organization session binding.

use tracing::{debug, info, instrument};

use crate::error::{BulkheadError, Result};
use crate::model::{Identity, OrganizationSummary};
use crate::store::{ActiveOrganizationBinding, IdentityStore, OrganizationStore, SessionStore};

/// Records which organization a session is working in.
///
/// Only the session presented with the request is touched; other sessions of
/// the same user keep their own active organization.
#[derive(Clone)]
pub struct ActiveOrganizationBinder<S> {
    store: S,
}

impl<S: IdentityStore> ActiveOrganizationBinder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Make `org_id` the active organization of the caller's session.
    ///
    /// `token` is the credential the request carried. A missing token, or one
    /// that no longer matches a session of `caller`, fails as unauthorized.
    /// Membership is checked by the store in the same write that binds the
    /// session; on any failure every session is left unchanged.
    #[instrument(skip(self, caller, token), fields(user_id = %caller.id))]
    pub async fn switch(
        &self,
        caller: &Identity,
        token: Option<&str>,
        org_id: &str,
    ) -> Result<OrganizationSummary> {
        let org = self
            .store
            .find_organization(org_id)
            .await?
            .ok_or_else(|| BulkheadError::org_not_found(org_id))?;

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(BulkheadError::Unauthenticated);
        };

        match self
            .store
            .bind_active_organization(token, &caller.id, org_id)
            .await?
        {
            ActiveOrganizationBinding::Bound => {}
            ActiveOrganizationBinding::NotMember => {
                debug!(org_id, "Caller is not a member");
                return Err(BulkheadError::not_member());
            }
            ActiveOrganizationBinding::SessionNotFound => {
                debug!(org_id, "No session matched token and user");
                return Err(BulkheadError::session_not_found());
            }
        }

        info!(org_id, "Active organization switched");
        Ok(org.summary())
    }
}
