//! Membership listing and removal.

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::error::{BulkheadError, Result};
use crate::model::{MemberView, Membership};
use crate::store::{IdentityStore, MembershipRemoval, MembershipStore, UserStore};

/// Membership manager.
///
/// Removal goes through the store's guarded delete, so an organization never
/// drops to zero owners even under concurrent removals.
#[derive(Clone)]
pub struct MembershipManager<S> {
    store: S,
}

impl<S: IdentityStore> MembershipManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Members of an organization with their account summaries.
    pub async fn list(&self, org_id: &str) -> Result<Vec<MemberView>> {
        let memberships = self.store.list_memberships(org_id).await?;
        let mut users = HashMap::with_capacity(memberships.len());
        for membership in &memberships {
            if let Some(user) = self.store.find_user(&membership.user_id).await? {
                users.insert(user.id.clone(), user.summary());
            }
        }

        Ok(memberships
            .into_iter()
            .map(|membership| MemberView {
                user: users.get(&membership.user_id).cloned(),
                membership,
            })
            .collect())
    }

    /// Remove a membership by id.
    ///
    /// Removing the sole owner fails with `LAST_OWNER` and deletes nothing.
    #[instrument(skip(self))]
    pub async fn remove(&self, org_id: &str, member_id: &str) -> Result<Membership> {
        match self
            .store
            .remove_membership_unless_last_owner(org_id, member_id)
            .await?
        {
            MembershipRemoval::Removed(membership) => {
                info!(
                    org_id,
                    member_id,
                    user_id = %membership.user_id,
                    role = %membership.role,
                    "Member removed"
                );
                Ok(membership)
            }
            MembershipRemoval::NotFound => Err(BulkheadError::member_not_found(member_id)),
            MembershipRemoval::LastOwner => {
                debug!(org_id, member_id, "Refusing to remove the last owner");
                Err(BulkheadError::last_owner())
            }
        }
    }
}
