//! Membership storage trait.

use crate::error::Result;
use crate::model::Membership;
use async_trait::async_trait;

/// Outcome of a guarded membership removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MembershipRemoval {
    Removed(Membership),
    NotFound,
    /// The membership is the organization's only owner; nothing was deleted.
    LastOwner,
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// The membership binding `user_id` to `org_id`, if any.
    async fn find_membership(&self, org_id: &str, user_id: &str) -> Result<Option<Membership>>;

    /// A membership by its own id, scoped to `org_id`.
    async fn find_membership_by_id(
        &self,
        org_id: &str,
        member_id: &str,
    ) -> Result<Option<Membership>>;

    async fn list_memberships(&self, org_id: &str) -> Result<Vec<Membership>>;

    async fn count_memberships(&self, org_id: &str) -> Result<usize> {
        Ok(self.list_memberships(org_id).await?.len())
    }

    /// Insert a membership.
    ///
    /// At most one membership exists per (user, organization); a second one
    /// fails with `Conflict(ALREADY_MEMBER)`.
    async fn create_membership(&self, membership: &Membership) -> Result<()>;

    /// Delete a membership unless it is the organization's last owner.
    ///
    /// The owner count and the delete must observe the same snapshot: run
    /// them in one transaction (or under one lock), so that two concurrent
    /// removals of different owners cannot both succeed when only two exist.
    async fn remove_membership_unless_last_owner(
        &self,
        org_id: &str,
        member_id: &str,
    ) -> Result<MembershipRemoval>;
}
