//! Invitation storage trait.

use crate::error::Result;
use crate::model::{Invitation, Membership};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// An invitation by id, scoped to `org_id`.
    async fn find_invitation(&self, org_id: &str, id: &str) -> Result<Option<Invitation>>;

    /// An invitation by id alone, for the invitee's side.
    async fn find_invitation_by_id(&self, id: &str) -> Result<Option<Invitation>>;

    /// All invitations of an organization, in any status.
    async fn list_invitations(&self, org_id: &str) -> Result<Vec<Invitation>>;

    /// Insert `invitation` unless the address is already taken care of.
    ///
    /// Fails with `Conflict(ALREADY_MEMBER)` when an account with the
    /// invitation's email belongs to the organization, and
    /// `Conflict(INVITATION_EXISTS)` when a pending, unexpired invitation for
    /// the same (organization, email) exists at `now`. Both checks and the
    /// insert must be atomic with respect to other writers, including
    /// [`accept_invitation`](Self::accept_invitation): a transaction, or a
    /// partial unique index on pending rows plus a membership check in the
    /// same statement, is typical.
    async fn insert_invitation_if_no_pending(
        &self,
        invitation: &Invitation,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Reset an invitation to PENDING with a new expiry.
    ///
    /// Returns `None` when no such invitation exists in `org_id`. Fails with
    /// `Conflict(INVITATION_EXISTS)` if a different pending, unexpired
    /// invitation for the same email exists at `now`.
    async fn renew_invitation(
        &self,
        org_id: &str,
        id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>>;

    /// Mark an invitation CANCELLED. Returns `None` when it does not exist.
    async fn cancel_invitation(&self, org_id: &str, id: &str) -> Result<Option<Invitation>>;

    /// Mark the invitation ACCEPTED and create `membership`, atomically.
    ///
    /// Fails with `BadRequest(INVITATION_NOT_PENDING)` if the invitation is no
    /// longer pending and unexpired at `now`, and `Conflict(ALREADY_MEMBER)`
    /// if the user already belongs to the organization. Nothing is written
    /// on failure.
    async fn accept_invitation(
        &self,
        id: &str,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> Result<Invitation>;
}
