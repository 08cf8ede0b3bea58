//! Session storage trait.

use crate::error::Result;
use crate::model::Session;
use async_trait::async_trait;

/// Outcome of a conditional active-organization bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveOrganizationBinding {
    Bound,
    /// The user holds no membership in the organization; nothing was written.
    NotMember,
    /// No session matched both token and user; nothing was written.
    SessionNotFound,
}

/// Sessions are created at sign-in, outside this crate; the access-control
/// layer only reads them and binds the active organization.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(&self, token: &str) -> Result<Option<Session>>;

    /// Set `active_organization_id` on the session matching both `token` and
    /// `user_id`, provided `user_id` is a member of `org_id`.
    ///
    /// The membership check and the write must observe the same snapshot, so
    /// a concurrent removal cannot leave the session bound to an organization
    /// the user has left. Never touches other sessions of the same user.
    async fn bind_active_organization(
        &self,
        token: &str,
        user_id: &str,
        org_id: &str,
    ) -> Result<ActiveOrganizationBinding>;
}
