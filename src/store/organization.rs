//! Organization storage trait.

use crate::error::Result;
use crate::model::{Membership, Organization};
use async_trait::async_trait;

/// Field-level changes to an organization.
///
/// `None` leaves a field as stored; `Some(None)` clears an optional one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<Option<String>>,
    pub metadata: Option<Option<serde_json::Value>>,
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_organization(&self, id: &str) -> Result<Option<Organization>>;

    async fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>>;

    /// Insert a new organization, optionally together with its first owner.
    ///
    /// Both rows are written or neither is. Fails with `Conflict(SLUG_EXISTS)`
    /// when the slug is taken.
    async fn create_organization(
        &self,
        org: &Organization,
        initial_owner: Option<&Membership>,
    ) -> Result<()>;

    /// Apply `changes` to the stored row and return the result.
    ///
    /// Fails with `NotFound(ORG_NOT_FOUND)` for an unknown id and
    /// `Conflict(SLUG_EXISTS)` when the new slug belongs to another
    /// organization.
    async fn update_organization(
        &self,
        id: &str,
        changes: &OrganizationChanges,
    ) -> Result<Organization>;

    /// Delete an organization and cascade to its memberships and
    /// invitations. Sessions that had it active lose their active
    /// organization.
    ///
    /// Returns `false` if nothing was deleted.
    async fn delete_organization(&self, id: &str) -> Result<bool>;
}
