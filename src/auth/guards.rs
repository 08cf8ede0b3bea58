//! Guards as composable [`Authorizer`] objects.
//!
//! Every protected operation passes the session resolver first, then exactly
//! one of [`PlatformRoleGuard`] or [`OrgMembershipGuard`]. Both guards wrap an
//! inner authorizer producing a [`Principal`], so each can be exercised in
//! isolation against a fake identity source.

use async_trait::async_trait;
use tracing::debug;

use super::credentials::RequestContext;
use super::resolver::Principal;
use crate::error::{BulkheadError, Result};
use crate::model::{Membership, Organization};
use crate::roles::{PlatformRole, RoleSet};
use crate::store::{MembershipStore, OrganizationStore};

/// A pre-condition check run before any handler logic.
///
/// Fails closed: an `Err` short-circuits the request.
#[async_trait]
pub trait Authorizer: Send + Sync {
    type Output: Send;

    async fn evaluate(&self, ctx: &RequestContext) -> Result<Self::Output>;
}

/// Admits only callers holding one platform role.
#[derive(Clone)]
pub struct PlatformRoleGuard<A> {
    inner: A,
    required: PlatformRole,
}

impl<A> PlatformRoleGuard<A> {
    pub fn new(inner: A, required: PlatformRole) -> Self {
        Self { inner, required }
    }

    /// Operator-only endpoints.
    pub fn operator(inner: A) -> Self {
        Self::new(inner, PlatformRole::Operator)
    }

    #[must_use]
    pub fn required(&self) -> PlatformRole {
        self.required
    }
}

#[async_trait]
impl<A> Authorizer for PlatformRoleGuard<A>
where
    A: Authorizer<Output = Principal>,
{
    type Output = Principal;

    async fn evaluate(&self, ctx: &RequestContext) -> Result<Principal> {
        let principal = self.inner.evaluate(ctx).await?;

        if principal.identity.platform_role != self.required {
            debug!(
                user_id = %principal.identity.id,
                required = %self.required,
                actual = %principal.identity.platform_role,
                "Platform role check failed"
            );
            return Err(BulkheadError::insufficient_platform_role());
        }

        Ok(principal)
    }
}

/// The outcome of a passed membership check.
#[derive(Clone, Debug, PartialEq)]
pub struct OrgAccess {
    pub principal: Principal,
    pub organization: Organization,
    pub membership: Membership,
}

/// Admits members of the organization named by the request path, optionally
/// restricted to a set of membership roles.
#[derive(Clone)]
pub struct OrgMembershipGuard<A, S> {
    inner: A,
    store: S,
    allowed: RoleSet,
}

impl<A, S> OrgMembershipGuard<A, S> {
    pub fn new(inner: A, store: S, allowed: RoleSet) -> Self {
        Self {
            inner,
            store,
            allowed,
        }
    }

    pub fn any_member(inner: A, store: S) -> Self {
        Self::new(inner, store, RoleSet::any())
    }

    pub fn owner_or_admin(inner: A, store: S) -> Self {
        Self::new(inner, store, RoleSet::owner_or_admin())
    }

    pub fn owner_only(inner: A, store: S) -> Self {
        Self::new(inner, store, RoleSet::owner_only())
    }
}

#[async_trait]
impl<A, S> Authorizer for OrgMembershipGuard<A, S>
where
    A: Authorizer<Output = Principal>,
    S: OrganizationStore + MembershipStore,
{
    type Output = OrgAccess;

    async fn evaluate(&self, ctx: &RequestContext) -> Result<OrgAccess> {
        let principal = self.inner.evaluate(ctx).await?;

        let org_id = ctx
            .org_id()
            .ok_or_else(BulkheadError::missing_organization_id)?;

        let organization = self
            .store
            .find_organization(org_id)
            .await?
            .ok_or_else(|| BulkheadError::org_not_found(org_id))?;

        let Some(membership) = self
            .store
            .find_membership(org_id, &principal.identity.id)
            .await?
        else {
            debug!(org_id, user_id = %principal.identity.id, "Caller is not a member");
            return Err(BulkheadError::not_member());
        };

        if !self.allowed.permits(membership.role) {
            debug!(
                org_id,
                user_id = %principal.identity.id,
                role = %membership.role,
                "Organization role check failed"
            );
            return Err(BulkheadError::insufficient_org_role());
        }

        Ok(OrgAccess {
            principal,
            organization,
            membership,
        })
    }
}
