use std::future::Future;
use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::credentials::RequestContext;
use super::guards::{Authorizer, OrgAccess};
use super::resolver::Principal;
use crate::app::AppState;
use crate::error::BulkheadError;
use crate::roles::RoleSet;
use crate::store::IdentityStore;

/// Axum extractor for any authenticated caller.
///
/// The request is rejected with 401 if the session does not resolve. The
/// resolved [`Identity`](crate::model::Identity) is also placed in the
/// request extensions.
///
/// # Example
///
/// ```rust,ignore
/// async fn whoami(Authenticated(principal): Authenticated) -> Json<Identity> {
///     Json(principal.identity)
/// }
/// ```
pub struct Authenticated(pub Principal);

impl<S: IdentityStore> FromRequestParts<AppState<S>> for Authenticated {
    type Rejection = BulkheadError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        Box::pin(async move {
            let ctx = RequestContext::from_parts(parts, state.credentials()).await;
            let principal = state.resolver().evaluate(&ctx).await?;

            parts.extensions.insert(principal.identity.clone());
            Ok(Authenticated(principal))
        })
    }
}

/// Axum extractor admitting platform operators only.
pub struct PlatformOperator(pub Principal);

impl<S: IdentityStore> FromRequestParts<AppState<S>> for PlatformOperator {
    type Rejection = BulkheadError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        Box::pin(async move {
            let ctx = RequestContext::from_parts(parts, state.credentials()).await;
            let principal = state.platform_guard().evaluate(&ctx).await?;

            parts.extensions.insert(principal.identity.clone());
            Ok(PlatformOperator(principal))
        })
    }
}

/// Which membership roles an [`OrgMember`] extractor admits.
pub trait OrgPolicy: Send + Sync + 'static {
    fn roles() -> RoleSet;
}

/// Any member of the organization.
pub struct AnyMember;

/// OWNER or ADMIN members.
pub struct OwnerOrAdmin;

/// OWNER members only.
pub struct OwnerOnly;

impl OrgPolicy for AnyMember {
    fn roles() -> RoleSet {
        RoleSet::any()
    }
}

impl OrgPolicy for OwnerOrAdmin {
    fn roles() -> RoleSet {
        RoleSet::owner_or_admin()
    }
}

impl OrgPolicy for OwnerOnly {
    fn roles() -> RoleSet {
        RoleSet::owner_only()
    }
}

/// Axum extractor for a member of the organization named by the `{org_id}`
/// path segment.
///
/// # Example
///
/// ```rust,ignore
/// async fn members(OrgMember(access, _): OrgMember<OwnerOrAdmin>) -> String {
///     format!("{} in {}", access.membership.role, access.organization.name)
/// }
/// ```
pub struct OrgMember<P = AnyMember>(pub OrgAccess, pub PhantomData<P>);

impl<P> OrgMember<P> {
    pub fn access(&self) -> &OrgAccess {
        &self.0
    }

    pub fn into_inner(self) -> OrgAccess {
        self.0
    }
}

impl<S, P> FromRequestParts<AppState<S>> for OrgMember<P>
where
    S: IdentityStore,
    P: OrgPolicy,
{
    type Rejection = BulkheadError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        Box::pin(async move {
            let ctx = RequestContext::from_parts(parts, state.credentials()).await;
            let access = state.org_guard(P::roles()).evaluate(&ctx).await?;

            parts.extensions.insert(access.principal.identity.clone());
            parts.extensions.insert(access.membership.clone());
            Ok(OrgMember(access, PhantomData))
        })
    }
}
