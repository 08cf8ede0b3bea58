use std::sync::Arc;

use crate::admin::AdminManager;
use crate::auth::{
    CredentialExtractor, OrgMembershipGuard, PlatformRoleGuard, SessionResolver, SessionVerifier,
    StoreSessionVerifier,
};
use crate::config::Config;
use crate::organizations::{
    ActiveOrganizationBinder, InvitationManager, MembershipManager, OrganizationManager,
};
use crate::roles::RoleSet;
use crate::store::IdentityStore;

/// Shared application state handed to every handler and extractor.
///
/// Cheap to clone: everything lives behind one `Arc`.
pub struct AppState<S> {
    inner: Arc<AppInner<S>>,
}

struct AppInner<S> {
    config: Config,
    store: S,
    credentials: CredentialExtractor,
    resolver: SessionResolver<S>,
    organizations: OrganizationManager<S>,
    binder: ActiveOrganizationBinder<S>,
    invitations: InvitationManager<S>,
    members: MembershipManager<S>,
    admin: AdminManager<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: IdentityStore> AppState<S> {
    /// State whose sessions are verified against `store` itself.
    pub fn new(store: S, config: Config) -> Self {
        let verifier = Arc::new(StoreSessionVerifier::new(store.clone()));
        Self::with_verifier(store, config, verifier)
    }

    /// State backed by an external session service.
    pub fn with_verifier(store: S, config: Config, verifier: Arc<dyn SessionVerifier>) -> Self {
        let inner = AppInner {
            credentials: CredentialExtractor::new(&config.session),
            resolver: SessionResolver::new(verifier, store.clone()),
            organizations: OrganizationManager::new(store.clone()),
            binder: ActiveOrganizationBinder::new(store.clone()),
            invitations: InvitationManager::new(store.clone(), config.invitations.clone()),
            members: MembershipManager::new(store.clone()),
            admin: AdminManager::new(store.clone()),
            store,
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn credentials(&self) -> &CredentialExtractor {
        &self.inner.credentials
    }

    pub fn resolver(&self) -> &SessionResolver<S> {
        &self.inner.resolver
    }

    pub fn organizations(&self) -> &OrganizationManager<S> {
        &self.inner.organizations
    }

    pub fn binder(&self) -> &ActiveOrganizationBinder<S> {
        &self.inner.binder
    }

    pub fn invitations(&self) -> &InvitationManager<S> {
        &self.inner.invitations
    }

    pub fn members(&self) -> &MembershipManager<S> {
        &self.inner.members
    }

    pub fn admin(&self) -> &AdminManager<S> {
        &self.inner.admin
    }

    /// Guard for operator-only endpoints.
    pub fn platform_guard(&self) -> PlatformRoleGuard<SessionResolver<S>> {
        PlatformRoleGuard::operator(self.inner.resolver.clone())
    }

    /// Guard for organization-scoped endpoints admitting `roles`.
    pub fn org_guard(&self, roles: RoleSet) -> OrgMembershipGuard<SessionResolver<S>, S> {
        OrgMembershipGuard::new(self.inner.resolver.clone(), self.inner.store.clone(), roles)
    }
}
