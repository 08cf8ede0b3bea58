//! In-memory identity store.
//!
//! All state sits behind one `tokio::sync::RwLock`, so every compound
//! operation (check-then-insert, count-then-delete) runs under a single write
//! guard and is serialised against other writers.

use super::{
    ActiveOrganizationBinding, InvitationStore, MembershipRemoval, MembershipStore,
    OrganizationChanges, OrganizationStore, SessionStore, UserChanges, UserStore,
};
use crate::error::{BulkheadError, ErrorCode, Result};
use crate::model::{Invitation, InvitationStatus, Membership, Organization, Session, User};
use crate::roles::OrgRole;
use crate::utils::generate_secure_token;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    organizations: HashMap<String, Organization>,
    memberships: HashMap<String, Membership>,
    invitations: HashMap<String, Invitation>,
    sessions: HashMap<String, Session>,
}

impl State {
    fn membership_of(&self, org_id: &str, user_id: &str) -> Option<&Membership> {
        self.memberships
            .values()
            .find(|m| m.organization_id == org_id && m.user_id == user_id)
    }

    fn is_member_by_email(&self, org_id: &str, email: &str) -> bool {
        self.users
            .values()
            .filter(|u| u.email == email)
            .any(|u| self.membership_of(org_id, &u.id).is_some())
    }

    fn owner_count(&self, org_id: &str) -> usize {
        self.memberships
            .values()
            .filter(|m| m.organization_id == org_id && m.role == OrgRole::Owner)
            .count()
    }

    fn has_pending(&self, org_id: &str, email: &str, except: Option<&str>, now: DateTime<Utc>) -> bool {
        self.invitations.values().any(|i| {
            i.organization_id == org_id
                && i.email == email
                && Some(i.id.as_str()) != except
                && i.is_pending_at(now)
        })
    }

    fn slug_taken(&self, slug: &str, except: Option<&str>) -> bool {
        self.organizations
            .values()
            .any(|o| o.slug == slug && Some(o.id.as_str()) != except)
    }

    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id.as_str()) != except)
    }
}

/// In-memory store implementing every storage trait.
///
/// Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly (for setup), bypassing uniqueness checks.
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    /// Insert an organization directly (for setup).
    pub async fn insert_organization(&self, org: Organization) {
        self.state
            .write()
            .await
            .organizations
            .insert(org.id.clone(), org);
    }

    /// Insert a membership directly (for setup).
    pub async fn insert_membership(&self, membership: Membership) {
        self.state
            .write()
            .await
            .memberships
            .insert(membership.id.clone(), membership);
    }

    /// Insert an invitation directly (for setup).
    pub async fn insert_invitation(&self, invitation: Invitation) {
        self.state
            .write()
            .await
            .invitations
            .insert(invitation.id.clone(), invitation);
    }

    /// Insert a session directly (for setup).
    pub async fn insert_session(&self, session: Session) {
        self.state
            .write()
            .await
            .sessions
            .insert(session.token.clone(), session);
    }

    /// Create a fresh 24-hour session for `user_id`, as sign-in would.
    pub async fn issue_session(&self, user_id: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: generate_secure_token(),
            user_id: user_id.to_string(),
            active_organization_id: None,
            created_at: now,
            expires_at: now + Duration::hours(24),
        };
        self.insert_session(session.clone()).await;
        session
    }

    /// Drop a session, as sign-out would.
    pub async fn revoke_session(&self, token: &str) {
        self.state.write().await.sessions.remove(token);
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(BulkheadError::email_exists(&user.email));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<User> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(id) {
            return Err(BulkheadError::user_not_found(id));
        }
        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(id)) {
                return Err(BulkheadError::email_exists(email));
            }
        }

        let Some(user) = state.users.get_mut(id) else {
            return Err(BulkheadError::user_not_found(id));
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(role) = changes.platform_role {
            user.platform_role = role;
        }
        if let Some(verified) = changes.email_verified {
            user.email_verified = verified;
        }
        Ok(user.clone())
    }

    async fn set_ban(&self, id: &str, banned: bool, reason: Option<String>) -> Result<User> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(id) else {
            return Err(BulkheadError::user_not_found(id));
        };
        user.banned = banned;
        user.ban_reason = reason.filter(|_| banned);
        Ok(user.clone())
    }

    async fn find_any_operator(&self) -> Result<Option<User>> {
        let state = self.state.read().await;
        // Oldest operator first.
        Ok(state
            .users
            .values()
            .filter(|u| u.platform_role.is_operator())
            .min_by_key(|u| u.created_at)
            .cloned())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_organization(&self, id: &str) -> Result<Option<Organization>> {
        Ok(self.state.read().await.organizations.get(id).cloned())
    }

    async fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        Ok(self
            .state
            .read()
            .await
            .organizations
            .values()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn create_organization(
        &self,
        org: &Organization,
        initial_owner: Option<&Membership>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if state.slug_taken(&org.slug, None) {
            return Err(BulkheadError::slug_exists(&org.slug));
        }
        state.organizations.insert(org.id.clone(), org.clone());
        if let Some(owner) = initial_owner {
            state.memberships.insert(owner.id.clone(), owner.clone());
        }
        Ok(())
    }

    async fn update_organization(
        &self,
        id: &str,
        changes: &OrganizationChanges,
    ) -> Result<Organization> {
        let mut state = self.state.write().await;
        if !state.organizations.contains_key(id) {
            return Err(BulkheadError::org_not_found(id));
        }
        if let Some(slug) = &changes.slug {
            if state.slug_taken(slug, Some(id)) {
                return Err(BulkheadError::slug_exists(slug));
            }
        }

        let Some(org) = state.organizations.get_mut(id) else {
            return Err(BulkheadError::org_not_found(id));
        };
        if let Some(name) = &changes.name {
            org.name = name.clone();
        }
        if let Some(slug) = &changes.slug {
            org.slug = slug.clone();
        }
        if let Some(logo) = &changes.logo {
            org.logo = logo.clone();
        }
        if let Some(metadata) = &changes.metadata {
            org.metadata = metadata.clone();
        }
        Ok(org.clone())
    }

    async fn delete_organization(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.organizations.remove(id).is_none() {
            return Ok(false);
        }
        state.memberships.retain(|_, m| m.organization_id != id);
        state.invitations.retain(|_, i| i.organization_id != id);
        for session in state.sessions.values_mut() {
            if session.active_organization_id.as_deref() == Some(id) {
                session.active_organization_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn find_membership(&self, org_id: &str, user_id: &str) -> Result<Option<Membership>> {
        Ok(self
            .state
            .read()
            .await
            .membership_of(org_id, user_id)
            .cloned())
    }

    async fn find_membership_by_id(
        &self,
        org_id: &str,
        member_id: &str,
    ) -> Result<Option<Membership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .get(member_id)
            .filter(|m| m.organization_id == org_id)
            .cloned())
    }

    async fn list_memberships(&self, org_id: &str) -> Result<Vec<Membership>> {
        let state = self.state.read().await;
        let mut members: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.organization_id == org_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    async fn count_memberships(&self, org_id: &str) -> Result<usize> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .values()
            .filter(|m| m.organization_id == org_id)
            .count())
    }

    async fn create_membership(&self, membership: &Membership) -> Result<()> {
        let mut state = self.state.write().await;
        if state
            .membership_of(&membership.organization_id, &membership.user_id)
            .is_some()
        {
            return Err(BulkheadError::conflict(
                ErrorCode::AlreadyMember,
                "user is already a member of this organization",
            ));
        }
        state
            .memberships
            .insert(membership.id.clone(), membership.clone());
        Ok(())
    }

    async fn remove_membership_unless_last_owner(
        &self,
        org_id: &str,
        member_id: &str,
    ) -> Result<MembershipRemoval> {
        let mut state = self.state.write().await;
        let Some(membership) = state
            .memberships
            .get(member_id)
            .filter(|m| m.organization_id == org_id)
            .cloned()
        else {
            return Ok(MembershipRemoval::NotFound);
        };

        if membership.role == OrgRole::Owner && state.owner_count(org_id) <= 1 {
            return Ok(MembershipRemoval::LastOwner);
        }

        state.memberships.remove(member_id);
        Ok(MembershipRemoval::Removed(membership))
    }
}

#[async_trait]
impl InvitationStore for InMemoryStore {
    async fn find_invitation(&self, org_id: &str, id: &str) -> Result<Option<Invitation>> {
        Ok(self
            .state
            .read()
            .await
            .invitations
            .get(id)
            .filter(|i| i.organization_id == org_id)
            .cloned())
    }

    async fn find_invitation_by_id(&self, id: &str) -> Result<Option<Invitation>> {
        Ok(self.state.read().await.invitations.get(id).cloned())
    }

    async fn list_invitations(&self, org_id: &str) -> Result<Vec<Invitation>> {
        Ok(self
            .state
            .read()
            .await
            .invitations
            .values()
            .filter(|i| i.organization_id == org_id)
            .cloned()
            .collect())
    }

    async fn insert_invitation_if_no_pending(
        &self,
        invitation: &Invitation,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if state.is_member_by_email(&invitation.organization_id, &invitation.email) {
            return Err(BulkheadError::already_member(&invitation.email));
        }
        if state.has_pending(&invitation.organization_id, &invitation.email, None, now) {
            return Err(BulkheadError::invitation_exists(&invitation.email));
        }
        state
            .invitations
            .insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn renew_invitation(
        &self,
        org_id: &str,
        id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>> {
        let mut state = self.state.write().await;
        let Some(email) = state
            .invitations
            .get(id)
            .filter(|i| i.organization_id == org_id)
            .map(|i| i.email.clone())
        else {
            return Ok(None);
        };

        if state.has_pending(org_id, &email, Some(id), now) {
            return Err(BulkheadError::invitation_exists(&email));
        }

        let Some(invitation) = state.invitations.get_mut(id) else {
            return Ok(None);
        };
        invitation.status = InvitationStatus::Pending;
        invitation.expires_at = expires_at;
        Ok(Some(invitation.clone()))
    }

    async fn cancel_invitation(&self, org_id: &str, id: &str) -> Result<Option<Invitation>> {
        let mut state = self.state.write().await;
        let Some(invitation) = state
            .invitations
            .get_mut(id)
            .filter(|i| i.organization_id == org_id)
        else {
            return Ok(None);
        };
        invitation.status = InvitationStatus::Cancelled;
        Ok(Some(invitation.clone()))
    }

    async fn accept_invitation(
        &self,
        id: &str,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> Result<Invitation> {
        let mut state = self.state.write().await;
        let Some(current) = state.invitations.get(id).cloned() else {
            return Err(BulkheadError::invitation_not_found(id));
        };
        if !current.is_pending_at(now) {
            return Err(BulkheadError::invitation_not_pending(
                current.effective_status(now),
            ));
        }
        if state
            .membership_of(&membership.organization_id, &membership.user_id)
            .is_some()
        {
            return Err(BulkheadError::already_member(&current.email));
        }

        state
            .memberships
            .insert(membership.id.clone(), membership.clone());
        let Some(invitation) = state.invitations.get_mut(id) else {
            return Err(BulkheadError::invitation_not_found(id));
        };
        invitation.status = InvitationStatus::Accepted;
        Ok(invitation.clone())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.state.read().await.sessions.get(token).cloned())
    }

    async fn bind_active_organization(
        &self,
        token: &str,
        user_id: &str,
        org_id: &str,
    ) -> Result<ActiveOrganizationBinding> {
        let mut state = self.state.write().await;
        if state.membership_of(org_id, user_id).is_none() {
            return Ok(ActiveOrganizationBinding::NotMember);
        }
        match state
            .sessions
            .get_mut(token)
            .filter(|s| s.user_id == user_id)
        {
            Some(session) => {
                session.active_organization_id = Some(org_id.to_string());
                Ok(ActiveOrganizationBinding::Bound)
            }
            None => Ok(ActiveOrganizationBinding::SessionNotFound),
        }
    }
}
