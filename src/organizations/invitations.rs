//! Invitation lifecycle.
//!
//! `PENDING -> {ACCEPTED, CANCELLED, EXPIRED}`. Expiry is lazy: a pending
//! invitation past `expires_at` is reported as EXPIRED and ignored by conflict
//! checks, but nothing rewrites it in storage.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::InvitationConfig;
use crate::error::{BulkheadError, Result};
use crate::model::{
    Identity, Invitation, InvitationStatus, InvitationView, Membership, UserSummary,
};
use crate::roles::OrgRole;
use crate::store::{IdentityStore, InvitationStore, OrganizationStore, UserStore};
use crate::utils::{is_valid_email, normalize_email};

/// Request body for creating an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitation {
    pub email: String,
    /// Defaults to USER.
    #[serde(default)]
    pub role: Option<OrgRole>,
}

/// Invitation manager - handles invitation lifecycle.
#[derive(Clone)]
pub struct InvitationManager<S> {
    store: S,
    config: InvitationConfig,
}

impl<S: IdentityStore> InvitationManager<S> {
    pub fn new(store: S, config: InvitationConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &InvitationConfig {
        &self.config
    }

    /// Invite `email` to an organization on behalf of `inviter_id`.
    ///
    /// Fails with `ALREADY_MEMBER` if an account with that email already
    /// belongs to the organization and `INVITATION_EXISTS` if a pending,
    /// unexpired invitation for the address is outstanding. Both are checked
    /// by the store in the same write as the insert.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(
        &self,
        org_id: &str,
        request: CreateInvitation,
        inviter_id: &str,
    ) -> Result<Invitation> {
        let email = normalize_email(&request.email);
        if !is_valid_email(&email) {
            return Err(BulkheadError::invalid_email(&request.email));
        }

        self.store
            .find_organization(org_id)
            .await?
            .ok_or_else(|| BulkheadError::org_not_found(org_id))?;

        let now = Utc::now();
        let invitation = Invitation {
            id: Uuid::new_v4().to_string(),
            organization_id: org_id.to_string(),
            email,
            role: request.role.unwrap_or_default(),
            status: InvitationStatus::Pending,
            expires_at: now + self.config.expiry(),
            inviter_id: inviter_id.to_string(),
            created_at: now,
        };

        if let Err(err) = self
            .store
            .insert_invitation_if_no_pending(&invitation, now)
            .await
        {
            debug!(org_id, email = %invitation.email, code = %err.code(), "Invitation refused");
            return Err(err);
        }

        info!(
            org_id,
            invitation_id = %invitation.id,
            email = %invitation.email,
            role = %invitation.role,
            inviter_id,
            "Invitation created"
        );

        Ok(invitation)
    }

    /// Invite on behalf of the platform.
    ///
    /// The recorded inviter is a platform operator account. Having none is a
    /// deployment fault and is reported as a server error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_as_operator(
        &self,
        org_id: &str,
        request: CreateInvitation,
    ) -> Result<Invitation> {
        let Some(operator) = self.store.find_any_operator().await? else {
            error!(org_id, "No platform operator exists to attribute the invitation");
            return Err(BulkheadError::no_inviter_available());
        };

        self.create(org_id, request, &operator.id).await
    }

    /// Reset an invitation to PENDING and push its expiry out again.
    ///
    /// Works on cancelled and expired invitations too. Membership is not
    /// re-checked, but an invitation is never revived while another pending
    /// one exists for the same address.
    #[instrument(skip(self))]
    pub async fn resend(&self, org_id: &str, invitation_id: &str) -> Result<Invitation> {
        let now = Utc::now();
        let invitation = self
            .store
            .renew_invitation(org_id, invitation_id, now + self.config.expiry(), now)
            .await?
            .ok_or_else(|| BulkheadError::invitation_not_found(invitation_id))?;

        info!(
            org_id,
            invitation_id,
            expires_at = %invitation.expires_at,
            "Invitation resent"
        );

        Ok(invitation)
    }

    /// Mark an invitation CANCELLED.
    ///
    /// The row is kept; a cancelled invitation no longer blocks a new one.
    #[instrument(skip(self))]
    pub async fn cancel(&self, org_id: &str, invitation_id: &str) -> Result<Invitation> {
        let invitation = self
            .store
            .cancel_invitation(org_id, invitation_id)
            .await?
            .ok_or_else(|| BulkheadError::invitation_not_found(invitation_id))?;

        info!(org_id, invitation_id, "Invitation cancelled");
        Ok(invitation)
    }

    /// All invitations of an organization, newest first, with inviter details
    /// and lazy expiry applied to the reported status.
    pub async fn list(&self, org_id: &str) -> Result<Vec<InvitationView>> {
        let now = Utc::now();
        let mut invitations = self.store.list_invitations(org_id).await?;
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut inviters: HashMap<String, Option<UserSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(invitations.len());
        for invitation in invitations {
            if !inviters.contains_key(&invitation.inviter_id) {
                let summary = self
                    .store
                    .find_user(&invitation.inviter_id)
                    .await?
                    .map(|u| u.summary());
                inviters.insert(invitation.inviter_id.clone(), summary);
            }
            let inviter = inviters.get(&invitation.inviter_id).cloned().flatten();
            views.push(InvitationView {
                invitation: invitation.observed_at(now),
                inviter,
            });
        }

        Ok(views)
    }

    /// Accept an invitation as the invitee.
    ///
    /// The caller's email must match the invitation. Creating the membership
    /// and marking the invitation ACCEPTED happen atomically.
    #[instrument(skip(self, invitee), fields(user_id = %invitee.id))]
    pub async fn accept(&self, invitation_id: &str, invitee: &Identity) -> Result<Membership> {
        let now = Utc::now();
        let invitation = self
            .store
            .find_invitation_by_id(invitation_id)
            .await?
            .ok_or_else(|| BulkheadError::invitation_not_found(invitation_id))?;

        if !invitation.is_pending_at(now) {
            return Err(BulkheadError::invitation_not_pending(
                invitation.effective_status(now),
            ));
        }

        if normalize_email(&invitee.email) != invitation.email {
            debug!(invitation_id, "Invitee email does not match");
            return Err(BulkheadError::invitation_email_mismatch());
        }

        let membership = Membership {
            id: Uuid::new_v4().to_string(),
            user_id: invitee.id.clone(),
            organization_id: invitation.organization_id.clone(),
            role: invitation.role,
            created_at: now,
        };

        self.store
            .accept_invitation(invitation_id, &membership, now)
            .await?;

        info!(
            org_id = %membership.organization_id,
            invitation_id,
            role = %membership.role,
            "Invitation accepted"
        );

        Ok(membership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::Organization;
    use crate::store::{InMemoryStore, MembershipStore};
    use crate::testing::{TestUser, invitation_for, membership, organization};
    use chrono::Duration;

    async fn setup() -> (InvitationManager<InMemoryStore>, InMemoryStore, Organization) {
        let store = InMemoryStore::new();
        let org = organization("acme");
        store.insert_organization(org.clone()).await;
        let manager = InvitationManager::new(store.clone(), InvitationConfig::default());
        (manager, store, org)
    }

    fn invite(email: &str) -> CreateInvitation {
        CreateInvitation {
            email: email.to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_user_and_seven_days() {
        let (manager, _, org) = setup().await;
        let before = Utc::now();
        let inv = manager.create(&org.id, invite("Bob@X.com "), "inviter").await.unwrap();

        assert_eq!(inv.email, "bob@x.com");
        assert_eq!(inv.role, OrgRole::User);
        assert_eq!(inv.status, InvitationStatus::Pending);
        assert_eq!(inv.inviter_id, "inviter");
        assert!(inv.expires_at >= before + Duration::days(7));
        assert!(inv.expires_at <= Utc::now() + Duration::days(7));
    }

    #[tokio::test]
    async fn test_duplicate_pending_conflicts_regardless_of_case() {
        let (manager, _, org) = setup().await;
        manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();

        let err = manager
            .create(&org.id, invite("BOB@x.com"), "a")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationExists);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_leave_one_pending() {
        let (manager, store, org) = setup().await;

        let mut tasks = Vec::new();
        for _ in 0..12 {
            let (manager, org_id) = (manager.clone(), org.id.clone());
            tasks.push(tokio::spawn(async move {
                manager.create(&org_id, invite("bob@x.com"), "a").await
            }));
        }

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.code(), ErrorCode::InvitationExists),
            }
        }
        assert_eq!(created, 1);

        let now = Utc::now();
        let pending = store
            .list_invitations(&org.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.is_pending_at(now))
            .count();
        assert_eq!(pending, 1);
    }

    #[tokio::test]
    async fn test_create_after_expiry_succeeds() {
        let (manager, store, org) = setup().await;
        store
            .insert_invitation(invitation_for(
                &org.id,
                "bob@x.com",
                Utc::now() - Duration::minutes(1),
            ))
            .await;

        manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_after_cancel_succeeds() {
        let (manager, _, org) = setup().await;
        let first = manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();
        manager.cancel(&org.id, &first.id).await.unwrap();

        manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();
    }

    #[tokio::test]
    async fn test_existing_member_cannot_be_invited() {
        let (manager, store, org) = setup().await;
        let bob = TestUser::builder().with_email("bob@x.com").build();
        store.insert_user(bob.clone()).await;
        store.insert_membership(membership(&org.id, &bob.id, OrgRole::User)).await;

        let err = manager
            .create(&org.id, invite("bob@x.com"), "a")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyMember);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let (manager, _, org) = setup().await;
        let err = manager.create(&org.id, invite("not-an-email"), "a").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEmail);

        let err = manager.create("missing", invite("bob@x.com"), "a").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrgNotFound);
    }

    #[tokio::test]
    async fn test_operator_invitation_needs_an_operator() {
        let (manager, store, org) = setup().await;
        let err = manager
            .create_as_operator(&org.id, invite("bob@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoInviterAvailable);
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        let operator = TestUser::builder().operator().build();
        store.insert_user(operator.clone()).await;
        let inv = manager
            .create_as_operator(&org.id, invite("bob@x.com"))
            .await
            .unwrap();
        assert_eq!(inv.inviter_id, operator.id);
    }

    #[tokio::test]
    async fn test_resend_revives_and_extends() {
        let (manager, store, org) = setup().await;
        let mut stale = invitation_for(&org.id, "bob@x.com", Utc::now() - Duration::days(1));
        stale.status = InvitationStatus::Cancelled;
        store.insert_invitation(stale.clone()).await;

        let resent = manager.resend(&org.id, &stale.id).await.unwrap();
        assert_eq!(resent.status, InvitationStatus::Pending);
        assert!(resent.expires_at > stale.expires_at);

        let again = manager.resend(&org.id, &stale.id).await.unwrap();
        assert!(again.expires_at > resent.expires_at);
    }

    #[tokio::test]
    async fn test_resend_never_creates_a_duplicate_pending() {
        let (manager, store, org) = setup().await;
        let mut old = invitation_for(&org.id, "bob@x.com", Utc::now() + Duration::days(1));
        old.status = InvitationStatus::Cancelled;
        store.insert_invitation(old.clone()).await;
        manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();

        let err = manager.resend(&org.id, &old.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationExists);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resends_revive_only_one() {
        let (manager, store, org) = setup().await;
        let mut ids = Vec::new();
        for _ in 0..2 {
            let mut cancelled =
                invitation_for(&org.id, "bob@x.com", Utc::now() + Duration::days(1));
            cancelled.status = InvitationStatus::Cancelled;
            ids.push(cancelled.id.clone());
            store.insert_invitation(cancelled).await;
        }

        let tasks: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let (manager, org_id) = (manager.clone(), org.id.clone());
                tokio::spawn(async move { manager.resend(&org_id, &id).await })
            })
            .collect();

        let mut revived = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(inv) => {
                    assert_eq!(inv.status, InvitationStatus::Pending);
                    revived += 1;
                }
                Err(err) => assert_eq!(err.code(), ErrorCode::InvitationExists),
            }
        }
        assert_eq!(revived, 1);

        let now = Utc::now();
        let pending = store
            .list_invitations(&org.id)
            .await
            .unwrap()
            .iter()
            .filter(|i| i.is_pending_at(now))
            .count();
        assert_eq!(pending, 1);
    }

    #[tokio::test]
    async fn test_resend_and_cancel_are_scoped_to_org() {
        let (manager, store, org) = setup().await;
        let inv = manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();
        let other = organization("globex");
        store.insert_organization(other.clone()).await;

        let err = manager.resend(&other.id, &inv.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationNotFound);
        let err = manager.cancel(&other.id, &inv.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationNotFound);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_inviter() {
        let (manager, store, org) = setup().await;
        let inviter = TestUser::builder().with_name("Ada").build();
        store.insert_user(inviter.clone()).await;

        let mut older = invitation_for(&org.id, "old@x.com", Utc::now() - Duration::days(1));
        older.created_at = Utc::now() - Duration::days(8);
        older.inviter_id = inviter.id.clone();
        store.insert_invitation(older).await;
        manager.create(&org.id, invite("new@x.com"), &inviter.id).await.unwrap();

        let views = manager.list(&org.id).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].invitation.email, "new@x.com");
        assert_eq!(views[0].invitation.status, InvitationStatus::Pending);
        assert_eq!(views[1].invitation.status, InvitationStatus::Expired);
        assert_eq!(views[0].inviter.as_ref().unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_accept_creates_membership() {
        let (manager, store, org) = setup().await;
        let bob = TestUser::builder().with_email("bob@x.com").build();
        store.insert_user(bob.clone()).await;
        let inv = manager
            .create(
                &org.id,
                CreateInvitation {
                    email: "bob@x.com".to_string(),
                    role: Some(OrgRole::Admin),
                },
                "a",
            )
            .await
            .unwrap();

        let membership = manager.accept(&inv.id, &bob.identity()).await.unwrap();
        assert_eq!(membership.role, OrgRole::Admin);
        assert!(store.find_membership(&org.id, &bob.id).await.unwrap().is_some());

        let err = manager.accept(&inv.id, &bob.identity()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationNotPending);
    }

    #[tokio::test]
    async fn test_accept_rejects_wrong_email_and_expired() {
        let (manager, store, org) = setup().await;
        let mallory = TestUser::builder().with_email("mallory@x.com").build();
        let inv = manager.create(&org.id, invite("bob@x.com"), "a").await.unwrap();

        let err = manager.accept(&inv.id, &mallory.identity()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationEmailMismatch);

        let expired = invitation_for(&org.id, "mallory@x.com", Utc::now() - Duration::hours(1));
        store.insert_invitation(expired.clone()).await;
        let err = manager.accept(&expired.id, &mallory.identity()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvitationExpired);
    }
}
