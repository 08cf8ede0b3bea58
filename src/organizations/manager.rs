//! Organization management.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{BulkheadError, Result};
use crate::model::{Membership, Organization, OrganizationDetails};
use crate::roles::OrgRole;
use crate::store::{
    IdentityStore, MembershipStore, OrganizationChanges, OrganizationStore, UserStore,
};
use crate::utils::{is_valid_slug, slugify};

/// Request body for creating an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    pub name: String,
    /// Derived from `name` when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// User to enrol as the first OWNER.
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Organization manager.
#[derive(Clone)]
pub struct OrganizationManager<S> {
    store: S,
}

impl<S: IdentityStore> OrganizationManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, org_id: &str) -> Result<Organization> {
        self.store
            .find_organization(org_id)
            .await?
            .ok_or_else(|| BulkheadError::org_not_found(org_id))
    }

    /// The privileged view: organization plus member count.
    pub async fn details(&self, org_id: &str) -> Result<OrganizationDetails> {
        let organization = self.get(org_id).await?;
        let member_count = self.store.count_memberships(org_id).await?;
        Ok(OrganizationDetails {
            organization,
            member_count,
        })
    }

    /// Create an organization, optionally with a first owner.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateOrganization) -> Result<Organization> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(BulkheadError::empty_organization_name());
        }
        let slug = match request.slug {
            Some(slug) => slug.trim().to_string(),
            None => slugify(&name),
        };
        if !is_valid_slug(&slug) {
            debug!(slug = %slug, "Rejected organization slug");
            return Err(BulkheadError::invalid_slug(&slug));
        }

        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            logo: request.logo,
            metadata: request.metadata,
            created_at: now,
        };

        let owner = match request.owner_id {
            Some(owner_id) => {
                self.store
                    .find_user(&owner_id)
                    .await?
                    .ok_or_else(|| BulkheadError::user_not_found(&owner_id))?;
                Some(Membership {
                    id: Uuid::new_v4().to_string(),
                    user_id: owner_id,
                    organization_id: org.id.clone(),
                    role: OrgRole::Owner,
                    created_at: now,
                })
            }
            None => None,
        };

        self.store.create_organization(&org, owner.as_ref()).await?;

        info!(
            org_id = %org.id,
            slug = %org.slug,
            owner_id = owner.as_ref().map(|m| m.user_id.as_str()),
            "Organization created"
        );

        Ok(org)
    }

    /// Apply a partial update. A changed slug must be valid and unused.
    ///
    /// A blank name is ignored; an empty logo or a null metadata clears the
    /// field.
    #[instrument(skip(self, request))]
    pub async fn update(&self, org_id: &str, request: UpdateOrganization) -> Result<Organization> {
        let slug = request.slug.map(|s| s.trim().to_string());
        if let Some(slug) = &slug {
            if !is_valid_slug(slug) {
                return Err(BulkheadError::invalid_slug(slug));
            }
        }

        let changes = OrganizationChanges {
            name: request
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            slug,
            logo: request.logo.map(|l| Some(l).filter(|l| !l.is_empty())),
            metadata: request.metadata.map(|m| Some(m).filter(|m| !m.is_null())),
        };

        let org = self.store.update_organization(org_id, &changes).await?;

        info!(org_id, slug = %org.slug, "Organization updated");
        Ok(org)
    }

    /// Delete an organization with its memberships and invitations.
    #[instrument(skip(self))]
    pub async fn delete(&self, org_id: &str) -> Result<()> {
        if !self.store.delete_organization(org_id).await? {
            return Err(BulkheadError::org_not_found(org_id));
        }
        info!(org_id, "Organization deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::store::InMemoryStore;
    use crate::testing::{TestUser, membership};

    fn named(name: &str) -> CreateOrganization {
        CreateOrganization {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_enrols_owner() {
        let store = InMemoryStore::new();
        let alice = TestUser::builder().build();
        store.insert_user(alice.clone()).await;
        let manager = OrganizationManager::new(store.clone());

        let org = manager
            .create(CreateOrganization {
                owner_id: Some(alice.id.clone()),
                ..named("Acme Inc.")
            })
            .await
            .unwrap();
        assert_eq!(org.slug, "acme-inc");

        let owner = store.find_membership(&org.id, &alice.id).await.unwrap().unwrap();
        assert_eq!(owner.role, OrgRole::Owner);
        assert_eq!(manager.details(&org.id).await.unwrap().member_count, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_taken_and_invalid_slugs() {
        let manager = OrganizationManager::new(InMemoryStore::new());
        manager.create(named("Acme")).await.unwrap();

        let err = manager.create(named("acme")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SlugExists);

        let err = manager
            .create(CreateOrganization {
                slug: Some("Not A Slug".to_string()),
                ..named("Other")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSlug);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let manager = OrganizationManager::new(InMemoryStore::new());
        let err = manager
            .create(CreateOrganization {
                slug: Some("acme".to_string()),
                ..named("   ")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn test_create_with_unknown_owner_writes_nothing() {
        let store = InMemoryStore::new();
        let manager = OrganizationManager::new(store.clone());
        let err = manager
            .create(CreateOrganization {
                owner_id: Some("ghost".to_string()),
                ..named("Acme")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
        assert!(store.find_organization_by_slug("acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_slug_conflict() {
        let manager = OrganizationManager::new(InMemoryStore::new());
        manager.create(named("Acme")).await.unwrap();
        let globex = manager.create(named("Globex")).await.unwrap();

        let err = manager
            .update(
                &globex.id,
                UpdateOrganization {
                    slug: Some("acme".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SlugExists);

        let updated = manager
            .update(
                &globex.id,
                UpdateOrganization {
                    name: Some("Globex Corporation".to_string()),
                    logo: Some("https://cdn.example.com/globex.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Globex Corporation");
        assert_eq!(updated.slug, "globex");
        assert!(updated.logo.is_some());

        let cleared = manager
            .update(
                &globex.id,
                UpdateOrganization {
                    name: Some("  ".to_string()),
                    logo: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.name, "Globex Corporation");
        assert_eq!(cleared.logo, None);

        let err = manager
            .update("missing", UpdateOrganization::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrgNotFound);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_reports_missing() {
        let store = InMemoryStore::new();
        let manager = OrganizationManager::new(store.clone());
        let org = manager.create(named("Acme")).await.unwrap();
        store.insert_membership(membership(&org.id, "a", OrgRole::Owner)).await;

        manager.delete(&org.id).await.unwrap();
        assert!(store.list_memberships(&org.id).await.unwrap().is_empty());
        let err = manager.delete(&org.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrgNotFound);
    }
}
