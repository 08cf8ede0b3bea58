//! Test fixtures and builders for generating identity-store data
//!
//! Everything here produces plain model values; seed them into an
//! [`InMemoryStore`](crate::store::InMemoryStore) with its `insert_*` helpers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{Invitation, InvitationStatus, Membership, Organization, User};
use crate::roles::{OrgRole, PlatformRole};
use crate::utils::slugify;

/// Helper functions for generating fake test data
pub mod fake {
    use super::*;

    /// Generate a fake email address
    pub fn email() -> String {
        format!("test-{}@example.com", Uuid::new_v4().simple())
    }

    /// Generate a fake UUID as a string
    pub fn uuid() -> String {
        Uuid::new_v4().to_string()
    }

    /// Generate a fake name
    pub fn name() -> String {
        format!("Test User {}", &Uuid::new_v4().simple().to_string()[..8])
    }

    /// Generate a fake, valid organization slug
    pub fn slug() -> String {
        format!("org-{}", &Uuid::new_v4().simple().to_string()[..8])
    }
}

/// Builder for test users
#[derive(Debug, Clone)]
pub struct TestUser {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    platform_role: PlatformRole,
    email_verified: bool,
    banned: bool,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::builder()
    }
}

impl TestUser {
    /// Start building a standard, verified, unbanned user
    pub fn builder() -> Self {
        Self {
            id: None,
            email: None,
            name: None,
            platform_role: PlatformRole::Standard,
            email_verified: true,
            banned: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Make the user a platform operator
    pub fn operator(mut self) -> Self {
        self.platform_role = PlatformRole::Operator;
        self
    }

    pub fn unverified(mut self) -> Self {
        self.email_verified = false;
        self
    }

    pub fn banned(mut self) -> Self {
        self.banned = true;
        self
    }

    pub fn build(self) -> User {
        User {
            id: self.id.unwrap_or_else(fake::uuid),
            email: self.email.unwrap_or_else(fake::email),
            name: self.name.unwrap_or_else(fake::name),
            platform_role: self.platform_role,
            email_verified: self.email_verified,
            banned: self.banned,
            ban_reason: self.banned.then(|| "test ban".to_string()),
            created_at: Utc::now(),
        }
    }
}

/// A standard user with the given email
pub fn user(email: &str) -> User {
    TestUser::builder().with_email(email).build()
}

/// An organization whose name and slug derive from `slug`
pub fn organization(slug: &str) -> Organization {
    Organization {
        id: fake::uuid(),
        name: slug.to_string(),
        slug: slugify(slug),
        logo: None,
        metadata: None,
        created_at: Utc::now(),
    }
}

pub fn membership(org_id: &str, user_id: &str, role: OrgRole) -> Membership {
    Membership {
        id: fake::uuid(),
        user_id: user_id.to_string(),
        organization_id: org_id.to_string(),
        role,
        created_at: Utc::now(),
    }
}

/// A pending USER invitation expiring at `expires_at`
pub fn invitation_for(org_id: &str, email: &str, expires_at: DateTime<Utc>) -> Invitation {
    Invitation {
        id: fake::uuid(),
        organization_id: org_id.to_string(),
        email: email.to_string(),
        role: OrgRole::User,
        status: InvitationStatus::Pending,
        expires_at,
        inviter_id: fake::uuid(),
        created_at: Utc::now(),
    }
}
