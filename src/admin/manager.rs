use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::types::{BanUser, CreateUser, UpdateUser};
use crate::error::{BulkheadError, Result};
use crate::model::User;
use crate::store::{IdentityStore, UserChanges, UserStore};
use crate::utils::{is_valid_email, normalize_email};

/// Operator-side account administration.
#[derive(Clone)]
pub struct AdminManager<S> {
    store: S,
}

impl<S: IdentityStore> AdminManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: CreateUser) -> Result<User> {
        let email = validated_email(&request.email)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            name: request.name.trim().to_string(),
            platform_role: request.platform_role.unwrap_or_default(),
            email_verified: request.email_verified,
            banned: false,
            ban_reason: None,
            created_at: Utc::now(),
        };
        self.store.create_user(&user).await?;

        info!(user_id = %user.id, platform_role = %user.platform_role, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| BulkheadError::user_not_found(user_id))
    }

    /// Apply a partial update. Ban state is never written here.
    #[instrument(skip(self, request))]
    pub async fn update_user(&self, user_id: &str, request: UpdateUser) -> Result<User> {
        let changes = UserChanges {
            name: request.name.map(|n| n.trim().to_string()),
            email: request.email.as_deref().map(validated_email).transpose()?,
            platform_role: request.platform_role,
            email_verified: request.email_verified,
        };

        let user = self.store.update_user(user_id, &changes).await?;

        info!(user_id, "User updated");
        Ok(user)
    }

    /// Ban an account. Its sessions stop resolving on the next request.
    #[instrument(skip(self, request))]
    pub async fn ban_user(&self, user_id: &str, request: BanUser) -> Result<User> {
        let reason = request.reason.filter(|r| !r.trim().is_empty());
        let user = self.store.set_ban(user_id, true, reason).await?;

        warn!(user_id, reason = ?user.ban_reason, "User banned");
        Ok(user)
    }

    /// Lift a ban.
    #[instrument(skip(self))]
    pub async fn activate_user(&self, user_id: &str) -> Result<User> {
        let user = self.store.set_ban(user_id, false, None).await?;

        info!(user_id, "User activated");
        Ok(user)
    }
}

fn validated_email(raw: &str) -> Result<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(BulkheadError::invalid_email(raw));
    }
    Ok(email)
}
