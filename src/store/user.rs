//! User storage trait.

use crate::error::Result;
use crate::model::User;
use crate::roles::PlatformRole;
use async_trait::async_trait;

/// Field-level changes to a user. `None` leaves the field as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub platform_role: Option<PlatformRole>,
    pub email_verified: Option<bool>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> Result<Option<User>>;

    /// Look up by normalised email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user.
    ///
    /// Must fail with `Conflict(EMAIL_EXISTS)` when the email is taken; this
    /// is expected to be backed by a unique constraint.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Apply `changes` to the stored row and return the result.
    ///
    /// Only the named fields are written, so a concurrent ban is never
    /// overwritten. Fails with `NotFound(USER_NOT_FOUND)` for an unknown id
    /// and `Conflict(EMAIL_EXISTS)` when the new email belongs to another
    /// user.
    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<User>;

    /// Set or lift a ban in one write. `reason` is dropped when lifting.
    ///
    /// Fails with `NotFound(USER_NOT_FOUND)` for an unknown id.
    async fn set_ban(&self, id: &str, banned: bool, reason: Option<String>) -> Result<User>;

    /// Any user holding the platform operator role.
    async fn find_any_operator(&self) -> Result<Option<User>>;
}
