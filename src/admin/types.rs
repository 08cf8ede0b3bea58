//! Admin request bodies.

use serde::{Deserialize, Serialize};

use crate::roles::PlatformRole;

/// Parameters for creating an account administratively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    /// Defaults to STANDARD.
    #[serde(default)]
    pub platform_role: Option<PlatformRole>,
    #[serde(default)]
    pub email_verified: bool,
}

/// Parameters for updating a user; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub platform_role: Option<PlatformRole>,
    pub email_verified: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanUser {
    #[serde(default)]
    pub reason: Option<String>,
}
