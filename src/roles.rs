//! Platform and organization roles.
//!
//! Roles are closed enumerations parsed once at the boundary (store rows,
//! request bodies). Parsing is case-insensitive; serialization is always
//! upper-case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform-wide role, independent of any organization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum PlatformRole {
    /// Platform operator with access to the administrative surfaces.
    Operator,
    #[default]
    Standard,
}

impl PlatformRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "OPERATOR",
            Self::Standard => "STANDARD",
        }
    }

    #[must_use]
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator)
    }
}

/// Membership role within one organization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum OrgRole {
    Owner,
    Admin,
    #[default]
    User,
}

impl OrgRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    /// Get the hierarchy level (higher = more permissions).
    #[must_use]
    pub fn hierarchy_level(&self) -> u8 {
        match self {
            Self::Owner => 3,
            Self::Admin => 2,
            Self::User => 1,
        }
    }

    /// Check if this role has at least the permissions of another role.
    #[must_use]
    pub fn has_at_least(&self, other: &Self) -> bool {
        self.hierarchy_level() >= other.hierarchy_level()
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

/// Error returned when parsing a role string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid_value: String,
    expected: &'static str,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid role: '{}' (expected: {})",
            self.invalid_value, self.expected
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for PlatformRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPERATOR" => Ok(Self::Operator),
            "STANDARD" => Ok(Self::Standard),
            _ => Err(ParseRoleError {
                invalid_value: s.to_string(),
                expected: "OPERATOR or STANDARD",
            }),
        }
    }
}

impl FromStr for OrgRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(ParseRoleError {
                invalid_value: s.to_string(),
                expected: "OWNER, ADMIN or USER",
            }),
        }
    }
}

impl TryFrom<String> for PlatformRole {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for OrgRole {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PlatformRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of organization roles a guard admits.
///
/// An empty set admits any member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoleSet {
    owner: bool,
    admin: bool,
    user: bool,
}

impl RoleSet {
    /// Admit any member regardless of role.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            owner: false,
            admin: false,
            user: false,
        }
    }

    #[must_use]
    pub fn of(roles: &[OrgRole]) -> Self {
        let mut set = Self::any();
        for role in roles {
            match role {
                OrgRole::Owner => set.owner = true,
                OrgRole::Admin => set.admin = true,
                OrgRole::User => set.user = true,
            }
        }
        set
    }

    #[must_use]
    pub const fn owner_or_admin() -> Self {
        Self {
            owner: true,
            admin: true,
            user: false,
        }
    }

    #[must_use]
    pub const fn owner_only() -> Self {
        Self {
            owner: true,
            admin: false,
            user: false,
        }
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        !(self.owner || self.admin || self.user)
    }

    /// Whether a member holding `role` passes this set.
    #[must_use]
    pub fn permits(&self, role: OrgRole) -> bool {
        if self.is_any() {
            return true;
        }
        match role {
            OrgRole::Owner => self.owner,
            OrgRole::Admin => self.admin,
            OrgRole::User => self.user,
        }
    }
}
