use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::InvitationStatus;

/// Stable machine-readable error codes.
///
/// The serialized spelling of every variant is part of the public contract
/// and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthenticated,
    SessionNotFound,
    Forbidden,
    NotOrgMember,
    InsufficientOrgRole,
    MissingOrganizationId,
    InvalidEmail,
    InvalidSlug,
    InvalidRequest,
    OrgNotFound,
    MemberNotFound,
    InvitationNotFound,
    UserNotFound,
    SlugExists,
    EmailExists,
    AlreadyMember,
    InvitationExists,
    LastOwner,
    InvitationNotPending,
    InvitationExpired,
    InvitationEmailMismatch,
    NoInviterAvailable,
    InternalError,
}

impl ErrorCode {
    /// The wire spelling of this code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::NotOrgMember => "NOT_ORG_MEMBER",
            Self::InsufficientOrgRole => "INSUFFICIENT_ORG_ROLE",
            Self::MissingOrganizationId => "MISSING_ORGANIZATION_ID",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidSlug => "INVALID_SLUG",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::OrgNotFound => "ORG_NOT_FOUND",
            Self::MemberNotFound => "MEMBER_NOT_FOUND",
            Self::InvitationNotFound => "INVITATION_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::SlugExists => "SLUG_EXISTS",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::InvitationExists => "INVITATION_EXISTS",
            Self::LastOwner => "LAST_OWNER",
            Self::InvitationNotPending => "INVITATION_NOT_PENDING",
            Self::InvitationExpired => "INVITATION_EXPIRED",
            Self::InvitationEmailMismatch => "INVITATION_EMAIL_MISMATCH",
            Self::NoInviterAvailable => "NO_INVITER_AVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type for every guard, manager and store operation.
#[derive(Debug, thiserror::Error)]
pub enum BulkheadError {
    /// No credential, unknown or expired session, or the account is gone.
    ///
    /// Deliberately carries no detail: every authentication failure looks
    /// the same to the client.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unauthorized: {message}")]
    Unauthorized { code: ErrorCode, message: String },

    #[error("Forbidden: {message}")]
    Forbidden { code: ErrorCode, message: String },

    #[error("Not found: {message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("Bad request: {message}")]
    BadRequest { code: ErrorCode, message: String },

    #[error("Conflict: {message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { code: ErrorCode, message: String },

    #[error("Internal error: {message}")]
    Internal { code: ErrorCode, message: String },
}

/// Body of every error response: `{error, message, code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: ErrorCode,
}

impl BulkheadError {
    pub fn unauthorized(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: msg.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            message: msg.into(),
        }
    }

    pub fn not_found(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: msg.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: msg.into(),
        }
    }

    pub fn conflict(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: msg.into(),
        }
    }

    pub fn invalid_operation(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::InvalidOperation {
            code,
            message: msg.into(),
        }
    }

    /// Unexpected failure, typically from the store.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            message: msg.into(),
        }
    }

    pub fn session_not_found() -> Self {
        Self::unauthorized(ErrorCode::SessionNotFound, "session not found")
    }

    pub fn insufficient_platform_role() -> Self {
        Self::forbidden(ErrorCode::Forbidden, "insufficient platform role")
    }

    pub fn not_member() -> Self {
        Self::forbidden(ErrorCode::NotOrgMember, "not a member")
    }

    pub fn insufficient_org_role() -> Self {
        Self::forbidden(ErrorCode::InsufficientOrgRole, "insufficient organization role")
    }

    pub fn org_not_found(org_id: &str) -> Self {
        Self::not_found(
            ErrorCode::OrgNotFound,
            format!("organization not found: {org_id}"),
        )
    }

    pub fn member_not_found(member_id: &str) -> Self {
        Self::not_found(
            ErrorCode::MemberNotFound,
            format!("member not found: {member_id}"),
        )
    }

    pub fn invitation_not_found(invitation_id: &str) -> Self {
        Self::not_found(
            ErrorCode::InvitationNotFound,
            format!("invitation not found: {invitation_id}"),
        )
    }

    pub fn user_not_found(user_id: &str) -> Self {
        Self::not_found(ErrorCode::UserNotFound, format!("user not found: {user_id}"))
    }

    pub fn slug_exists(slug: &str) -> Self {
        Self::conflict(ErrorCode::SlugExists, format!("slug already taken: {slug}"))
    }

    pub fn email_exists(email: &str) -> Self {
        Self::conflict(
            ErrorCode::EmailExists,
            format!("email already registered: {email}"),
        )
    }

    pub fn already_member(email: &str) -> Self {
        Self::conflict(
            ErrorCode::AlreadyMember,
            format!("{email} is already a member of this organization"),
        )
    }

    pub fn invitation_exists(email: &str) -> Self {
        Self::conflict(
            ErrorCode::InvitationExists,
            format!("{email} already has a pending invitation to this organization"),
        )
    }

    pub fn last_owner() -> Self {
        Self::invalid_operation(
            ErrorCode::LastOwner,
            "cannot remove the last owner of an organization",
        )
    }

    /// Rejection for accepting an invitation that is no longer open.
    pub fn invitation_not_pending(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Expired => {
                Self::bad_request(ErrorCode::InvitationExpired, "invitation has expired")
            }
            status => Self::bad_request(
                ErrorCode::InvitationNotPending,
                format!("invitation is not pending (status: {})", status.as_str()),
            ),
        }
    }

    pub fn invitation_email_mismatch() -> Self {
        Self::forbidden(
            ErrorCode::InvitationEmailMismatch,
            "invitation was issued to a different email address",
        )
    }

    pub fn missing_organization_id() -> Self {
        Self::bad_request(ErrorCode::MissingOrganizationId, "organization id is required")
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::bad_request(ErrorCode::InvalidEmail, format!("invalid email address: {email}"))
    }

    pub fn invalid_slug(slug: &str) -> Self {
        Self::bad_request(
            ErrorCode::InvalidSlug,
            format!("invalid slug: {slug} (lower-case letters, digits and single hyphens)"),
        )
    }

    pub fn empty_organization_name() -> Self {
        Self::bad_request(ErrorCode::InvalidRequest, "organization name must not be empty")
    }

    pub fn no_inviter_available() -> Self {
        Self::Internal {
            code: ErrorCode::NoInviterAvailable,
            message: "no platform operator is available to attribute the invitation".to_string(),
        }
    }

    /// The stable machine code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::Unauthorized { code, .. }
            | Self::Forbidden { code, .. }
            | Self::NotFound { code, .. }
            | Self::BadRequest { code, .. }
            | Self::Conflict { code, .. }
            | Self::InvalidOperation { code, .. }
            | Self::Internal { code, .. } => *code,
        }
    }

    /// The error category reported in the `error` field.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Unauthenticated | Self::Unauthorized { .. } => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::BadRequest { .. } => "bad_request",
            Self::Conflict { .. } => "conflict",
            Self::InvalidOperation { .. } => "invalid_operation",
            Self::Internal { .. } => "internal",
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::InvalidOperation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for clients.
    ///
    /// Server-side failures never leak their detail (CWE-209); the full error
    /// is logged instead.
    fn safe_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Authentication required".to_string(),
            Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::BadRequest { message, .. }
            | Self::Conflict { message, .. }
            | Self::InvalidOperation { message, .. } => message.clone(),
            Self::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Build the response body for this error.
    #[must_use]
    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.category().to_string(),
            message: self.safe_message(),
            code: self.code(),
        }
    }
}

impl IntoResponse for BulkheadError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                code = %self.code(),
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                code = %self.code(),
                error = %self,
                "Request rejected"
            );
        }

        (status, Json(self.to_response_body())).into_response()
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, BulkheadError>;
