//! Request authentication and authorization.
//!
//! A request first passes the [`SessionResolver`], which turns the session
//! credential into an [`Identity`](crate::model::Identity), and then one of
//! the guards in [`guards`]. Handlers normally consume the results through the
//! axum extractors in [`extractors`].

mod credentials;
pub mod extractors;
pub mod guards;
mod resolver;
mod verifier;

pub use credentials::{CredentialExtractor, ORG_ID_PARAM, RequestContext};
pub use extractors::{AnyMember, Authenticated, OrgMember, OrgPolicy, OwnerOnly, OwnerOrAdmin, PlatformOperator};
pub use guards::{Authorizer, OrgAccess, OrgMembershipGuard, PlatformRoleGuard};
pub use resolver::{Principal, SessionResolver};
pub use verifier::{SessionVerifier, StoreSessionVerifier, VerifiedSession};
