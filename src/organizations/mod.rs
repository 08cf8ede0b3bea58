//! Organization management for multi-tenant applications.
//!
//! - [`OrganizationManager`] creates, updates and deletes organizations
//! - [`MembershipManager`] lists and removes members, never the last owner
//! - [`InvitationManager`] drives the invitation lifecycle
//! - [`ActiveOrganizationBinder`] records the active organization of a session

mod binder;
mod invitations;
mod manager;
mod members;

pub use binder::ActiveOrganizationBinder;
pub use invitations::{CreateInvitation, InvitationManager};
pub use manager::{CreateOrganization, OrganizationManager, UpdateOrganization};
pub use members::MembershipManager;
