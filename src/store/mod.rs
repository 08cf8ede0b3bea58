//! Storage traits for the identity store.
//!
//! The identity store is the single shared mutable resource. Implement these
//! traits for your database layer; [`InMemoryStore`] implements all of them.
//!
//! The race-sensitive sequences are single trait methods so that an
//! implementation can run each inside one transaction or conditional write:
//!
//! - [`UserStore::update_user`] and [`UserStore::set_ban`]
//! - [`OrganizationStore::update_organization`]
//! - [`InvitationStore::insert_invitation_if_no_pending`]
//! - [`InvitationStore::renew_invitation`]
//! - [`InvitationStore::accept_invitation`]
//! - [`MembershipStore::remove_membership_unless_last_owner`]
//! - [`SessionStore::bind_active_organization`]

mod invitation;
mod membership;
mod memory;
mod organization;
mod session;
mod user;

pub use invitation::InvitationStore;
pub use membership::{MembershipRemoval, MembershipStore};
pub use memory::InMemoryStore;
pub use organization::{OrganizationChanges, OrganizationStore};
pub use session::{ActiveOrganizationBinding, SessionStore};
pub use user::{UserChanges, UserStore};

/// Every storage capability the access-control layer needs, as one bound.
///
/// Blanket-implemented for any type implementing all of the storage traits.
pub trait IdentityStore:
    UserStore + OrganizationStore + MembershipStore + InvitationStore + SessionStore + Clone + 'static
{
}

impl<T> IdentityStore for T where
    T: UserStore
        + OrganizationStore
        + MembershipStore
        + InvitationStore
        + SessionStore
        + Clone
        + 'static
{
}
