//! Platform administration of accounts.
//!
//! Every operation here sits behind the platform-operator guard. Banning does
//! not touch sessions: the session resolver re-reads ban state on each
//! request, so a banned account is locked out immediately.

mod manager;
mod types;

pub use manager::AdminManager;
pub use types::{BanUser, CreateUser, UpdateUser};
