//! Testing utilities
//!
//! - Alba-style HTTP endpoint testing without running a server
//! - Builders and fake data for seeding an in-memory identity store

mod fixtures;
mod scenario;

pub use fixtures::{TestUser, fake, invitation_for, membership, organization, user};
pub use scenario::{Scenario, ScenarioAssert, delete, get, patch, post};
