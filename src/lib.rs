//! Bulkhead - multi-tenant access control for axum services
//!
//! Bulkhead decides, for every request, who the caller is and what they may
//! touch. It is built on Axum and Tokio and covers:
//!
//! - **Sessions**: resolve a cookie or bearer credential to a verified identity
//! - **Platform roles**: operator-only administration endpoints
//! - **Organizations**: membership guards with OWNER / ADMIN / USER roles
//! - **Invitations**: create, resend, cancel and accept with lazy expiry
//! - **Testing**: in-memory store, fixtures and a request scenario builder
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bulkhead::{AppState, ConfigBuilder, InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     bulkhead::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build().unwrap();
//!     let app = bulkhead::router(AppState::new(InMemoryStore::new(), config));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod admin;
mod app;
pub mod auth;
mod config;
mod error;
pub mod http;
pub mod model;
pub mod organizations;
pub mod roles;
pub mod store;
pub mod testing;
pub mod utils;

// Re-exports for public API
pub use app::AppState;
pub use auth::{
    Authenticated, Authorizer, OrgAccess, OrgMember, OrgMembershipGuard, PlatformOperator,
    PlatformRoleGuard, Principal, SessionResolver, SessionVerifier,
};
pub use config::{Config, ConfigBuilder, InvitationConfig, LoggingConfig, SessionConfig};
pub use error::{BulkheadError, ErrorCode, ErrorResponse, Result};
pub use http::{ApiJson, CreatedResponse, MessageResponse, RouteModule, router};
pub use roles::{OrgRole, PlatformRole, RoleSet};
pub use store::{IdentityStore, InMemoryStore};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// Call this early in `main`, before building the router.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "bulkhead=debug")
/// - `BULKHEAD_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing from a loaded [`Config`].
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
