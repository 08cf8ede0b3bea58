use axum::Router;

use crate::app::AppState;
use crate::store::IdentityStore;

/// Trait for composable route modules
///
/// Each module registers its own routes and is composed into the main router.
/// Handlers take `State<AppState<S>>` or one of the auth extractors.
///
/// # Example
///
/// ```ignore
/// struct ReportsModule;
///
/// impl<S: IdentityStore> RouteModule<S> for ReportsModule {
///     fn routes(&self) -> Router<AppState<S>> {
///         Router::new().route("/reports", get(list_reports::<S>))
///     }
/// }
/// ```
pub trait RouteModule<S: IdentityStore> {
    /// Returns a router with all routes for this module; state is applied by
    /// [`router`](super::router).
    fn routes(&self) -> Router<AppState<S>>;

    /// Optional: specify a path prefix for all routes in this module
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Registers this module's routes into the application router
    fn register(self, router: Router<AppState<S>>) -> Router<AppState<S>>
    where
        Self: Sized,
    {
        let routes = self.routes();

        if let Some(prefix) = self.prefix() {
            router.nest(prefix, routes)
        } else {
            router.merge(routes)
        }
    }
}
