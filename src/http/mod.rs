//! HTTP surface: route modules, extractors and response types.

mod json;
mod organizations;
mod platform;
mod response;
mod routes;

use axum::Router;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::app::AppState;
use crate::store::IdentityStore;

pub use json::ApiJson;
pub use organizations::OrganizationRoutes;
pub use platform::PlatformRoutes;
pub use response::{CreatedResponse, JsonResponse, MessageResponse};
pub use routes::RouteModule;

/// Build the complete application router over `state`.
///
/// Every request gets an `x-request-id` (generated unless the client sent
/// one) and an HTTP trace span.
pub fn router<S: IdentityStore>(state: AppState<S>) -> Router {
    let router: Router<AppState<S>> = Router::new();
    let router = OrganizationRoutes.register(router);
    let router = PlatformRoutes.register(router);

    router
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request id generator backed by UUID v4.
#[derive(Clone, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}
