use crate::api::authentication::authentication_routes;
use crate::api::swagger_main::build_documentation;
use crate::routing_utils::{json_content_type, not_found};
use crate::{SharedData, logging};
use axum::Router;
use axum::http::{Method, header};
use axum::middleware;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Cross-origin policy for the API: any origin may call it with credentials, so the
/// request's own origin is echoed back rather than answered with a wildcard
fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Assembles every route the server exposes. API responses, unrouted paths included, are
/// always labelled as JSON; the swagger UI is merged in afterwards so its pages keep their own content types.
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let api = Router::new()
        .nest("/authentication", authentication_routes())
        .fallback(not_found)
        .layer(middleware::map_response(json_content_type));

    let router = Router::new()
        .merge(build_documentation())
        .merge(api)
        .layer(cors_policy());

    logging::trace_requests(router).with_state(shared_data)
}
