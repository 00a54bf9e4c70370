use crate::{AppState, config::RoutePaths, handlers};
use axum::{Router, routing::get};

/// Vendor Router Module
///
/// Pages for signed-in vendors. The gateway has already sent anonymous callers to login.
pub fn vendor_routes(routes: &RoutePaths) -> Router<AppState> {
    Router::new().route(&routes.vendor_root, get(handlers::vendor_dashboard))
}
