use crate::{AppState, config::RoutePaths, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Pages exclusively for the 'admin' role. The gateway keeps other roles out by path;
/// each handler also takes the `AdminPage` extractor so the check holds even if this
/// router is ever mounted outside the gateway.
pub fn admin_routes(routes: &RoutePaths) -> Router<AppState> {
    Router::new().route(&routes.admin_root, get(handlers::admin_dashboard))
}
