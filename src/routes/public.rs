use crate::{AppState, config::RoutePaths, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// The site root and the sign-in page. Anonymous callers may reach both; signed-in
/// callers hitting the root are redirected by the gateway before the handler runs.
pub fn public_routes(routes: &RoutePaths) -> Router<AppState> {
    Router::new()
        .route(&routes.root, get(handlers::landing))
        .route(&routes.login, get(handlers::login_page))
}
