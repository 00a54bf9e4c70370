use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// API Router Module
///
/// JSON endpoints, nested under the configured API prefix. The gateway lets every
/// caller through to this section; each handler applies its own extractor
/// (`Caller`, `AdminApi`) and answers 401/403 instead of redirecting.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        .route("/health", get(handlers::health))
        // GET /api/me
        // The gateway's view of the caller, including the default-profile fallback.
        .route("/me", get(handlers::get_me))
        // POST /api/vendor/images/normalize
        // Owner-scoped repair of legacy image references.
        .route("/vendor/images/normalize", post(handlers::normalize_images))
        // GET /api/admin/vendors
        .route("/admin/vendors", get(handlers::list_vendors))
}
