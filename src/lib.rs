use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod config;
pub mod gateway;
pub mod handlers;
pub mod identity;
pub mod images;
pub mod models;
pub mod repository;

// Section routers (public, vendor, admin, api).
pub mod routes;
use routes::{admin, api, public, vendor};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use gateway::{CallerContext, RoutingDecision};
pub use identity::{IdentityState, JwtIdentityProvider, SupabaseIdentityProvider};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the JSON API, served under the API prefix so the gateway
/// lets anonymous callers read it.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::get_me, handlers::normalize_images, handlers::list_vendors
    ),
    components(
        schemas(
            models::CallerSummary, models::NormalizeReport, models::VendorSummary,
            models::ImageRef, models::Identity,
        )
    ),
    tags(
        (name = "vendor-portal", description = "Vendor Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of injected collaborators shared by every request. Nothing
/// in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Profile and product records.
    pub repo: RepositoryState,
    /// "Get current user" against the identity provider.
    pub identity: IdentityState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles every section router behind the session gateway, then applies the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let paths = state.config.routes.clone();
    let api_prefix = paths.api_prefix.trim_end_matches('/').to_string();

    let base_router = Router::new()
        .merge(
            SwaggerUi::new(format!("{api_prefix}/docs"))
                .url(format!("{api_prefix}/openapi.json"), ApiDoc::openapi()),
        )
        .merge(public::public_routes(&paths))
        .merge(vendor::vendor_routes(&paths))
        .merge(admin::admin_routes(&paths))
        .nest(&api_prefix, api::api_routes())
        // Paths outside every section still pass through the gateway so that anonymous
        // callers are sent to login rather than shown a 404.
        .fallback(|| async { axum::http::StatusCode::NOT_FOUND })
        // The gateway runs in front of every route, including the fallback.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gateway::middleware::session_gateway,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above
/// so that the gateway's log lines correlate with the access log.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
