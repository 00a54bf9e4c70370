use crate::{
    AppState,
    gateway::{AdminApi, AdminPage, Caller, CallerContext},
    images,
    models::{CallerSummary, NormalizeReport, VendorSummary},
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::Html,
};

// --- Pages ---

/// landing
///
/// [Public Page] The site root. Only anonymous callers are ever served it; signed-in
/// callers are redirected to their section by the gateway.
pub async fn landing() -> Html<&'static str> {
    Html("<h1>Vendor Portal</h1><p><a href=\"/auth/login\">Sign in</a></p>")
}

/// login_page
///
/// [Auth Page] Placeholder for the sign-in form; the form posts to the identity provider.
pub async fn login_page() -> Html<&'static str> {
    Html("<h1>Sign in</h1>")
}

/// vendor_dashboard
///
/// [Vendor Page] Landing page of the vendor section.
pub async fn vendor_dashboard(Caller(profile): Caller) -> Html<String> {
    Html(format!(
        "<h1>Vendor dashboard</h1><p>Signed in as {} ({}).</p>",
        profile.id,
        profile.status.as_str()
    ))
}

/// admin_dashboard
///
/// [Admin Page] Landing page of the admin section. `AdminPage` re-checks the role at
/// render time on top of the gateway's path rules.
pub async fn admin_dashboard(AdminPage(profile): AdminPage) -> Html<String> {
    Html(format!("<h1>Admin dashboard</h1><p>Signed in as {}.</p>", profile.id))
}

// --- API ---

/// health
///
/// [Public API] Liveness check for load balancers.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_me
///
/// [Public API] Describes the caller as the gateway resolved it. Anonymous callers get
/// `kind = "anonymous"` rather than an error.
#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Resolved caller", body = CallerSummary))
)]
pub async fn get_me(Extension(context): Extension<CallerContext>) -> Json<CallerSummary> {
    Json(context.summary())
}

/// normalize_images
///
/// [Authenticated API] Rewrites the caller's own product images into the canonical
/// `{url, path}` form. Per-record failures are counted, not fatal.
#[utoipa::path(
    post,
    path = "/api/vendor/images/normalize",
    responses(
        (status = 200, description = "Normalization report", body = NormalizeReport),
        (status = 401, description = "No session"),
        (status = 500, description = "Products could not be listed")
    )
)]
pub async fn normalize_images(
    Caller(profile): Caller,
    State(state): State<AppState>,
) -> Result<Json<NormalizeReport>, StatusCode> {
    match images::normalize_owned_images(state.repo.as_ref(), profile.id).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!(owner_id = %profile.id, error = %e, "listing owned products failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// list_vendors
///
/// [Admin API] Lists every vendor profile.
#[utoipa::path(
    get,
    path = "/api/admin/vendors",
    responses(
        (status = 200, description = "Vendor profiles", body = [VendorSummary]),
        (status = 401, description = "No session"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_vendors(
    AdminApi(_admin): AdminApi,
    State(state): State<AppState>,
) -> Result<Json<Vec<VendorSummary>>, StatusCode> {
    state.repo.list_vendors().await.map(Json).map_err(|e| {
        tracing::error!(error = %e, "list_vendors failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
