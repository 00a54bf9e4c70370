use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{
    policy::{decide, decision_response},
    resolver::resolve,
};
use crate::{AppState, identity::Credentials};

/// session_gateway
///
/// Installed around every route. Resolves the caller, runs the routing policy against
/// the request path and either forwards the request (with the resolved
/// [`CallerContext`](super::CallerContext) attached as an extension) or answers with
/// the redirect/denial itself.
///
/// If the client disconnects while a lookup is pending, the server drops this future
/// and no decision is ever applied.
pub async fn session_gateway(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = Credentials::from_headers(request.headers(), &state.config.session_cookie);
    let context = resolve(state.identity.as_ref(), state.repo.as_ref(), &credentials).await;

    let path = request.uri().path().to_string();
    let decision = decide(&context, &path, &state.config.routes);

    match decision_response(decision) {
        Some(response) => {
            tracing::debug!(path = %path, status = %response.status(), "gateway short-circuited request");
            response
        }
        None => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
    }
}
