use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};

use super::{
    CallerContext, DenyReason,
    policy::{decide_admin_api, decide_admin_page, decision_response},
    resolver::resolve,
};
use crate::{
    config::AppConfig,
    identity::{Credentials, IdentityState},
    models::CallerProfile,
    repository::RepositoryState,
};

/// Reads the context the gateway attached to the request. If it is missing (the
/// route was mounted outside the gateway), the caller is resolved again here.
async fn current_context<S>(parts: &Parts, state: &S) -> CallerContext
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    IdentityState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    if let Some(context) = parts.extensions.get::<CallerContext>() {
        return context.clone();
    }

    let config = AppConfig::from_ref(state);
    let repo = RepositoryState::from_ref(state);
    let identity = IdentityState::from_ref(state);

    tracing::warn!(path = %parts.uri.path(), "no gateway context on request, resolving in guard");
    let credentials = Credentials::from_headers(&parts.headers, &config.session_cookie);
    resolve(identity.as_ref(), repo.as_ref(), &credentials).await
}

/// Caller
///
/// Any identified caller, with the profile routing used for them. Anonymous callers
/// are rejected with 401.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerProfile);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    IdentityState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        current_context(parts, state)
            .await
            .effective_profile()
            .map(Caller)
            .ok_or_else(|| DenyReason::Unauthenticated.into_response())
    }
}

/// AdminPage
///
/// Render-time admin check for pages in the admin section. Redirects to login (not to
/// the vendor section) when the role is anything but admin, so a misconfigured or
/// bypassed gateway still never renders an admin page.
#[derive(Debug, Clone)]
pub struct AdminPage(pub CallerProfile);

impl<S> FromRequestParts<S> for AdminPage
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    IdentityState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let context = current_context(parts, state).await;

        if let Some(response) = decision_response(decide_admin_page(&context, &config.routes)) {
            return Err(response);
        }
        context
            .effective_profile()
            .map(AdminPage)
            .ok_or_else(|| DenyReason::Unauthenticated.into_response())
    }
}

/// AdminApi
///
/// Admin check for JSON endpoints: 401 for anonymous callers, 403 for other roles.
#[derive(Debug, Clone)]
pub struct AdminApi(pub CallerProfile);

impl<S> FromRequestParts<S> for AdminApi
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    IdentityState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = current_context(parts, state).await;

        if let Some(response) = decision_response(decide_admin_api(&context)) {
            return Err(response);
        }
        context
            .effective_profile()
            .map(AdminApi)
            .ok_or_else(|| DenyReason::Unauthenticated.into_response())
    }
}
