use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use super::CallerContext;
use crate::{
    config::RoutePaths,
    models::{AccountStatus, CallerProfile, Role},
};

/// RoutingDecision
///
/// The gateway's verdict for one request. Computed fresh every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Allow,
    RedirectTo(String),
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity could be resolved.
    Unauthenticated,
    /// Identified, but the role is not allowed here.
    NotAdmin,
}

impl IntoResponse for DenyReason {
    fn into_response(self) -> Response {
        match self {
            DenyReason::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            DenyReason::NotAdmin => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// default_profile
///
/// The profile assumed for an identity with no stored record: an unprovisioned vendor.
/// Never an admin.
pub fn default_profile(id: Uuid) -> CallerProfile {
    CallerProfile {
        id,
        role: Role::Vendor,
        status: AccountStatus::Active,
    }
}

/// decide
///
/// The ordered routing policy; the first matching rule wins and the last one is a
/// catch-all, so every `(context, path)` pair has exactly one decision.
///
/// 1. Anonymous callers only reach the auth section, the API, the root, and the
///    login page itself. Everything else redirects to login.
/// 2. An identity without a profile is routed as [`default_profile`].
/// 3. The root is never served to a signed-in caller; it redirects to the caller's section.
/// 4. The admin section is closed to every role other than admin.
/// 5. Everything else is allowed.
pub fn decide(context: &CallerContext, path: &str, routes: &RoutePaths) -> RoutingDecision {
    let profile = match context {
        CallerContext::Anonymous => {
            return if is_anonymous_reachable(path, routes) {
                RoutingDecision::Allow
            } else {
                RoutingDecision::RedirectTo(routes.login.clone())
            };
        }
        CallerContext::Identified(profile) => profile.clone(),
        CallerContext::IdentifiedNoProfile(identity) => default_profile(identity.id),
    };

    if path == routes.root {
        let target = if profile.role.is_admin() {
            &routes.admin_root
        } else {
            &routes.vendor_root
        };
        return RoutingDecision::RedirectTo(target.clone());
    }

    // Covers vendors and any role introduced later alike.
    if is_under(path, &routes.admin_prefix) && !profile.role.is_admin() {
        tracing::debug!(role = %profile.role, path, "non-admin kept out of admin section");
        return RoutingDecision::RedirectTo(routes.vendor_root.clone());
    }

    RoutingDecision::Allow
}

/// decide_admin_page
///
/// Render-time gate for admin pages, independent of [`decide`]: anything but an
/// admin profile goes to login.
pub fn decide_admin_page(context: &CallerContext, routes: &RoutePaths) -> RoutingDecision {
    match context.effective_profile() {
        Some(profile) if profile.role == Role::Admin => RoutingDecision::Allow,
        _ => RoutingDecision::RedirectTo(routes.login.clone()),
    }
}

/// decide_admin_api
///
/// The same check for JSON endpoints, which deny instead of redirecting.
pub fn decide_admin_api(context: &CallerContext) -> RoutingDecision {
    match context.effective_profile() {
        None => RoutingDecision::Deny(DenyReason::Unauthenticated),
        Some(profile) if profile.role == Role::Admin => RoutingDecision::Allow,
        Some(_) => RoutingDecision::Deny(DenyReason::NotAdmin),
    }
}

/// Converts a non-`Allow` decision into the response that realizes it.
/// `Allow` has no response of its own and yields `None`.
pub fn decision_response(decision: RoutingDecision) -> Option<Response> {
    match decision {
        RoutingDecision::Allow => None,
        RoutingDecision::RedirectTo(target) => Some(Redirect::temporary(&target).into_response()),
        RoutingDecision::Deny(reason) => Some(reason.into_response()),
    }
}

fn is_anonymous_reachable(path: &str, routes: &RoutePaths) -> bool {
    path == routes.root
        || path == routes.login
        || is_under(path, &routes.auth_prefix)
        || is_under(path, &routes.api_prefix)
}

/// Segment-aware prefix match: `/admin` covers `/admin` and `/admin/x/y`, not `/administrator`.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
