//! Session resolution and role-based routing.
//!
//! Every request passes through [`middleware::session_gateway`], which resolves the
//! caller ([`resolver::resolve`]), asks the policy engine for a verdict
//! ([`policy::decide`]) and applies it. Handlers that need a stricter check layer the
//! extractors from [`guards`] on top.

pub mod guards;
pub mod middleware;
pub mod policy;
pub mod resolver;

use uuid::Uuid;

use crate::models::{CallerProfile, CallerSummary, Identity};

pub use guards::{AdminApi, AdminPage, Caller};
pub use policy::{DenyReason, RoutingDecision, decide, default_profile};
pub use resolver::resolve;

/// CallerContext
///
/// Request-scoped description of who is calling. Recomputed on every request and
/// never persisted, so a role change takes effect on the next request.
#[derive(Debug, Clone, PartialEq)]
pub enum CallerContext {
    /// No identity, or the identity provider could not answer.
    Anonymous,
    /// Identity with a stored authorization profile.
    Identified(CallerProfile),
    /// Identity whose profile lookup failed (missing row or repository unreachable).
    IdentifiedNoProfile(Identity),
}

impl CallerContext {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, CallerContext::Anonymous)
    }

    pub fn identity_id(&self) -> Option<Uuid> {
        match self {
            CallerContext::Anonymous => None,
            CallerContext::Identified(profile) => Some(profile.id),
            CallerContext::IdentifiedNoProfile(identity) => Some(identity.id),
        }
    }

    /// The profile routing decisions are made against. An identity without a stored
    /// profile gets [`default_profile`].
    pub fn effective_profile(&self) -> Option<CallerProfile> {
        match self {
            CallerContext::Anonymous => None,
            CallerContext::Identified(profile) => Some(profile.clone()),
            CallerContext::IdentifiedNoProfile(identity) => Some(default_profile(identity.id)),
        }
    }

    pub fn summary(&self) -> CallerSummary {
        let kind = match self {
            CallerContext::Anonymous => "anonymous",
            CallerContext::Identified(_) => "identified",
            CallerContext::IdentifiedNoProfile(_) => "identified_no_profile",
        };
        let profile = self.effective_profile();

        CallerSummary {
            kind: kind.to_string(),
            id: self.identity_id(),
            role: profile.as_ref().map(|p| p.role.to_string()),
            status: profile.map(|p| p.status.as_str().to_string()),
        }
    }
}
