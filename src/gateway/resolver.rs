use super::CallerContext;
use crate::{
    identity::{Credentials, IdentityProvider},
    repository::{Repository, RepositoryError},
};

/// resolve
///
/// Turns the request credentials into a [`CallerContext`].
///
/// Exactly one identity lookup per request, and at most one profile lookup. Every
/// collaborator failure degrades instead of propagating:
/// - provider error or no session → `Anonymous`
/// - profile missing or repository error → `IdentifiedNoProfile`
///
/// Nothing is cached between calls.
pub async fn resolve(
    identity: &dyn IdentityProvider,
    repo: &dyn Repository,
    credentials: &Credentials,
) -> CallerContext {
    let current = match identity.get_current_user(credentials).await {
        Ok(Some(current)) => current,
        Ok(None) => return CallerContext::Anonymous,
        Err(e) => {
            tracing::warn!(error = %e, "identity lookup failed, treating caller as anonymous");
            return CallerContext::Anonymous;
        }
    };

    match repo.get_profile(current.id).await {
        Ok(profile) => CallerContext::Identified(profile),
        Err(RepositoryError::NotFound) => {
            tracing::info!(user_id = %current.id, "no profile record, using default profile");
            CallerContext::IdentifiedNoProfile(current)
        }
        Err(e) => {
            tracing::warn!(user_id = %current.id, error = %e, "profile lookup failed");
            CallerContext::IdentifiedNoProfile(current)
        }
    }
}
