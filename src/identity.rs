use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

use crate::models::Identity;

/// Header honoured by the local development bypass.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Credentials
///
/// Everything the identity provider may need from an inbound request. Extracted once
/// per request from the headers; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    /// Access token from `Authorization: Bearer` or, failing that, the session cookie.
    pub access_token: Option<String>,
    /// Value of the `x-user-id` header, only meaningful where the dev bypass is enabled.
    pub dev_user_id: Option<Uuid>,
}

impl Credentials {
    /// from_headers
    ///
    /// The bearer header wins over the cookie so that API clients can override a stale
    /// browser session.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        let access_token = bearer.or_else(|| cookie_value(headers, cookie_name));

        let dev_user_id = headers
            .get(DEV_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());

        Self {
            access_token,
            dev_user_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.dev_user_id.is_none()
    }
}

/// The token of a `Bearer` authorization value. The scheme name is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reads one cookie out of every `Cookie` header of the request.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// IdentityError
///
/// Why the identity provider could not answer. Callers of the gateway never see these;
/// the resolver logs them and treats the request as anonymous.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("access token expired")]
    Expired,
    #[error("access token rejected: {0}")]
    InvalidToken(String),
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider answered {0}")]
    UnexpectedStatus(u16),
}

/// IdentityProvider
///
/// The "get current user" contract of the external identity service.
/// `Ok(None)` means the request carries no usable session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_current_user(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, IdentityError>;
}

/// IdentityState
///
/// The injected identity provider handle held by the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

/// Claims
///
/// The subset of a Supabase access token payload the gateway relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user id; primary key of `public.profiles`.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    /// Supabase issues `authenticated` for signed-in users.
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// JwtIdentityProvider
///
/// Verifies the access token in-process with the project's JWT secret. Used locally,
/// where it also honours the `x-user-id` bypass header.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    allow_dev_bypass: bool,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, allow_dev_bypass: bool) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            allow_dev_bypass,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn get_current_user(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, IdentityError> {
        if self.allow_dev_bypass {
            if let Some(id) = credentials.dev_user_id {
                tracing::debug!(%id, "dev bypass header accepted");
                return Ok(Some(Identity { id, email: None }));
            }
        }

        let Some(token) = credentials.access_token.as_deref() else {
            return Ok(None);
        };

        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.set_audience(&["authenticated"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(Some(Identity {
            id: data.claims.sub,
            email: data.claims.email,
        }))
    }
}

/// SupabaseUser
///
/// Minimal deserialization target for the `/auth/v1/user` response.
#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// SupabaseIdentityProvider
///
/// Asks the Supabase auth API who owns the token. Authoritative: a revoked session
/// stops resolving on the very next request. The underlying `reqwest::Client` keeps
/// its own connection pool, and every call is bounded by `timeout` so a stalled
/// provider degrades the request to anonymous instead of hanging it.
#[derive(Clone)]
pub struct SupabaseIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentityProvider {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn get_current_user(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, IdentityError> {
        let Some(token) = credentials.access_token.as_deref() else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            // Expired or revoked session: a valid answer meaning "nobody".
            return Ok(None);
        }
        if !status.is_success() {
            return Err(IdentityError::UnexpectedStatus(status.as_u16()));
        }

        let user = response.json::<SupabaseUser>().await?;
        Ok(Some(Identity {
            id: user.id,
            email: user.email,
        }))
    }
}

/// StaticIdentityProvider
///
/// A fixed-answer provider for tests. Counts calls so tests can assert the
/// exactly-once lookup contract.
#[derive(Default)]
pub struct StaticIdentityProvider {
    /// The identity returned for any request carrying credentials.
    pub identity: Option<Identity>,
    /// When true, every call fails as if the provider were unreachable.
    pub should_fail: bool,
    calls: std::sync::atomic::AtomicUsize,
}

impl StaticIdentityProvider {
    pub fn returning(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_current_user(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Identity>, IdentityError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.should_fail {
            return Err(IdentityError::UnexpectedStatus(503));
        }
        if credentials.is_empty() {
            return Ok(None);
        }
        Ok(self.identity.clone())
    }
}
