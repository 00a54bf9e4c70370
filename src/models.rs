use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity & Authorization ---

/// Identity
///
/// The caller identity as reported by the identity provider. The gateway only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    /// Provider-issued user id, also the primary key of `public.profiles`.
    pub id: Uuid,
    pub email: Option<String>,
}

/// Role
///
/// The RBAC field of a profile. Unknown role strings are kept verbatim so that a role
/// introduced later is never silently promoted to either known role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Vendor,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::Other(raw) => raw,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "admin" => Role::Admin,
            "vendor" => Role::Vendor,
            _ => Role::Other(raw),
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        Role::from(raw.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AccountStatus
///
/// Provider-defined account state. Routing does not branch on it; it is carried for handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountStatus {
    Active,
    Pending,
    Other(String),
}

impl AccountStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Pending => "pending",
            AccountStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for AccountStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => AccountStatus::Active,
            "pending" => AccountStatus::Pending,
            _ => AccountStatus::Other(raw),
        }
    }
}

impl From<AccountStatus> for String {
    fn from(status: AccountStatus) -> Self {
        status.as_str().to_string()
    }
}

/// CallerProfile
///
/// The authorization profile of an identity. Owned by the profile repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerProfile {
    pub id: Uuid,
    pub role: Role,
    pub status: AccountStatus,
}

/// ProfileRow
///
/// Raw database row of `public.profiles`, converted into a `CallerProfile` by the repository.
#[derive(Debug, Clone, FromRow, Default)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
    pub status: Option<String>,
}

impl From<ProfileRow> for CallerProfile {
    fn from(row: ProfileRow) -> Self {
        CallerProfile {
            id: row.id,
            role: Role::from(row.role),
            // A row without an explicit status has never been suspended.
            status: row
                .status
                .map(AccountStatus::from)
                .unwrap_or(AccountStatus::Active),
        }
    }
}

// --- Output Schemas ---

/// CallerSummary
///
/// Output schema for `GET /api/me`: the gateway's view of the current caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CallerSummary {
    /// "anonymous" | "identified" | "identified_no_profile"
    pub kind: String,
    pub id: Option<Uuid>,
    /// Effective role used for routing (the default profile applies when no record exists).
    pub role: Option<String>,
    pub status: Option<String>,
}

/// VendorSummary
///
/// Output schema for the admin vendor listing (`GET /api/admin/vendors`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct VendorSummary {
    pub id: Uuid,
    pub email: Option<String>,
    pub status: Option<String>,
}

// --- Image References ---

/// ImageItem
///
/// One entry of a product's `images` column as it may appear in storage: either a legacy
/// bare URL or an object that may or may not already carry the canonical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageItem {
    Url(String),
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

/// ImageRef
///
/// The canonical image reference. `path` is relative to the storage public root, so
/// `{root}/{path}` always addresses the stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImageRef {
    pub url: String,
    pub path: String,
}

impl From<ImageRef> for ImageItem {
    fn from(image: ImageRef) -> Self {
        ImageItem::Object {
            url: Some(image.url),
            path: Some(image.path),
        }
    }
}

/// ProductImages
///
/// The slice of a `public.products` row the normalizer reads and rewrites. `images` is
/// kept as raw JSON so that one malformed record cannot fail the whole listing.
#[derive(Debug, Clone, FromRow)]
pub struct ProductImages {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub images: Option<sqlx::types::Json<serde_json::Value>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// NormalizeReport
///
/// Output of a normalizer run for one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NormalizeReport {
    /// Records owned by the caller that were inspected.
    pub scanned: u32,
    /// Records actually rewritten.
    pub updated: u32,
    /// Records whose images could not be parsed or whose update failed.
    pub failed: u32,
}
