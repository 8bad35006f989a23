//! # Identity Resolver
//!
//! Turns an opaque caller credential into a [`Principal`] once per request.
//!
//! ## Identity grammar
//!
//! ```text
//! identity  := prefix "/CN=" common-name "::/C=" issuer
//! ```
//!
//! The common name is the span between the first `/CN=` marker and the last
//! `::/C=` marker. Both markers are required, in that order, and the span
//! between them must be non-empty. Any deviation fails closed with
//! [`AssetError::MalformedIdentity`].

use super::errors::AssetError;
use crate::config::AssetConfig;
use crate::ports::outbound::CallerCredential;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Marker opening the subject common name.
pub const COMMON_NAME_MARKER: &str = "/CN=";

/// Marker opening the issuer distinguished name.
pub const ISSUER_MARKER: &str = "::/C=";

/// Attribute value that grants the admin role.
pub const ADMIN_ROLE: &str = "admin";

/// Role of a caller for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Administrative principal; may mutate assets.
    Admin,
    /// Caller carrying some other role attribute.
    Member(String),
    /// Caller with no role attribute.
    Unprivileged,
}

impl Role {
    /// Interpret a raw `usertype` attribute value.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some(ADMIN_ROLE) => Self::Admin,
            Some(other) if !other.is_empty() => Self::Member(other.to_string()),
            _ => Self::Unprivileged,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str(ADMIN_ROLE),
            Self::Member(name) => f.write_str(name),
            Self::Unprivileged => f.write_str("<none>"),
        }
    }
}

/// Resolved identity and role of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Convenience constructor for an administrative principal.
    #[must_use]
    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::Admin)
    }
}

/// Extract the subject common name from an identity string.
pub fn parse_common_name(identity: &str) -> Result<&str, AssetError> {
    let begin = identity
        .find(COMMON_NAME_MARKER)
        .ok_or_else(|| malformed(format!("missing `{COMMON_NAME_MARKER}` marker")))?;
    let end = identity
        .rfind(ISSUER_MARKER)
        .ok_or_else(|| malformed(format!("missing `{ISSUER_MARKER}` marker")))?;

    let start = begin + COMMON_NAME_MARKER.len();
    if end < start {
        return Err(malformed(format!(
            "`{ISSUER_MARKER}` precedes the common name"
        )));
    }

    let common_name = &identity[start..end];
    if common_name.is_empty() {
        return Err(malformed("empty common name".to_string()));
    }
    Ok(common_name)
}

fn malformed(reason: String) -> AssetError {
    AssetError::MalformedIdentity { reason }
}

/// Resolves principals against an allowlist of administrative common names.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    admin_principals: HashSet<String>,
    usertype_attribute: String,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            admin_principals: config.admin_principals.iter().cloned().collect(),
            usertype_attribute: config.usertype_attribute.clone(),
        }
    }

    /// The caller's common name.
    pub fn resolve_principal_id(
        &self,
        credential: &dyn CallerCredential,
    ) -> Result<String, AssetError> {
        parse_common_name(credential.id()).map(str::to_string)
    }

    /// The caller's role: admin for allowlisted names, otherwise the
    /// `usertype` attribute.
    pub fn resolve_role(&self, credential: &dyn CallerCredential) -> Result<Role, AssetError> {
        let id = self.resolve_principal_id(credential)?;
        Ok(self.role_for(&id, credential))
    }

    /// Build the request's [`Principal`].
    pub fn resolve(&self, credential: &dyn CallerCredential) -> Result<Principal, AssetError> {
        let id = self.resolve_principal_id(credential)?;
        let role = self.role_for(&id, credential);
        debug!(principal = %id, role = %role, "Resolved caller");
        Ok(Principal { id, role })
    }

    fn role_for(&self, id: &str, credential: &dyn CallerCredential) -> Role {
        if self.admin_principals.contains(id) {
            Role::Admin
        } else {
            Role::from_attribute(credential.attribute(&self.usertype_attribute))
        }
    }
}
