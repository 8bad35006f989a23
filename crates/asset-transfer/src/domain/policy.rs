//! # Access Policy
//!
//! Decides whether a resolved role may perform a mutating operation.
//!
//! | Operation | Required role |
//! |-----------|---------------|
//! | `create`, `update`, `delete`, `transfer` | `admin` |
//!
//! Reads, listing, history and seeding never reach the policy.

use super::errors::AssetError;
use super::identity::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role-gated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Transfer,
}

impl Operation {
    /// Verb used in refusal messages.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Role gate in front of every mutating operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Create the policy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decide `role` against `operation`.
    #[must_use]
    pub fn decide(&self, role: &Role, operation: Operation) -> Decision {
        if role.is_admin() {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Gate `operation`, failing with [`AssetError::Unauthorized`] on deny.
    pub fn authorize(&self, role: &Role, operation: Operation) -> Result<(), AssetError> {
        match self.decide(role, operation) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AssetError::Unauthorized { operation }),
        }
    }
}
