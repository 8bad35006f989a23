//! # Error Types
//!
//! Failures surfaced by the asset lifecycle engine and its collaborators.

use super::policy::Operation;
use thiserror::Error;

// =============================================================================
// ASSET ERRORS
// =============================================================================

/// Errors returned to the caller of an asset operation.
///
/// Every variant is terminal for the enclosing transaction: preconditions are
/// checked before any write is buffered, so a failed call leaves no state
/// change and no event behind.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The caller's role does not permit the operation.
    #[error("This user does not have access to {operation} an asset")]
    Unauthorized { operation: Operation },

    /// `create` against a key that already holds a value.
    #[error("The asset {id} already exists")]
    AlreadyExists { id: String },

    /// The key is absent or holds an empty value.
    #[error("The asset {id} does not exist")]
    NotFound { id: String },

    /// The caller credential's identity string did not match the expected grammar.
    #[error("Malformed identity: {reason}")]
    MalformedIdentity { reason: String },

    /// A stored value could not be decoded where a typed asset is required.
    #[error("The asset {id} holds an undecodable value: {reason}")]
    Corrupted { id: String, reason: String },

    /// An invocation argument was missing or could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The invoked function name is not part of the contract.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The underlying ledger failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AssetError {
    /// Returns true if the failure came from the access policy.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns true if the failure was a missing asset.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors raised by the ledger store adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A ledger lock was poisoned by a panicking writer.
    #[error("ledger lock poisoned")]
    LockPoisoned,

    /// A history cursor was read after being closed.
    #[error("history cursor already closed")]
    CursorClosed,

    /// Keys must be non-empty.
    #[error("empty key")]
    EmptyKey,

    /// Events must carry a name.
    #[error("event name must not be empty")]
    EmptyEventName,

    /// A key read by the transaction changed before it committed.
    #[error("read conflict on key {key}")]
    Conflict { key: String },

    /// The storage engine rejected the request.
    #[error("storage failure: {0}")]
    Storage(String),

    /// A value could not be encoded for storage or emission.
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_names_operation() {
        let err = AssetError::Unauthorized {
            operation: Operation::Transfer,
        };
        assert_eq!(
            err.to_string(),
            "This user does not have access to transfer an asset"
        );
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_existence_messages() {
        let err = AssetError::AlreadyExists {
            id: "asset1".to_string(),
        };
        assert_eq!(err.to_string(), "The asset asset1 already exists");

        let err = AssetError::NotFound {
            id: "asset9".to_string(),
        };
        assert_eq!(err.to_string(), "The asset asset9 does not exist");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ledger_error_conversion() {
        let err: AssetError = LedgerError::LockPoisoned.into();
        assert!(matches!(err, AssetError::Ledger(LedgerError::LockPoisoned)));
    }
}
