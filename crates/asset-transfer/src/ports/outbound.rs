//! # Driven Ports (Outbound)
//!
//! Interfaces the engine consumes. The ledger adapter owns all durable state;
//! the engine holds none across calls.

use crate::domain::entities::{KeyModification, KeyValue, LedgerTimestamp};
use crate::domain::errors::LedgerError;

// =============================================================================
// LEDGER STORE
// =============================================================================

/// Key/value primitives of the external ledger, scoped to one transaction.
///
/// Reads observe committed state. Writes are buffered until the host commits
/// the transaction.
pub trait LedgerStore {
    /// Current value at `key`, if any.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Buffer a write of `value` at `key`.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Buffer removal of the current value at `key`.
    fn delete_state(&mut self, key: &str) -> Result<(), LedgerError>;

    /// All key/value pairs with `start <= key < end` in key order.
    ///
    /// An empty bound is open on that side.
    fn state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError>;

    /// Open a cursor over the change log of `key`, oldest first.
    fn history_for_key(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError>;
}

/// Pull cursor over one key's change log.
///
/// The cursor holds iteration state in the store and must be closed exactly
/// once.
pub trait HistoryCursor: Send {
    /// Next modification, or `None` once the log is exhausted.
    fn next_modification(&mut self) -> Result<Option<KeyModification>, LedgerError>;

    /// Release the cursor.
    fn close(&mut self) -> Result<(), LedgerError>;
}

// =============================================================================
// EVENT EMITTER
// =============================================================================

/// Transaction-scoped notification channel.
///
/// Setting an event only records it; it is published when the enclosing
/// transaction commits. A transaction carries at most one event.
pub trait EventEmitter {
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError>;
}

/// Everything an operation needs from the host for one invocation.
pub trait TransactionContext: LedgerStore + EventEmitter {
    /// Identifier stamped on every change this transaction commits.
    fn tx_id(&self) -> &str;

    /// Transaction timestamp.
    fn timestamp(&self) -> LedgerTimestamp;
}

// =============================================================================
// CALLER CREDENTIAL
// =============================================================================

/// Opaque caller credential supplied by the host.
pub trait CallerCredential {
    /// Self-describing identity string (subject and issuer names).
    fn id(&self) -> &str;

    /// Value of a certificate attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;
}
