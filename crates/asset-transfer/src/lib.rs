//! # Asset Transfer - Role-Gated Asset Ledger
//!
//! Keeps a catalog of assets in a transactional key/value ledger. Every
//! mutation is gated on the caller's role, announces itself with one event,
//! and leaves a trail in the per-key change log.
//!
//! ## Operations
//!
//! | Operation | Gated | Event | Failure modes |
//! |-----------|-------|-------|---------------|
//! | `seed_initial_assets` | no | no | ledger |
//! | `create_asset` | admin | asset | unauthorized, already exists |
//! | `read_asset` | no | no | not found |
//! | `update_asset` | admin | asset | unauthorized, not found |
//! | `delete_asset` | admin | `{ID}` | unauthorized, not found |
//! | `asset_exists` | no | no | ledger |
//! | `transfer_asset` | admin | asset | unauthorized, not found, corrupted |
//!
//! Any transaction may also fail at commit with a read conflict if a key it
//! read was changed by a transaction that committed first.
//! | `get_all_assets` | no | no | ledger |
//! | `get_asset_history` | no | no | ledger |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Engine | `service.rs` | Read/compute/write per operation |
//! | Identity | `domain/identity.rs` | Credential to principal |
//! | Policy | `domain/policy.rs` | Role gate |
//! | History | `domain/history.rs` | Change log to civil-time entries |
//! | Ledger | `adapters/memory_ledger.rs` | Buffered transactions |
//! | Events | `events.rs`, `adapters/event_bus.rs` | Payloads and fan-out |
//! | Dispatcher | `adapters/invoke.rs` | Function name plus string args |
//!
//! ## Usage Example
//!
//! ```
//! use asset_transfer::prelude::*;
//!
//! let ledger = InMemoryLedger::new();
//! let service = AssetTransferService::default();
//!
//! let mut tx = ledger.begin();
//! service
//!     .create_asset(&mut tx, &Principal::admin("admin"), AssetDraft::new("a1", "blue", 5, "Tom", 300))
//!     .unwrap();
//! tx.commit().unwrap();
//!
//! let tx = ledger.begin();
//! let asset = service.read_asset(&tx, "a1").unwrap().into_asset().unwrap();
//! assert_eq!(asset.owner, "Tom");
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Asset, AssetDraft, AssetRecord, HistoryEntry, StoredValue, KeyModification, KeyValue,
        LedgerTimestamp,
    };

    // Identity and policy
    pub use crate::domain::identity::{IdentityResolver, Principal, Role};
    pub use crate::domain::policy::{AccessPolicy, Decision, Operation};

    // Errors
    pub use crate::domain::errors::{AssetError, LedgerError};

    // Ports
    pub use crate::ports::inbound::AssetTransferApi;
    pub use crate::ports::outbound::{
        CallerCredential, EventEmitter, HistoryCursor, LedgerStore, TransactionContext,
    };

    // Events
    pub use crate::events::{AssetEventPayload, ChaincodeEvent, EVENT_NAME};

    // Adapters
    pub use crate::adapters::{
        ChaincodeEventBus, CommitReceipt, ContractDispatcher, ContractFunction, EventSubscription,
        InMemoryLedger, LedgerTransaction, X509Credential,
    };

    // Configuration and service
    pub use crate::config::{AssetConfig, ConfigError};
    pub use crate::service::AssetTransferService;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
