//! # Adapters Layer
//!
//! Concrete implementations of the ports.
//!
//! | Adapter | Port | Purpose |
//! |---------|------|---------|
//! | `InMemoryLedger` / `LedgerTransaction` | `TransactionContext` | Buffered key/value store with change log |
//! | `ChaincodeEventBus` | - | Fan-out of committed events |
//! | `X509Credential` | `CallerCredential` | Identity string plus attributes |
//! | `ContractDispatcher` | `AssetTransferApi` | Named invocation with string arguments |

pub mod credential;
pub mod event_bus;
pub mod invoke;
pub mod memory_ledger;

pub use credential::X509Credential;
pub use event_bus::{ChaincodeEventBus, EventSubscription, SubscriptionError};
pub use invoke::{ContractDispatcher, ContractFunction};
pub use memory_ledger::{CommitReceipt, InMemoryLedger, LedgerTransaction};
