//! # Ports Layer
//!
//! Trait definitions between the asset engine and the outside world.
//!
//! - **Driving Port (Inbound)**: `AssetTransferApi`
//! - **Driven Ports (Outbound)**: `LedgerStore`, `HistoryCursor`,
//!   `EventEmitter`, `TransactionContext`, `CallerCredential`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
