//! # Integration Flows
//!
//! Exercises the engine through the ledger, the dispatcher and the event
//! bus together.

pub mod events;
pub mod flows;
