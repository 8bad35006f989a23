//! # Asset Ledger Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks
//! └── src/integration/  # Cross-component flows
//!     ├── flows.rs      # Engine, dispatcher and ledger together
//!     └── events.rs     # Event delivery to async listeners
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p asset-tests
//! cargo bench -p asset-tests
//! ```

pub mod integration;
