//! # Domain Layer
//!
//! Pure asset rules: entities, the error taxonomy, identity resolution, the
//! access policy, history reconstruction, and the seed catalog.

pub mod entities;
pub mod errors;
pub mod history;
pub mod identity;
pub mod policy;
pub mod seed;

pub use entities::*;
pub use errors::*;
pub use history::*;
pub use identity::*;
pub use policy::*;
pub use seed::*;
