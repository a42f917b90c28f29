//! Domain layer: entities and tree structure
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod dn;
pub mod entities;
pub mod error;
pub mod tree;

pub use entities::*;
pub use error::DomainError;
pub use tree::MembershipTree;
