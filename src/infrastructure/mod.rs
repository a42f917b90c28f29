//! Infrastructure layer: directory backends and DI container
//!
//! This layer implements the directory boundary trait and wires up services.

pub mod di;
pub mod error;
pub mod ldap;
pub mod snapshot;
pub mod traits;

pub use error::{DirectoryError, DirectoryResult, InfraError, InfraResult};
