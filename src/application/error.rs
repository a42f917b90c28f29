//! Application-level errors (wraps domain and directory errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::DirectoryError;

/// Application errors carry every failure the expansion can end with.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot resolve domain: {0}")]
    DomainResolution(String),

    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("object not found: '{name}' in domain {domain}")]
    ObjectNotFound { name: String, domain: String },

    #[error("query failed: {0}")]
    Query(#[source] DirectoryError),

    #[error("traversal limit exceeded: {limit} of {value} (circular nesting deeper than two levels? try --full-cycle-check)")]
    TraversalLimit { limit: &'static str, value: usize },

    #[error("config error: {message}")]
    Config { message: String },
}

impl From<DirectoryError> for ApplicationError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::DomainResolution { domain, .. } => Self::DomainResolution(domain),
            DirectoryError::Unavailable { endpoint, message } => {
                Self::DirectoryUnavailable(format!("{}: {}", endpoint, message))
            }
            e @ DirectoryError::Query { .. } => Self::Query(e),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
