//! Infrastructure-level errors

use thiserror::Error;

use crate::application::ApplicationError;

/// Failures reported by a directory backend.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("cannot resolve domain: {domain}")]
    DomainResolution {
        domain: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("directory unavailable at {endpoint}: {message}")]
    Unavailable { endpoint: String, message: String },

    #[error("{context}: {message}")]
    Query { context: String, message: String },
}

impl DirectoryError {
    pub fn query(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Query {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for directory backends.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {message}")]
    Snapshot { path: String, message: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
