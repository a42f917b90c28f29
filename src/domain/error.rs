//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::NodeId;

/// Domain errors represent malformed directory data.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid distinguished name: {0}")]
    InvalidDistinguishedName(String),

    #[error("invalid object GUID: {0}")]
    InvalidGuid(String),

    #[error("node {node} links to missing parent {parent}")]
    UnknownParent { node: NodeId, parent: NodeId },

    #[error("node {0} claims to be a second root")]
    SecondRoot(NodeId),

    #[error("first node must be the root, got a child of {0}")]
    MissingRoot(NodeId),
}
