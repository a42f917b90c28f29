//! I/O boundary traits for testability
//!
//! The expander only talks to the directory through [`DirectoryQuery`], so it
//! can run against a live LDAP server, an offline snapshot or a test double.

use crate::domain::ObjectRecord;
use crate::infrastructure::error::DirectoryResult;

/// Directory lookups consumed by the graph expander.
pub trait DirectoryQuery {
    /// Check that `domain` maps to a queryable endpoint.
    fn resolve_domain(&self, domain: &str) -> DirectoryResult<()>;

    /// Look up a single object by name or account name.
    fn find_object_by_name(&self, name: &str, domain: &str)
        -> DirectoryResult<Option<ObjectRecord>>;

    /// Look up a single object by its exact distinguished name.
    fn find_object_by_dn(&self, dn: &str, domain: &str) -> DirectoryResult<Option<ObjectRecord>>;

    /// Objects whose membership attribute references the group `dn`.
    fn find_group_members(&self, dn: &str, domain: &str) -> DirectoryResult<Vec<ObjectRecord>>;

    /// Distinguished names of the groups `object_name` is a direct member of.
    fn find_memberships_of(&self, object_name: &str, domain: &str)
        -> DirectoryResult<Vec<String>>;
}
