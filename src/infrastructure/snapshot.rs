//! Offline directory backed by a TOML snapshot.
//!
//! A snapshot lists directory objects together with the DNs of the groups they
//! belong to, which is enough to answer every [`DirectoryQuery`] lookup in both
//! directions. All comparisons are case-insensitive, like the directory itself.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::dn::{canonical_guid, domain_from_dn};
use crate::domain::ObjectRecord;
use crate::infrastructure::error::{DirectoryError, DirectoryResult, InfraError, InfraResult};
use crate::infrastructure::traits::DirectoryQuery;

/// One object entry of a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotObject {
    pub name: String,
    /// Defaults to `name` when omitted
    #[serde(default)]
    pub sam_account_name: String,
    pub distinguished_name: String,
    pub object_guid: String,
    pub object_category: String,
    /// DNs of the groups this object is a direct member of
    #[serde(default)]
    pub member_of: Vec<String>,
}

impl SnapshotObject {
    pub fn new(
        name: impl Into<String>,
        distinguished_name: impl Into<String>,
        object_guid: impl Into<String>,
        object_category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sam_account_name: String::new(),
            distinguished_name: distinguished_name.into(),
            object_guid: object_guid.into(),
            object_category: object_category.into(),
            member_of: Vec::new(),
        }
    }

    pub fn with_sam_account_name(mut self, sam: impl Into<String>) -> Self {
        self.sam_account_name = sam.into();
        self
    }

    pub fn member_of(mut self, group_dn: impl Into<String>) -> Self {
        self.member_of.push(group_dn.into());
        self
    }

    fn sam(&self) -> &str {
        if self.sam_account_name.is_empty() {
            &self.name
        } else {
            &self.sam_account_name
        }
    }

    fn in_domain(&self, domain: &str) -> bool {
        domain_from_dn(&self.distinguished_name).eq_ignore_ascii_case(domain)
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SnapshotFile {
    #[serde(default)]
    objects: Vec<SnapshotObject>,
}

/// Directory answering lookups from an in-memory object list.
#[derive(Debug, Default, Clone)]
pub struct SnapshotDirectory {
    objects: Vec<SnapshotObject>,
}

impl SnapshotDirectory {
    pub fn new(objects: Vec<SnapshotObject>) -> Self {
        Self { objects }
    }

    /// Parse snapshot TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: SnapshotFile = toml::from_str(content)?;
        Ok(Self::new(file.objects))
    }

    /// Load a snapshot file from disk.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> InfraResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read snapshot {}", path.display()), e))?;
        let directory = Self::from_toml(&content).map_err(|e| InfraError::Snapshot {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("loaded {} snapshot objects", directory.objects.len());
        Ok(directory)
    }

    /// Account name matches win over display name matches.
    fn find(&self, name: &str, domain: &str) -> Option<&SnapshotObject> {
        let candidates = || self.objects.iter().filter(move |o| o.in_domain(domain));
        candidates()
            .find(|o| o.sam().eq_ignore_ascii_case(name))
            .or_else(|| candidates().find(|o| o.name.eq_ignore_ascii_case(name)))
    }

    fn to_record(object: &SnapshotObject) -> DirectoryResult<ObjectRecord> {
        let object_guid = canonical_guid(&object.object_guid).map_err(|e| {
            DirectoryError::query(format!("snapshot object {}", object.distinguished_name), e)
        })?;
        Ok(ObjectRecord {
            name: object.name.clone(),
            sam_account_name: object.sam().to_string(),
            distinguished_name: object.distinguished_name.clone(),
            object_guid,
            object_category: object.object_category.clone(),
        })
    }
}

impl DirectoryQuery for SnapshotDirectory {
    fn resolve_domain(&self, domain: &str) -> DirectoryResult<()> {
        if self.objects.iter().any(|o| o.in_domain(domain)) {
            Ok(())
        } else {
            Err(DirectoryError::DomainResolution {
                domain: domain.to_string(),
                source: None,
            })
        }
    }

    fn find_object_by_name(
        &self,
        name: &str,
        domain: &str,
    ) -> DirectoryResult<Option<ObjectRecord>> {
        self.find(name, domain).map(Self::to_record).transpose()
    }

    fn find_object_by_dn(&self, dn: &str, domain: &str) -> DirectoryResult<Option<ObjectRecord>> {
        self.objects
            .iter()
            .find(|o| o.in_domain(domain) && o.distinguished_name.eq_ignore_ascii_case(dn))
            .map(Self::to_record)
            .transpose()
    }

    fn find_group_members(&self, dn: &str, domain: &str) -> DirectoryResult<Vec<ObjectRecord>> {
        self.objects
            .iter()
            .filter(|o| o.in_domain(domain))
            .filter(|o| o.member_of.iter().any(|g| g.eq_ignore_ascii_case(dn)))
            .map(Self::to_record)
            .collect()
    }

    fn find_memberships_of(
        &self,
        object_name: &str,
        domain: &str,
    ) -> DirectoryResult<Vec<String>> {
        self.find(object_name, domain)
            .map(|o| o.member_of.clone())
            .ok_or_else(|| {
                DirectoryError::query(
                    format!("memberships of {}@{}", object_name, domain),
                    "object not found",
                )
            })
    }
}
