//! Service container for dependency injection
//!
//! Wires the directory backend and the core services.

use std::path::Path;

use crate::application::services::{ExpandOptions, GlyphSet, GraphExpander, TreeRenderer};
use crate::config::Settings;
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::ldap::LdapDirectory;
use crate::infrastructure::snapshot::SnapshotDirectory;
use crate::infrastructure::traits::DirectoryQuery;

/// Container holding the directory backend and the settings it was built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Settings,

    /// Directory abstraction
    pub directory: Box<dyn DirectoryQuery>,
}

impl ServiceContainer {
    /// Create a container querying a live directory over LDAP.
    pub fn new(settings: Settings) -> Self {
        let directory = Box::new(LdapDirectory::new(settings.ldap.clone()));
        Self::with_deps(settings, directory)
    }

    /// Create a container answering from a snapshot file.
    pub fn with_snapshot(settings: Settings, snapshot: &Path) -> InfraResult<Self> {
        let directory = Box::new(SnapshotDirectory::load(snapshot)?);
        Ok(Self::with_deps(settings, directory))
    }

    /// Create a container with a custom directory (for testing).
    pub fn with_deps(settings: Settings, directory: Box<dyn DirectoryQuery>) -> Self {
        Self {
            settings,
            directory,
        }
    }

    pub fn expander(&self) -> GraphExpander<'_, dyn DirectoryQuery> {
        GraphExpander::new(
            self.directory.as_ref(),
            ExpandOptions::from(&self.settings.traversal),
        )
    }

    pub fn renderer(&self) -> TreeRenderer {
        let glyphs = if self.settings.output.ascii {
            GlyphSet::Ascii
        } else {
            GlyphSet::Unicode
        };
        TreeRenderer::new(glyphs)
    }
}
