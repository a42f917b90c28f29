//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/grouptree/grouptree.toml` (or an explicit file)
//! 3. Environment variables: `GROUPTREE__*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Connection settings for the LDAP backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LdapConfig {
    /// Host to connect to instead of the domain name itself
    pub server: Option<String>,
    /// Port (default: 389, or 636 with TLS)
    pub port: Option<u16>,
    /// Use `ldaps://`
    pub use_tls: bool,
    /// Simple-bind DN (anonymous when unset)
    pub bind_dn: Option<String>,
    pub bind_password: Option<String>,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: None,
            use_tls: false,
            bind_dn: None,
            bind_password: None,
            connect_timeout_secs: 10,
            query_timeout_secs: 30,
        }
    }
}

impl LdapConfig {
    pub fn effective_port(&self) -> u16 {
        self.port
            .unwrap_or(if self.use_tls { 636 } else { 389 })
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "ldaps"
        } else {
            "ldap"
        }
    }
}

/// How far up the discovery chain a candidate is compared for cycles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CycleCheck {
    /// Only the expanding node's parent (two-level cycles).
    #[default]
    Grandparent,
    /// The expanding node and every ancestor.
    Ancestors,
}

/// Bounds for the graph expansion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TraversalConfig {
    pub cycle_check: CycleCheck,
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            cycle_check: CycleCheck::Grandparent,
            max_nodes: 10_000,
            max_depth: 64,
        }
    }
}

/// Presentation defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Draw branches with ASCII instead of box-drawing characters
    pub ascii: bool,
}

/// Unified configuration for grouptree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub ldap: LdapConfig,
    pub traversal: TraversalConfig,
    pub output: OutputConfig,
}

/// Get the XDG config directory for grouptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "grouptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("grouptree.toml"))
}

/// Expand `~` and `$VAR` in a path-like setting.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(
        shellexpand::full(path)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| path.to_string()),
    )
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// `config_file` replaces the global config location when given; unlike the
    /// global file it must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                let path = expand_path(&path.to_string_lossy());
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    builder = builder.add_source(config::File::from(global_path).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("GROUPTREE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Parse settings from TOML content (unset keys keep their defaults).
    pub fn from_toml(content: &str) -> Result<Self, ApplicationError> {
        toml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse config: {}", e),
        })
    }

    /// Serialize settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {}", e),
        })
    }

    /// Commented template for `config init`.
    pub fn template() -> String {
        r#"# grouptree configuration
# Environment overrides: GROUPTREE__<SECTION>__<KEY>, e.g. GROUPTREE__LDAP__PORT=636

[ldap]
# server = "dc01.ad.example.com"   # default: the domain name
# port = 389                       # default: 389, or 636 with use_tls
use_tls = false
# bind_dn = "CN=reader,OU=Service,DC=ad,DC=example,DC=com"
# bind_password = ""
connect_timeout_secs = 10
query_timeout_secs = 30

[traversal]
# "grandparent" flags A -> B -> A; "ancestors" flags a repeat anywhere up the chain
cycle_check = "grandparent"
max_nodes = 10000
max_depth = 64

[output]
ascii = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_grandparent_check_and_limits() {
        let settings = Settings::default();

        assert_eq!(settings.traversal.cycle_check, CycleCheck::Grandparent);
        assert_eq!(settings.traversal.max_nodes, 10_000);
        assert_eq!(settings.traversal.max_depth, 64);
        assert_eq!(settings.ldap.effective_port(), 389);
        assert_eq!(settings.ldap.scheme(), "ldap");
        assert!(!settings.output.ascii);
    }

    #[test]
    fn given_tls_without_port_when_resolving_port_then_uses_636() {
        let ldap = LdapConfig {
            use_tls: true,
            ..Default::default()
        };

        assert_eq!(ldap.effective_port(), 636);
        assert_eq!(ldap.scheme(), "ldaps");
    }

    #[test]
    fn given_template_when_parsing_then_equals_defaults() {
        let settings = Settings::from_toml(&Settings::template()).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_partial_toml_when_parsing_then_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
[traversal]
cycle_check = "ancestors"
"#,
        )
        .unwrap();

        assert_eq!(settings.traversal.cycle_check, CycleCheck::Ancestors);
        assert_eq!(settings.traversal.max_depth, 64);
        assert_eq!(settings.ldap.query_timeout_secs, 30);
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips() {
        let mut settings = Settings::default();
        settings.ldap.server = Some("dc01.example.com".into());

        let parsed = Settings::from_toml(&settings.to_toml().unwrap()).unwrap();

        assert_eq!(parsed, settings);
    }
}
