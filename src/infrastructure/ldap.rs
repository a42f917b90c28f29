//! LDAP directory backend.
//!
//! Opens one synchronous connection per domain on first use and issues
//! subtree searches below the domain's naming context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::ToSocketAddrs;
use std::time::Duration;

use ldap3::{ldap_escape, LdapConn, LdapConnSettings, Scope, SearchEntry, SearchResult};
use tracing::{debug, instrument, trace};

use crate::config::LdapConfig;
use crate::domain::dn::{base_dn, guid_from_bytes};
use crate::domain::ObjectRecord;
use crate::infrastructure::error::{DirectoryError, DirectoryResult};
use crate::infrastructure::traits::DirectoryQuery;

const OBJECT_ATTRS: [&str; 5] = [
    "name",
    "sAMAccountName",
    "distinguishedName",
    "objectGUID",
    "objectCategory",
];

const NO_SUCH_OBJECT: u32 = 32;

/// Directory backed by live LDAP connections.
pub struct LdapDirectory {
    config: LdapConfig,
    connections: RefCell<HashMap<String, LdapConn>>,
}

impl LdapDirectory {
    pub fn new(config: LdapConfig) -> Self {
        Self {
            config,
            connections: RefCell::new(HashMap::new()),
        }
    }

    fn host<'a>(&'a self, domain: &'a str) -> &'a str {
        self.config.server.as_deref().unwrap_or(domain)
    }

    fn url(&self, domain: &str) -> String {
        format!(
            "{}://{}:{}",
            self.config.scheme(),
            self.host(domain),
            self.config.effective_port()
        )
    }

    fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.config.query_timeout_secs)
    }

    #[instrument(level = "debug", skip(self))]
    fn connect(&self, domain: &str) -> DirectoryResult<LdapConn> {
        let url = self.url(domain);
        let unavailable = |e: ldap3::LdapError| DirectoryError::Unavailable {
            endpoint: url.clone(),
            message: e.to_string(),
        };

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs));
        let mut conn = LdapConn::with_settings(settings, &url).map_err(unavailable)?;

        if let Some(bind_dn) = &self.config.bind_dn {
            let password = self.config.bind_password.as_deref().unwrap_or("");
            conn.simple_bind(bind_dn, password)
                .and_then(|r| r.success())
                .map_err(unavailable)?;
            debug!("bound as {}", bind_dn);
        }
        Ok(conn)
    }

    /// Run a search below `base` on the connection for `domain`, connecting lazily.
    ///
    /// A base that does not exist yields no entries.
    fn search(
        &self,
        domain: &str,
        base: &str,
        scope: Scope,
        filter: &str,
        attrs: &[&str],
    ) -> DirectoryResult<Vec<SearchEntry>> {
        let key = domain.to_ascii_lowercase();
        let mut connections = self.connections.borrow_mut();
        if !connections.contains_key(&key) {
            let conn = self.connect(domain)?;
            connections.insert(key.clone(), conn);
        }
        let conn = connections
            .get_mut(&key)
            .ok_or_else(|| DirectoryError::query(format!("search {}", domain), "no connection"))?;

        trace!("search base={} scope={:?} filter={}", base, scope, filter);
        let context = || format!("search {} in {}", filter, base);
        let SearchResult(entries, result) = conn
            .with_timeout(self.query_timeout())
            .search(base, scope, filter, attrs.to_vec())
            .map_err(|e| DirectoryError::query(context(), e))?;
        if result.rc == NO_SUCH_OBJECT {
            return Ok(Vec::new());
        }
        result
            .success()
            .map_err(|e| DirectoryError::query(context(), e))?;

        Ok(entries.into_iter().map(SearchEntry::construct).collect())
    }

    /// First object named `name`, preferring an exact account name match.
    fn lookup(
        &self,
        name: &str,
        domain: &str,
        attrs: &[&str],
    ) -> DirectoryResult<Option<SearchEntry>> {
        let base = base_dn(domain);
        let by_account = format!("(sAMAccountName={})", ldap_escape(name));
        if let Some(entry) = self
            .search(domain, &base, Scope::Subtree, &by_account, attrs)?
            .into_iter()
            .next()
        {
            return Ok(Some(entry));
        }
        Ok(self
            .search(domain, &base, Scope::Subtree, &Self::name_filter(name), attrs)?
            .into_iter()
            .next())
    }

    fn first_attr(entry: &SearchEntry, attr: &str) -> String {
        entry
            .attrs
            .get(attr)
            .and_then(|values| values.first())
            .cloned()
            .unwrap_or_default()
    }

    fn to_record(entry: &SearchEntry) -> DirectoryResult<ObjectRecord> {
        // GUIDs that happen to be valid UTF-8 end up in `attrs`
        let raw_guid = entry
            .bin_attrs
            .get("objectGUID")
            .and_then(|values| values.first())
            .cloned()
            .or_else(|| {
                entry
                    .attrs
                    .get("objectGUID")
                    .and_then(|values| values.first())
                    .map(|s| s.as_bytes().to_vec())
            })
            .ok_or_else(|| DirectoryError::query(entry.dn.clone(), "missing objectGUID"))?;
        let object_guid =
            guid_from_bytes(&raw_guid).map_err(|e| DirectoryError::query(entry.dn.clone(), e))?;

        let distinguished_name = match Self::first_attr(entry, "distinguishedName") {
            dn if dn.is_empty() => entry.dn.clone(),
            dn => dn,
        };
        Ok(ObjectRecord {
            name: Self::first_attr(entry, "name"),
            sam_account_name: Self::first_attr(entry, "sAMAccountName"),
            distinguished_name,
            object_guid,
            object_category: Self::first_attr(entry, "objectCategory"),
        })
    }

    fn name_filter(name: &str) -> String {
        let name = ldap_escape(name);
        format!("(|(sAMAccountName={0})(name={0})(cn={0}))", name)
    }
}

impl DirectoryQuery for LdapDirectory {
    #[instrument(level = "debug", skip(self))]
    fn resolve_domain(&self, domain: &str) -> DirectoryResult<()> {
        let host = self.host(domain);
        let mut addrs = (host, self.config.effective_port())
            .to_socket_addrs()
            .map_err(|e| DirectoryError::DomainResolution {
                domain: domain.to_string(),
                source: Some(e),
            })?;
        match addrs.next() {
            Some(addr) => {
                debug!("{} resolved to {}", host, addr);
                Ok(())
            }
            None => Err(DirectoryError::DomainResolution {
                domain: domain.to_string(),
                source: None,
            }),
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn find_object_by_name(
        &self,
        name: &str,
        domain: &str,
    ) -> DirectoryResult<Option<ObjectRecord>> {
        self.lookup(name, domain, &OBJECT_ATTRS)?
            .as_ref()
            .map(Self::to_record)
            .transpose()
    }

    #[instrument(level = "debug", skip(self))]
    fn find_object_by_dn(&self, dn: &str, domain: &str) -> DirectoryResult<Option<ObjectRecord>> {
        self.search(domain, dn, Scope::Base, "(objectClass=*)", &OBJECT_ATTRS)?
            .first()
            .map(Self::to_record)
            .transpose()
    }

    #[instrument(level = "debug", skip(self))]
    fn find_group_members(&self, dn: &str, domain: &str) -> DirectoryResult<Vec<ObjectRecord>> {
        let filter = format!("(memberOf={})", ldap_escape(dn));
        self.search(domain, &base_dn(domain), Scope::Subtree, &filter, &OBJECT_ATTRS)?
            .iter()
            .map(Self::to_record)
            .collect()
    }

    #[instrument(level = "debug", skip(self))]
    fn find_memberships_of(
        &self,
        object_name: &str,
        domain: &str,
    ) -> DirectoryResult<Vec<String>> {
        let entry = self.lookup(object_name, domain, &["memberOf"])?.ok_or_else(|| {
            DirectoryError::query(
                format!("memberships of {}@{}", object_name, domain),
                "object not found",
            )
        })?;
        Ok(entry.attrs.get("memberOf").cloned().unwrap_or_default())
    }
}
