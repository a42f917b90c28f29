//! Distinguished-name and domain helpers.
//!
//! Directory objects carry their location as a distinguished name such as
//! `CN=Jane,OU=Staff,DC=ad,DC=example,DC=com`. The functions here derive
//! everything the tree needs from it: the DNS domain, the object's own
//! relative name and the short domain label used for display.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::domain::error::DomainError;

fn dc_regex() -> &'static Regex {
    static DC: OnceLock<Regex> = OnceLock::new();
    DC.get_or_init(|| Regex::new(r"(?i)(?:^|,)\s*DC=((?:\\.|[^,\\])+)").expect("valid DC regex"))
}

/// Split a DN into its RDN components, honouring `\,` escapes.
fn split_rdns(dn: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in dn.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => {
                parts.push(dn[start..i].trim());
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    parts.push(dn[start..].trim());
    parts
}

/// Remove LDAP DN escaping (`\,` → `,`).
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// DNS domain of a distinguished name, built from its `DC=` components.
///
/// `CN=x,DC=ad,DC=example,DC=com` → `ad.example.com`. Returns an empty string
/// when the DN has no domain components.
pub fn domain_from_dn(dn: &str) -> String {
    dc_regex()
        .captures_iter(dn)
        .filter_map(|caps| caps.get(1))
        .map(|m| unescape(m.as_str().trim()).to_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

/// Value of the first RDN: the object's own name (`CN=Jane,...` → `Jane`).
pub fn first_rdn_value(dn: &str) -> Result<String, DomainError> {
    let first = split_rdns(dn)
        .into_iter()
        .next()
        .filter(|rdn| !rdn.is_empty())
        .ok_or_else(|| DomainError::InvalidDistinguishedName(dn.to_string()))?;
    let (_, value) = first
        .split_once('=')
        .ok_or_else(|| DomainError::InvalidDistinguishedName(dn.to_string()))?;
    Ok(unescape(value.trim()))
}

/// Search base for a DNS domain: `ad.example.com` → `DC=ad,DC=example,DC=com`.
pub fn base_dn(domain: &str) -> String {
    domain
        .split('.')
        .filter(|label| !label.is_empty())
        .map(|label| format!("DC={}", label))
        .collect::<Vec<_>>()
        .join(",")
}

/// Short display label of a domain, uppercased.
///
/// With two or more labels this is the label directly beneath the top-level
/// one (`ad.example.com` → `EXAMPLE`); a single label is used as is.
pub fn short_domain_name(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    match labels.len() {
        0 => String::new(),
        1 => labels[0].to_uppercase(),
        n => labels[n - 2].to_uppercase(),
    }
}

/// Normalise a textual GUID into lowercase hyphenated form.
pub fn canonical_guid(raw: &str) -> Result<String, DomainError> {
    Uuid::parse_str(raw.trim())
        .map(|u| u.hyphenated().to_string())
        .map_err(|_| DomainError::InvalidGuid(raw.to_string()))
}

/// Canonical form of a binary `objectGUID` (little-endian field layout).
pub fn guid_from_bytes(bytes: &[u8]) -> Result<String, DomainError> {
    Uuid::from_slice_le(bytes)
        .map(|u| u.hyphenated().to_string())
        .map_err(|_| DomainError::InvalidGuid(format!("{} bytes", bytes.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CN=Jane,OU=Staff,DC=ad,DC=example,DC=com", "ad.example.com")]
    #[case("cn=x,dc=Corp,dc=Local", "corp.local")]
    #[case("CN=Smith\\, John,DC=example,DC=com", "example.com")]
    #[case("CN=NoDomain,OU=Staff", "")]
    fn given_dn_when_deriving_domain_then_joins_dc_components(
        #[case] dn: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(domain_from_dn(dn), expected);
    }

    #[test]
    fn given_escaped_comma_when_reading_first_rdn_then_unescapes() {
        let value = first_rdn_value("CN=Smith\\, John,OU=Staff,DC=example,DC=com").unwrap();
        assert_eq!(value, "Smith, John");
    }

    #[test]
    fn given_empty_dn_when_reading_first_rdn_then_fails() {
        assert!(matches!(
            first_rdn_value(""),
            Err(DomainError::InvalidDistinguishedName(_))
        ));
        assert!(first_rdn_value("garbage").is_err());
    }

    #[rstest]
    #[case("ad.example.com", "EXAMPLE")]
    #[case("example.com", "EXAMPLE")]
    #[case("corp", "CORP")]
    #[case("", "")]
    fn given_domain_when_shortening_then_uses_label_below_tld(
        #[case] domain: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(short_domain_name(domain), expected);
    }

    #[test]
    fn given_domain_when_building_base_dn_then_one_dc_per_label() {
        assert_eq!(base_dn("ad.example.com"), "DC=ad,DC=example,DC=com");
    }

    #[test]
    fn given_guid_text_when_canonicalising_then_lowercase_hyphenated() {
        let guid = canonical_guid("{6F1C8F8E-0D5B-4A52-9B0E-3E7D3C2A1B00}").unwrap();
        assert_eq!(guid, "6f1c8f8e-0d5b-4a52-9b0e-3e7d3c2a1b00");
        assert!(canonical_guid("not-a-guid").is_err());
    }

    #[test]
    fn given_ad_guid_bytes_when_formatting_then_swaps_leading_fields() {
        let bytes = [
            0x8e, 0x8f, 0x1c, 0x6f, 0x5b, 0x0d, 0x52, 0x4a, 0x9b, 0x0e, 0x3e, 0x7d, 0x3c, 0x2a,
            0x1b, 0x00,
        ];
        assert_eq!(
            guid_from_bytes(&bytes).unwrap(),
            "6f1c8f8e-0d5b-4a52-9b0e-3e7d3c2a1b00"
        );
        assert!(guid_from_bytes(&bytes[..4]).is_err());
    }
}
