//! Shared directory fixtures for integration tests

#![allow(dead_code)]

use grouptree::infrastructure::snapshot::{SnapshotDirectory, SnapshotObject};

pub const DOMAIN: &str = "ad.example.com";

const GROUP_CATEGORY: &str = "CN=Group,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com";
const PERSON_CATEGORY: &str = "CN=Person,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com";
const COMPUTER_CATEGORY: &str = "CN=Computer,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com";

pub fn guid(n: u32) -> String {
    format!("00000000-0000-0000-0000-{:012x}", n)
}

pub fn group_dn(name: &str) -> String {
    format!("CN={},OU=Groups,DC=ad,DC=example,DC=com", name)
}

pub fn group(name: &str, n: u32) -> SnapshotObject {
    SnapshotObject::new(name, group_dn(name), guid(n), GROUP_CATEGORY)
}

pub fn user(name: &str, sam: &str, n: u32) -> SnapshotObject {
    SnapshotObject::new(
        name,
        format!("CN={},OU=Staff,DC=ad,DC=example,DC=com", name),
        guid(n),
        PERSON_CATEGORY,
    )
    .with_sam_account_name(sam)
}

pub fn computer(name: &str, sam: &str, n: u32) -> SnapshotObject {
    SnapshotObject::new(
        name,
        format!("CN={},OU=Computers,DC=ad,DC=example,DC=com", name),
        guid(n),
        COMPUTER_CATEGORY,
    )
    .with_sam_account_name(sam)
}

/// ADMINS with a single user whose account name differs from the display name.
pub fn admins_directory() -> SnapshotDirectory {
    SnapshotDirectory::new(vec![
        group("ADMINS", 1),
        user("John Doe", "jdoe", 2).member_of(group_dn("ADMINS")),
    ])
}

/// A contains B, B contains A.
pub fn two_level_cycle() -> SnapshotDirectory {
    SnapshotDirectory::new(vec![
        group("A", 1).member_of(group_dn("B")),
        group("B", 2).member_of(group_dn("A")),
    ])
}

/// A contains B, B contains C, C contains A.
pub fn three_level_cycle() -> SnapshotDirectory {
    SnapshotDirectory::new(vec![
        group("A", 1).member_of(group_dn("C")),
        group("B", 2).member_of(group_dn("A")),
        group("C", 3).member_of(group_dn("B")),
    ])
}

/// R contains (in directory order) u1, G1, PC01, G2; G1 contains u2; G2 contains u3.
pub fn mixed_directory() -> SnapshotDirectory {
    SnapshotDirectory::new(vec![
        group("R", 1),
        user("User One", "u1", 2).member_of(group_dn("R")),
        group("G1", 3).member_of(group_dn("R")),
        computer("PC01", "PC01$", 4).member_of(group_dn("R")),
        group("G2", 5).member_of(group_dn("R")),
        user("u2", "u2", 6).member_of(group_dn("G1")),
        user("u3", "u3", 7).member_of(group_dn("G2")),
    ])
}
