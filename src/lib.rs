//! grouptree: nested directory group membership as a tree
//!
//! Layers, leaf first:
//! - [`domain`]: nodes, distinguished names, the membership tree
//! - [`application`]: graph expansion and tree rendering
//! - [`infrastructure`]: directory backends (LDAP, snapshot) and wiring
//! - [`cli`]: arguments, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
