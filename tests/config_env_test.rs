//! Environment layer of settings loading
//!
//! Kept in its own test binary: the variables are process-wide.

use std::env;
use std::fs;

use tempfile::TempDir;

use grouptree::config::{CycleCheck, Settings};

#[test]
fn given_env_overrides_when_loading_then_env_beats_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("grouptree.toml");
    fs::write(
        &path,
        r#"
[traversal]
cycle_check = "ancestors"
max_depth = 12
max_nodes = 500

[output]
ascii = false
"#,
    )
    .unwrap();
    env::set_var("GROUPTREE__TRAVERSAL__MAX_DEPTH", "3");
    env::set_var("GROUPTREE__OUTPUT__ASCII", "true");
    env::set_var("GROUPTREE__LDAP__SERVER", "dc02.ad.example.com");

    let result = Settings::load(Some(&path));

    env::remove_var("GROUPTREE__TRAVERSAL__MAX_DEPTH");
    env::remove_var("GROUPTREE__OUTPUT__ASCII");
    env::remove_var("GROUPTREE__LDAP__SERVER");

    let settings = result.unwrap();
    assert_eq!(settings.traversal.max_depth, 3);
    assert!(settings.output.ascii);
    assert_eq!(settings.ldap.server.as_deref(), Some("dc02.ad.example.com"));
    // untouched keys keep the file values
    assert_eq!(settings.traversal.max_nodes, 500);
    assert_eq!(settings.traversal.cycle_check, CycleCheck::Ancestors);
}
