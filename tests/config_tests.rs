//! Configuration loading tests

use rolegate::access_control::{Action, PermissionResolver, Possession, RoleSet};
use rolegate::config::{LogFormat, load_config, load_config_from_str};
use rolegate::error::ConfigError;

const FULL_CONFIG: &str = r#"
[logging]
level = "warn"
format = "json"

[policy]
any_implies_own = true

[[policy.roles]]
name = "Guest"
grants = [
  { resource = "Event", action = "read", possession = "any", attributes = ["id", "title"] },
]

[[policy.roles]]
name = "User"
extends = ["Guest"]

[[policy.roles.grants]]
resource = "Event"
action = "create"
possession = "any"
attributes = ["title", "description", "!description"]

[[policy.roles]]
name = "Admin"
extends = ["User"]

[[policy.roles.grants]]
resource = "Event"
action = "delete"
possession = "any"
"#;

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.policy.any_implies_own);

    let names: Vec<&str> = config.policy.roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Guest", "User", "Admin"]);

    let admin = &config.policy.roles[2];
    assert_eq!(admin.extends, vec!["User"]);
    assert_eq!(admin.grants[0].attributes, vec!["*"]);
}

#[test]
fn test_full_config_resolves() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();
    let resolver = PermissionResolver::new(&config.policy).unwrap();
    let admin = RoleSet::new(["Admin"]);

    // any_implies_own lets Guest's read:any answer a read:own query
    let read_own = resolver.resolve(&admin, "Event", Action::Read, Possession::Own);
    assert!(read_own.granted());
    assert!(read_own.allows("title"));
    assert!(!read_own.allows("description"));

    // deny wins over an explicit allow within one grant
    let create = resolver.resolve(&admin, "Event", Action::Create, Possession::Any);
    assert!(create.allows("title"));
    assert!(!create.allows("description"));

    assert!(
        resolver
            .resolve(&admin, "Event", Action::Delete, Possession::Any)
            .attributes()
            .is_unrestricted()
    );
}

#[test]
fn test_cyclic_inheritance_error() {
    let config_str = r#"
[[policy.roles]]
name = "A"
extends = ["B"]

[[policy.roles]]
name = "B"
extends = ["A"]
"#;

    let err = load_config_from_str(config_str).unwrap_err();
    assert!(matches!(err, ConfigError::CyclicInheritance { .. }));
    assert_eq!(
        err.to_string(),
        "Cyclic role inheritance: A -> B -> A"
    );
}

#[test]
fn test_unknown_action_error() {
    let config_str = r#"
[[policy.roles]]
name = "User"
grants = [
  { resource = "Event", action = "publish", possession = "any" },
]
"#;

    assert!(matches!(
        load_config_from_str(config_str),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_duplicate_role_error() {
    let config_str = r#"
[[policy.roles]]
name = "User"

[[policy.roles]]
name = "User"
"#;

    assert!(matches!(
        load_config_from_str(config_str),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn test_invalid_role_name_error() {
    let config_str = r#"
[[policy.roles]]
name = "event manager"
"#;

    assert!(load_config_from_str(config_str).is_err());
}

#[test]
#[serial_test::serial]
fn test_load_config_from_file() {
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("rolegate.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.policy.roles.len(), 3);
    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial_test::serial]
fn test_env_overrides_file() {
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("rolegate.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    unsafe {
        env::set_var("ROLEGATE__LOGGING__LEVEL", "debug");
        env::set_var("ROLEGATE__POLICY__ANY_IMPLIES_OWN", "false");
    }

    let result = load_config(Some(config_path.to_str().unwrap()));

    // Cleanup before asserting so a failure does not leak into other tests
    unsafe {
        env::remove_var("ROLEGATE__LOGGING__LEVEL");
        env::remove_var("ROLEGATE__POLICY__ANY_IMPLIES_OWN");
    }

    let config = result.unwrap();
    assert_eq!(config.logging.level, "debug");
    assert!(!config.policy.any_implies_own);
    // Values not overridden still come from the file
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.policy.roles.len(), 3);
}

#[test]
#[serial_test::serial]
fn test_env_invalid_log_level_rejected() {
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("rolegate.toml");
    fs::write(&config_path, "").unwrap();

    unsafe {
        env::set_var("ROLEGATE__LOGGING__LEVEL", "loud");
    }
    let result = load_config(Some(config_path.to_str().unwrap()));
    unsafe {
        env::remove_var("ROLEGATE__LOGGING__LEVEL");
    }

    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
#[serial_test::serial]
fn test_missing_explicit_file() {
    let result = load_config(Some("/definitely/not/here/rolegate.toml"));
    assert!(matches!(result, Err(ConfigError::Load(ref message)) if message.contains("not found")));
}

#[test]
fn test_example_config_is_valid() {
    let config = load_config_from_str(include_str!("../rolegate.example.toml")).unwrap();
    let resolver = PermissionResolver::new(&config.policy).unwrap();
    let schema = rolegate::operations::definitions::schema();
    assert_eq!(resolver.hierarchy().validate_against(&schema), 0);
}
