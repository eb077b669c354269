//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (ROLEGATE__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::RoleHierarchy;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "rolegate.toml",
    ".rolegate.toml",
    "~/.config/rolegate/config.toml",
    "/etc/rolegate/config.toml",
];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                debug!(path = %expanded, "Using configuration file");
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. ROLEGATE__LOGGING__LEVEL=debug, ROLEGATE__POLICY__ANY_IMPLIES_OWN=true
    builder = builder.add_source(
        Environment::with_prefix("ROLEGATE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::Invalid {
            message: format!(
                "logging.level must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                config.logging.level
            ),
        });
    }

    for (index, role) in config.policy.roles.iter().enumerate() {
        if role.name.is_empty() {
            return Err(ConfigError::Missing {
                field: format!("policy.roles[{}].name", index),
            });
        }
        for (grant_index, grant) in role.grants.iter().enumerate() {
            if grant.resource.is_empty() {
                return Err(ConfigError::Missing {
                    field: format!(
                        "policy.roles[{}].grants[{}].resource",
                        index, grant_index
                    ),
                });
            }
        }
    }

    // Compiling the hierarchy checks names, attributes and inheritance
    RoleHierarchy::new(&config.policy)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::{Action, Possession};
    use crate::config::LogFormat;

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[logging]
level = "debug"
format = "json"

[[policy.roles]]
name = "User"
grants = [
  { resource = "Event", action = "create", possession = "any", attributes = ["title"] },
]
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.policy.roles.len(), 1);

        let user = &config.policy.roles[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.grants[0].action, Action::Create);
        assert_eq!(user.grants[0].possession, Possession::Any);
        assert_eq!(user.grants[0].attributes, vec!["title"]);
    }

    #[test]
    fn test_role_name_case_preserved() {
        let toml = r#"
[[policy.roles]]
name = "EventManager"

[[policy.roles]]
name = "Admin"
extends = ["EventManager"]
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.policy.roles[0].name, "EventManager");
        assert_eq!(config.policy.roles[1].extends, vec!["EventManager"]);
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = load_config_from_str("").unwrap();
        assert!(config.policy.roles.is_empty());
    }

    #[test]
    fn test_invalid_log_level() {
        let toml = r#"
[logging]
level = "verbose"
"#;
        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_invalid_log_format() {
        let toml = r#"
[logging]
format = "xml"
"#;
        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_missing_role_name() {
        let toml = r#"
[[policy.roles]]
extends = []
"#;
        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::Missing { ref field }) if field == "policy.roles[0].name"
        ));
    }

    #[test]
    fn test_unknown_parent() {
        let toml = r#"
[[policy.roles]]
name = "Admin"
extends = ["Ghost"]
"#;
        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::UnknownRole { .. })
        ));
    }

    #[test]
    fn test_bad_attribute_token() {
        let toml = r#"
[[policy.roles]]
name = "User"
grants = [
  { resource = "Event", action = "read", possession = "any", attributes = ["!!title"] },
]
"#;
        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config(Some("/nonexistent/rolegate.toml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
