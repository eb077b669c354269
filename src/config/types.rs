//! Configuration types for rolegate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::access_control::{Action, Possession};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Role hierarchy and grants
    pub policy: PolicyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Role hierarchy and grant table
///
/// ```toml
/// [[policy.roles]]
/// name = "User"
/// grants = [
///   { resource = "Event", action = "create", possession = "any", attributes = ["title"] },
/// ]
///
/// [[policy.roles]]
/// name = "Admin"
/// extends = ["User"]
/// grants = [
///   { resource = "Event", action = "read", possession = "any", attributes = ["*"] },
/// ]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Let an `any` grant also satisfy an `own` query.
    ///
    /// An `own` grant never satisfies an `any` query.
    pub any_implies_own: bool,

    /// Role definitions; names are values so their case is preserved
    pub roles: Vec<RoleConfig>,
}

/// A single role definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Role name, matched case-sensitively against caller roles
    pub name: String,

    /// Roles whose grants this role includes
    pub extends: Vec<String>,

    /// Grants held directly by this role
    pub grants: Vec<GrantConfig>,
}

/// A single `(resource, action, possession)` grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantConfig {
    /// Resource type name (e.g. `Event`)
    pub resource: String,

    pub action: Action,

    pub possession: Possession,

    /// Attribute scope in glob notation; defaults to `["*"]`
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
}

impl RoleConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn grant(mut self, grant: GrantConfig) -> Self {
        self.grants.push(grant);
        self
    }
}

impl GrantConfig {
    pub fn new(
        resource: impl Into<String>,
        action: Action,
        possession: Possession,
        attributes: &[&str],
    ) -> Self {
        Self {
            resource: resource.into(),
            action,
            possession,
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}

fn default_attributes() -> Vec<String> {
    vec!["*".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
