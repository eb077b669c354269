//! Error types for rolegate
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API;
//! `anyhow` is only used by the binary.

use crate::access_control::{Action, Possession};
use crate::util::quote_list;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid attribute '{attribute}' in grants of role '{role}'")]
    InvalidAttribute { role: String, attribute: String },

    #[error("Role '{role}' extends unknown role '{parent}'")]
    UnknownRole { role: String, parent: String },

    #[error("Cyclic role inheritance: {}", .path.join(" -> "))]
    CyclicInheritance { path: Vec<String> },
}

/// Raised when no grant matches the requested (resource, action, possession)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Access denied: roles {} may not {action}:{possession} resource '{resource}'",
    quote_list(.roles, ",")
)]
pub struct PermissionDeniedError {
    pub resource: String,
    pub action: Action,
    pub possession: Possession,
    pub roles: Vec<String>,
}

impl PermissionDeniedError {
    pub fn new(
        resource: impl Into<String>,
        action: Action,
        possession: Possession,
        roles: &[String],
    ) -> Self {
        Self {
            resource: resource.into(),
            action,
            possession,
            roles: roles.to_vec(),
        }
    }
}

/// Errors surfaced by the operation gate
#[derive(Error, Debug)]
pub enum GateError {
    #[error("{0}")]
    PermissionDenied(#[from] PermissionDeniedError),

    #[error(
        "providing the properties: {} on {resource} {} is forbidden for roles: {}",
        quote_list(.properties, ", "),
        .action.noun(),
        quote_list(.roles, ",")
    )]
    ForbiddenAttributes {
        resource: String,
        action: Action,
        properties: Vec<String>,
        roles: Vec<String>,
    },

    #[error("No resource was found for {selector}")]
    NotFound { selector: String },

    #[error(transparent)]
    Upstream(#[from] StoreError),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GateError {
    /// True for rejections decided by policy, before any data access
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            GateError::PermissionDenied(_) | GateError::ForbiddenAttributes { .. }
        )
    }
}

/// Errors reported by a data source
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found in '{resource}' for {selector}")]
    NotFound { resource: String, selector: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Resource '{resource}' has no relation '{relation}'")]
    UnknownRelation { resource: String, relation: String },

    #[error("Record '{id}' already exists in '{resource}'")]
    Conflict { resource: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Result type alias for gate operations
pub type GateResult<T> = std::result::Result<T, GateError>;

/// Result type alias for data source operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_attributes_message() {
        let err = GateError::ForbiddenAttributes {
            resource: "Event".into(),
            action: Action::Create,
            properties: vec!["ownerId".into(), "secret".into()],
            roles: vec!["User".into(), "Guest".into()],
        };
        assert_eq!(
            err.to_string(),
            r#"providing the properties: "ownerId", "secret" on Event creation is forbidden for roles: "User","Guest""#
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = GateError::NotFound {
            selector: r#"{"id":"missing"}"#.into(),
        };
        assert_eq!(err.to_string(), r#"No resource was found for {"id":"missing"}"#);
    }

    #[test]
    fn test_permission_denied_message() {
        let err = PermissionDeniedError::new(
            "Event",
            Action::Delete,
            Possession::Any,
            &["Viewer".to_string()],
        );
        assert!(err.to_string().contains("delete:any"));
        assert!(err.to_string().contains("'Event'"));
        assert!(err.to_string().contains("\"Viewer\""));
    }

    #[test]
    fn test_policy_rejection_classification() {
        let denied: GateError =
            PermissionDeniedError::new("Event", Action::Read, Possession::Own, &[]).into();
        assert!(denied.is_policy_rejection());

        let upstream: GateError = StoreError::Backend("boom".into()).into();
        assert!(!upstream.is_policy_rejection());
        assert_eq!(upstream.to_string(), "Backend failure: boom");
    }
}
