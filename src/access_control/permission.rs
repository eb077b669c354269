//! Resolved permission value

use crate::access_control::attributes::AttributeSet;
use crate::access_control::types::{Action, Possession};
use crate::error::PermissionDeniedError;
use serde::Serialize;

/// Result of resolving one `(roles, resource, action, possession)` query.
///
/// Created fresh for every request and never cached: caller role sets
/// differ per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    resource: String,
    action: Action,
    possession: Possession,
    roles: Vec<String>,
    granted: bool,
    attributes: AttributeSet,
}

impl Permission {
    pub(crate) fn new(
        resource: impl Into<String>,
        action: Action,
        possession: Possession,
        roles: Vec<String>,
        attributes: Option<AttributeSet>,
    ) -> Self {
        let granted = attributes.is_some();
        Self {
            resource: resource.into(),
            action,
            possession,
            roles,
            granted,
            attributes: attributes.unwrap_or_else(AttributeSet::none),
        }
    }

    pub fn granted(&self) -> bool {
        self.granted
    }

    /// Allowed attributes; empty when not granted
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn allows(&self, attribute: &str) -> bool {
        self.granted && self.attributes.contains(attribute)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn possession(&self) -> Possession {
        self.possession
    }

    /// Caller roles the permission was resolved for, as supplied
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Turn an ungranted permission into a rejection
    pub fn require(&self) -> Result<&Self, PermissionDeniedError> {
        if self.granted {
            Ok(self)
        } else {
            Err(PermissionDeniedError::new(
                &self.resource,
                self.action,
                self.possession,
                &self.roles,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_permission_has_no_attributes() {
        let permission = Permission::new(
            "Event",
            Action::Read,
            Possession::Any,
            vec!["Viewer".into()],
            None,
        );
        assert!(!permission.granted());
        assert!(permission.attributes().is_empty());
        assert!(!permission.allows("title"));

        let err = permission.require().unwrap_err();
        assert_eq!(err.resource, "Event");
        assert_eq!(err.roles, vec!["Viewer"]);
    }

    #[test]
    fn test_granted_permission() {
        let permission = Permission::new(
            "Event",
            Action::Read,
            Possession::Any,
            vec![],
            Some(AttributeSet::only(["title"])),
        );
        assert!(permission.require().is_ok());
        assert!(permission.allows("title"));
        assert!(!permission.allows("secret"));
    }
}
