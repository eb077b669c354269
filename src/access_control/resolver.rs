//! Permission resolver
//!
//! Resolves caller roles into a [`Permission`]:
//! 1. Expand the roles through inheritance (each role visited once)
//! 2. Collect every grant matching `(resource, action, possession)` exactly
//! 3. No match: not granted, empty attribute set
//! 4. Otherwise granted, attributes are the union over all matching grants
//!
//! The union is commutative, so neither role order nor grant order matters.

use crate::access_control::attributes::AttributeSet;
use crate::access_control::hierarchy::{Grant, RoleHierarchy};
use crate::access_control::permission::Permission;
use crate::access_control::types::{Action, Possession, RoleSet};
use crate::config::PolicyConfig;
use crate::error::ConfigError;
use std::sync::Arc;
use tracing::{debug, trace};

/// Permission resolver
///
/// Cheap to clone; the hierarchy is shared and never mutated.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    hierarchy: Arc<RoleHierarchy>,
}

impl PermissionResolver {
    /// Create a new resolver from configuration
    pub fn new(config: &PolicyConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_hierarchy(Arc::new(RoleHierarchy::new(config)?)))
    }

    pub fn from_hierarchy(hierarchy: Arc<RoleHierarchy>) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    /// Resolve the permission for a query
    pub fn resolve(
        &self,
        roles: &RoleSet,
        resource: &str,
        action: Action,
        possession: Possession,
    ) -> Permission {
        let effective = self.hierarchy.effective_roles(roles.iter());

        let mut attributes: Option<AttributeSet> = None;
        for role in &effective {
            for grant in self.hierarchy.grants_of(role) {
                if !self.grant_applies(grant, resource, action, possession) {
                    continue;
                }
                trace!(role = %role, resource, %action, possession = %grant.possession, "Matched grant");
                attributes = Some(match attributes {
                    None => grant.attributes.clone(),
                    Some(acc) => acc.union(&grant.attributes),
                });
            }
        }

        debug!(
            roles = %roles,
            resource,
            %action,
            %possession,
            granted = attributes.is_some(),
            "Resolved permission"
        );

        Permission::new(
            resource,
            action,
            possession,
            roles.as_slice().to_vec(),
            attributes,
        )
    }

    fn grant_applies(
        &self,
        grant: &Grant,
        resource: &str,
        action: Action,
        possession: Possession,
    ) -> bool {
        if grant.matches(resource, action, possession) {
            return true;
        }
        // `any` may stand in for `own`, never the other way round
        self.hierarchy.any_implies_own()
            && possession == Possession::Own
            && grant.matches(resource, action, Possession::Any)
    }

    /// Create a resolver with no roles (denies everything)
    pub fn deny_all() -> Self {
        Self::from_hierarchy(Arc::new(RoleHierarchy::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GrantConfig, RoleConfig};

    fn resolver(roles: Vec<RoleConfig>, any_implies_own: bool) -> PermissionResolver {
        PermissionResolver::new(&PolicyConfig {
            any_implies_own,
            roles,
        })
        .unwrap()
    }

    fn user_policy() -> Vec<RoleConfig> {
        vec![
            RoleConfig::new("User").grant(GrantConfig::new(
                "Event",
                Action::Create,
                Possession::Any,
                &["title"],
            )),
            RoleConfig::new("Editor").extends("User").grant(GrantConfig::new(
                "Event",
                Action::Create,
                Possession::Any,
                &["description"],
            )),
            RoleConfig::new("Owner").grant(GrantConfig::new(
                "Event",
                Action::Read,
                Possession::Own,
                &["*"],
            )),
        ]
    }

    #[test]
    fn test_deny_all() {
        let permission = PermissionResolver::deny_all().resolve(
            &RoleSet::new(["Admin"]),
            "Event",
            Action::Read,
            Possession::Any,
        );
        assert!(!permission.granted());
    }

    #[test]
    fn test_no_matching_grant() {
        let resolver = resolver(user_policy(), false);
        let permission = resolver.resolve(
            &RoleSet::new(["User"]),
            "Event",
            Action::Delete,
            Possession::Any,
        );
        assert!(!permission.granted());
        assert!(permission.attributes().is_empty());
    }

    #[test]
    fn test_inherited_grants_are_unioned() {
        let resolver = resolver(user_policy(), false);
        let permission = resolver.resolve(
            &RoleSet::new(["Editor"]),
            "Event",
            Action::Create,
            Possession::Any,
        );
        assert!(permission.granted());
        assert_eq!(
            permission.attributes(),
            &AttributeSet::only(["title", "description"])
        );
    }

    #[test]
    fn test_own_does_not_satisfy_any() {
        let resolver = resolver(user_policy(), true);
        let permission = resolver.resolve(
            &RoleSet::new(["Owner"]),
            "Event",
            Action::Read,
            Possession::Any,
        );
        assert!(!permission.granted());
    }

    #[test]
    fn test_any_satisfies_own_only_when_enabled() {
        let roles = vec![RoleConfig::new("Admin").grant(GrantConfig::new(
            "Event",
            Action::Read,
            Possession::Any,
            &["*"],
        ))];
        let caller = RoleSet::new(["Admin"]);

        let strict = resolver(roles.clone(), false);
        assert!(
            !strict
                .resolve(&caller, "Event", Action::Read, Possession::Own)
                .granted()
        );

        let relaxed = resolver(roles, true);
        assert!(
            relaxed
                .resolve(&caller, "Event", Action::Read, Possession::Own)
                .granted()
        );
    }

    #[test]
    fn test_role_order_is_irrelevant() {
        let resolver = resolver(user_policy(), false);
        let a = resolver.resolve(
            &RoleSet::new(["User", "Editor"]),
            "Event",
            Action::Create,
            Possession::Any,
        );
        let b = resolver.resolve(
            &RoleSet::new(["Editor", "User"]),
            "Event",
            Action::Create,
            Possession::Any,
        );
        assert_eq!(a.attributes(), b.attributes());
        assert_eq!(a.granted(), b.granted());
    }
}
