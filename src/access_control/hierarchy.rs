//! Role hierarchy and grant table
//!
//! Compiled once from [`PolicyConfig`] and treated as immutable afterwards.
//! Inheritance is validated to be acyclic at load time, but closure expansion
//! still visits every role at most once.

use crate::access_control::attributes::{AttributeSet, is_identifier};
use crate::access_control::types::{Action, Possession};
use crate::config::{PolicyConfig, RoleConfig};
use crate::error::ConfigError;
use crate::schema::Schema;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// A compiled grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub resource: String,
    pub action: Action,
    pub possession: Possession,
    pub attributes: AttributeSet,
}

impl Grant {
    /// Exact `(resource, action, possession)` match
    pub fn matches(&self, resource: &str, action: Action, possession: Possession) -> bool {
        self.resource == resource && self.action == action && self.possession == possession
    }
}

/// Compiled role definition
#[derive(Debug, Clone)]
struct CompiledRole {
    extends: Vec<String>,
    grants: Vec<Grant>,
}

/// Role hierarchy and grant table
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    roles: HashMap<String, CompiledRole>,
    any_implies_own: bool,
}

impl RoleHierarchy {
    /// Compile and validate a policy
    pub fn new(config: &PolicyConfig) -> Result<Self, ConfigError> {
        let mut roles = HashMap::with_capacity(config.roles.len());

        for role in &config.roles {
            if !is_role_name(&role.name) {
                return Err(ConfigError::Invalid {
                    message: format!("Invalid role name: '{}'", role.name),
                });
            }
            if roles.contains_key(&role.name) {
                return Err(ConfigError::Invalid {
                    message: format!("Duplicate role: '{}'", role.name),
                });
            }
            roles.insert(role.name.clone(), Self::compile_role(role)?);
        }

        let hierarchy = Self {
            roles,
            any_implies_own: config.any_implies_own,
        };
        hierarchy.check_inheritance()?;

        debug!(roles = hierarchy.roles.len(), "Compiled role hierarchy");
        Ok(hierarchy)
    }

    fn compile_role(config: &RoleConfig) -> Result<CompiledRole, ConfigError> {
        let grants = config
            .grants
            .iter()
            .map(|grant| {
                let attributes = AttributeSet::parse(&grant.attributes).map_err(|attribute| {
                    ConfigError::InvalidAttribute {
                        role: config.name.clone(),
                        attribute,
                    }
                })?;
                Ok(Grant {
                    resource: grant.resource.clone(),
                    action: grant.action,
                    possession: grant.possession,
                    attributes,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(CompiledRole {
            extends: config.extends.clone(),
            grants,
        })
    }

    /// Reject unknown parents, self-extension and cycles
    fn check_inheritance(&self) -> Result<(), ConfigError> {
        for (name, role) in &self.roles {
            for parent in &role.extends {
                if !self.roles.contains_key(parent) {
                    return Err(ConfigError::UnknownRole {
                        role: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        // Depth-first search with an explicit path; sorted for stable error output
        let mut names: Vec<&String> = self.roles.keys().collect();
        names.sort();
        let mut finished: HashSet<&str> = HashSet::new();
        for name in names {
            let mut path = Vec::new();
            self.visit_for_cycles(name, &mut path, &mut finished)?;
        }
        Ok(())
    }

    fn visit_for_cycles<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        finished: &mut HashSet<&'a str>,
    ) -> Result<(), ConfigError> {
        if finished.contains(name) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|p| *p == name) {
            let mut cycle: Vec<String> = path[start..].iter().map(|p| p.to_string()).collect();
            cycle.push(name.to_string());
            return Err(ConfigError::CyclicInheritance { path: cycle });
        }

        path.push(name);
        if let Some(role) = self.roles.get(name) {
            for parent in &role.extends {
                self.visit_for_cycles(parent, path, finished)?;
            }
        }
        path.pop();
        finished.insert(name);
        Ok(())
    }

    /// Whether an `any` grant also satisfies an `own` query
    pub fn any_implies_own(&self) -> bool {
        self.any_implies_own
    }

    /// Declared role names, sorted
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All roles reachable from `roles` through inheritance, including themselves.
    ///
    /// Unknown roles contribute nothing.
    pub fn effective_roles<'a, I>(&self, roles: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut visited = BTreeSet::new();
        let mut pending: Vec<&str> = roles.into_iter().collect();

        while let Some(name) = pending.pop() {
            if visited.contains(name) {
                continue;
            }
            let Some(role) = self.roles.get(name) else {
                debug!(role = name, "Ignoring undeclared role");
                continue;
            };
            visited.insert(name.to_string());
            pending.extend(role.extends.iter().map(String::as_str));
        }

        visited
    }

    /// Grants held directly (not inherited) by a role
    pub fn grants_of(&self, role: &str) -> &[Grant] {
        self.roles
            .get(role)
            .map(|r| r.grants.as_slice())
            .unwrap_or_default()
    }

    /// Warn about grants naming resources or attributes the schema does not declare.
    ///
    /// Returns the number of findings.
    pub fn validate_against(&self, schema: &Schema) -> usize {
        let mut findings = 0;
        for name in self.role_names() {
            for grant in self.grants_of(name) {
                let Some(descriptor) = schema.get(&grant.resource) else {
                    warn!(role = name, resource = %grant.resource, "Grant names unknown resource");
                    findings += 1;
                    continue;
                };
                let named = match &grant.attributes {
                    AttributeSet::All => continue,
                    AttributeSet::Only(names) | AttributeSet::Except(names) => names,
                };
                for attribute in named {
                    if !descriptor.has_attribute(attribute) {
                        warn!(
                            role = name,
                            resource = %grant.resource,
                            attribute = %attribute,
                            "Grant names unknown attribute"
                        );
                        findings += 1;
                    }
                }
            }
        }
        findings
    }
}

fn is_role_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    // Role names additionally allow '-', otherwise they follow attribute identifiers
    is_identifier(&name.replace('-', "_"))
}
