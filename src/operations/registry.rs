//! Operation registry
//!
//! Indexes operation declarations by name and dispatches JSON arguments to
//! the gate. This is the surface a transport layer calls into.

use crate::access_control::RoleSet;
use crate::error::{GateError, GateResult};
use crate::operations::args::{CreateArgs, FindManyArgs, FindOneArgs, RelationArgs, UpdateArgs};
use crate::operations::gate::Gate;
use crate::operations::policy::{OperationKind, OperationSpec};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Operation registry
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<&'static str, OperationSpec>,
    by_resource: HashMap<&'static str, Vec<&'static str>>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation; a later registration under the same name replaces it
    pub fn register(&mut self, spec: OperationSpec) {
        let owner = match spec.kind {
            OperationKind::Relation { parent, .. } => parent,
            _ => spec.policy.resource,
        };
        if self.operations.insert(spec.name, spec).is_none() {
            self.by_resource.entry(owner).or_default().push(spec.name);
        }
        debug!(name = spec.name, policy = %spec.policy, "Registered operation");
    }

    pub fn register_all(&mut self, specs: &[OperationSpec]) {
        for spec in specs {
            self.register(*spec);
        }
    }

    /// Get an operation by name
    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.get(name)
    }

    /// All operations, ordered by name
    pub fn operations(&self) -> impl Iterator<Item = &OperationSpec> {
        self.operations.values()
    }

    /// Operations declared by a resource (relation fields belong to their parent)
    pub fn operations_for(&self, resource: &str) -> Vec<&OperationSpec> {
        self.by_resource
            .get(resource)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| self.operations.get(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of registered operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Execute an operation by name with JSON arguments
    #[instrument(skip(self, gate, roles, args), fields(operation = %name))]
    pub async fn execute(
        &self,
        gate: &Gate,
        name: &str,
        roles: &RoleSet,
        args: Value,
    ) -> GateResult<Value> {
        let start = Instant::now();

        let spec = self
            .operations
            .get(name)
            .ok_or_else(|| GateError::UnknownOperation(name.to_string()))?;
        let policy = &spec.policy;

        let result = match spec.kind {
            OperationKind::FindMany => {
                let args: FindManyArgs = parse_args(args)?;
                let records = gate.find_many(roles, policy, &args).await?;
                serde_json::to_value(records)?
            }
            OperationKind::FindOne => {
                let args: FindOneArgs = parse_args(args)?;
                let record = gate.find_one(roles, policy, &args.selector).await?;
                serde_json::to_value(record)?
            }
            OperationKind::Create => {
                let args: CreateArgs = parse_args(args)?;
                Value::Object(gate.create(roles, policy, args.data).await?)
            }
            OperationKind::Update => {
                let args: UpdateArgs = parse_args(args)?;
                Value::Object(gate.update(roles, policy, &args.selector, args.data).await?)
            }
            OperationKind::Delete => {
                let args: FindOneArgs = parse_args(args)?;
                Value::Object(gate.delete(roles, policy, &args.selector).await?)
            }
            OperationKind::Relation { parent, field } => {
                let args: RelationArgs = parse_args(args)?;
                let record = gate
                    .resolve_relation(roles, policy, parent, field, &args.parent)
                    .await?;
                serde_json::to_value(record)?
            }
        };

        info!(
            operation = name,
            roles = %roles,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Operation completed"
        );
        Ok(result)
    }
}

/// Missing arguments are treated as `{}`
fn parse_args<T: DeserializeOwned>(args: Value) -> GateResult<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| {
        warn!(error = %e, "Rejected malformed arguments");
        GateError::InvalidArguments(format!("Failed to parse arguments: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::{Action, Possession};
    use crate::operations::policy::OperationPolicy;

    const THINGS: OperationSpec = OperationSpec {
        name: "things",
        kind: OperationKind::FindMany,
        policy: OperationPolicy::new("Thing", Action::Read, Possession::Any),
    };

    #[test]
    fn test_empty_registry() {
        let registry = OperationRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get("things").is_none());
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = OperationRegistry::new();
        registry.register(THINGS);
        registry.register(THINGS);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.operations_for("Thing").len(), 1);
    }

    #[test]
    fn test_relation_belongs_to_parent() {
        let mut registry = OperationRegistry::new();
        registry.register(OperationSpec::relation("Thing.owner", "Thing", "owner", "Person"));
        assert_eq!(registry.operations_for("Thing").len(), 1);
        assert!(registry.operations_for("Person").is_empty());
    }

    #[test]
    fn test_parse_args_null_is_empty() {
        let args: FindManyArgs = parse_args(Value::Null).unwrap();
        assert_eq!(args, FindManyArgs::default());

        let err = parse_args::<FindOneArgs>(Value::Null).unwrap_err();
        assert!(matches!(err, GateError::InvalidArguments(_)));
    }
}
