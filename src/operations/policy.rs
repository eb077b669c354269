//! Operation policy declarations
//!
//! Each exposed operation states, as plain data, which
//! `(resource, action, possession)` it requires. The gate reads these at
//! call time.

use crate::access_control::{Action, Possession};
use serde::Serialize;
use std::fmt;

/// Required `(resource, action, possession)` of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperationPolicy {
    pub resource: &'static str,
    pub action: Action,
    pub possession: Possession,
}

impl OperationPolicy {
    pub const fn new(resource: &'static str, action: Action, possession: Possession) -> Self {
        Self {
            resource,
            action,
            possession,
        }
    }
}

impl fmt::Display for OperationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.action, self.possession, self.resource)
    }
}

/// Shape of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    /// List query, output filtered per element
    FindMany,
    /// Single record by selector, output filtered
    FindOne,
    /// Create, input validated
    Create,
    /// Update by selector, input validated
    Update,
    /// Delete by selector
    Delete,
    /// To-one relation field read off a parent record
    Relation {
        parent: &'static str,
        field: &'static str,
    },
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::FindMany => "find_many",
            OperationKind::FindOne => "find_one",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Relation { .. } => "relation",
        }
    }
}

/// A named operation and the policy it declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: OperationKind,
    pub policy: OperationPolicy,
}

impl OperationSpec {
    /// Relation field operation; the related resource is read with `read:any`
    pub const fn relation(
        name: &'static str,
        parent: &'static str,
        field: &'static str,
        target: &'static str,
    ) -> Self {
        Self {
            name,
            kind: OperationKind::Relation { parent, field },
            policy: OperationPolicy::new(target, Action::Read, Possession::Any),
        }
    }
}
