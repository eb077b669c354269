//! Resource type descriptors
//!
//! Describe which attributes and relations exist on each resource. They are
//! used to validate grants and to recognise relation fields in payloads, never
//! stored as runtime state of a record.

use serde::Serialize;
use std::collections::BTreeMap;

/// A to-one relation from one resource to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationDescriptor {
    /// Field name on the owning resource (e.g. `location`)
    pub field: &'static str,
    /// Related resource type (e.g. `Location`)
    pub target: &'static str,
}

impl RelationDescriptor {
    /// Name of the stored foreign key (`location` -> `locationId`)
    pub fn foreign_key(&self) -> String {
        format!("{}Id", self.field)
    }
}

/// Attributes and relations of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub attributes: &'static [&'static str],
    pub relations: &'static [RelationDescriptor],
}

impl ResourceDescriptor {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn relation(&self, field: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.field == field)
    }
}

/// All resource types known to the application
#[derive(Debug, Clone, Default)]
pub struct Schema {
    resources: BTreeMap<&'static str, ResourceDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ResourceDescriptor) {
        self.resources.insert(descriptor.name, descriptor);
    }

    pub fn with(mut self, descriptor: ResourceDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(name)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THING: ResourceDescriptor = ResourceDescriptor {
        name: "Thing",
        attributes: &["id", "name", "owner"],
        relations: &[RelationDescriptor {
            field: "owner",
            target: "Person",
        }],
    };

    #[test]
    fn test_descriptor_lookup() {
        assert!(THING.has_attribute("name"));
        assert!(!THING.has_attribute("ownerId"));
        assert_eq!(THING.relation("owner").unwrap().target, "Person");
        assert_eq!(THING.relation("owner").unwrap().foreign_key(), "ownerId");
        assert!(THING.relation("name").is_none());
    }

    #[test]
    fn test_schema_register() {
        let schema = Schema::new().with(THING);
        assert_eq!(schema.len(), 1);
        assert!(schema.get("Thing").is_some());
        assert!(schema.get("thing").is_none());
    }
}
