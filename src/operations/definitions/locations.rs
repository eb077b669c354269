//! Location operations

use crate::access_control::{Action, Possession};
use crate::operations::OperationRegistry;
use crate::operations::policy::{OperationKind, OperationPolicy, OperationSpec};
use crate::schema::ResourceDescriptor;

pub const RESOURCE: &str = "Location";

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    name: RESOURCE,
    attributes: &["id", "createdAt", "updatedAt", "name", "address"],
    relations: &[],
};

pub const OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "locations",
        kind: OperationKind::FindMany,
        policy: OperationPolicy::new(RESOURCE, Action::Read, Possession::Any),
    },
    OperationSpec {
        name: "location",
        kind: OperationKind::FindOne,
        policy: OperationPolicy::new(RESOURCE, Action::Read, Possession::Own),
    },
    OperationSpec {
        name: "createLocation",
        kind: OperationKind::Create,
        policy: OperationPolicy::new(RESOURCE, Action::Create, Possession::Any),
    },
    OperationSpec {
        name: "updateLocation",
        kind: OperationKind::Update,
        policy: OperationPolicy::new(RESOURCE, Action::Update, Possession::Any),
    },
    OperationSpec {
        name: "deleteLocation",
        kind: OperationKind::Delete,
        policy: OperationPolicy::new(RESOURCE, Action::Delete, Possession::Any),
    },
];

pub fn register(registry: &mut OperationRegistry) {
    registry.register_all(OPERATIONS);
}
