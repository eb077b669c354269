//! Event operations
//!
//! Events belong to one customer and take place at one location.

use crate::access_control::{Action, Possession};
use crate::operations::OperationRegistry;
use crate::operations::policy::{OperationKind, OperationPolicy, OperationSpec};
use crate::schema::{RelationDescriptor, ResourceDescriptor};

pub const RESOURCE: &str = "Event";

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    name: RESOURCE,
    attributes: &[
        "id",
        "createdAt",
        "updatedAt",
        "title",
        "description",
        "startsAt",
        "endsAt",
        "customer",
        "customerId",
        "location",
        "locationId",
    ],
    relations: &[
        RelationDescriptor {
            field: "customer",
            target: "Customer",
        },
        RelationDescriptor {
            field: "location",
            target: "Location",
        },
    ],
};

pub const OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "events",
        kind: OperationKind::FindMany,
        policy: OperationPolicy::new(RESOURCE, Action::Read, Possession::Any),
    },
    OperationSpec {
        name: "event",
        kind: OperationKind::FindOne,
        policy: OperationPolicy::new(RESOURCE, Action::Read, Possession::Own),
    },
    OperationSpec {
        name: "createEvent",
        kind: OperationKind::Create,
        policy: OperationPolicy::new(RESOURCE, Action::Create, Possession::Any),
    },
    OperationSpec {
        name: "updateEvent",
        kind: OperationKind::Update,
        policy: OperationPolicy::new(RESOURCE, Action::Update, Possession::Any),
    },
    OperationSpec {
        name: "deleteEvent",
        kind: OperationKind::Delete,
        policy: OperationPolicy::new(RESOURCE, Action::Delete, Possession::Any),
    },
    OperationSpec::relation("Event.customer", RESOURCE, "customer", "Customer"),
    OperationSpec::relation("Event.location", RESOURCE, "location", "Location"),
];

/// Register event operations with the registry
pub fn register(registry: &mut OperationRegistry) {
    registry.register_all(OPERATIONS);
}
