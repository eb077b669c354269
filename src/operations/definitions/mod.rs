//! Operation definitions
//!
//! Every exposed operation of the application, grouped by the resource that
//! owns it, together with the resource descriptors.

pub mod customers;
pub mod events;
pub mod locations;

use crate::operations::OperationRegistry;
use crate::schema::Schema;

/// Descriptors of every resource type
pub fn schema() -> Schema {
    Schema::new()
        .with(events::DESCRIPTOR)
        .with(locations::DESCRIPTOR)
        .with(customers::DESCRIPTOR)
}

/// Register all operations with the registry
pub fn register_all_operations(registry: &mut OperationRegistry) {
    events::register(registry);
    locations::register(registry);
    customers::register(registry);
}
