//! Operations
//!
//! Declarations of every exposed operation and the gate that enforces their
//! policies.

pub mod args;
pub mod definitions;
pub mod gate;
pub mod policy;
pub mod registry;

pub use args::{CreateArgs, DeleteArgs, FindManyArgs, FindOneArgs, RelationArgs, UpdateArgs};
pub use gate::Gate;
pub use policy::{OperationKind, OperationPolicy, OperationSpec};
pub use registry::OperationRegistry;
