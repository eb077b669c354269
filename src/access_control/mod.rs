//! Access control module
//!
//! Role-based and attribute-based access control for CRUD operations.
//!
//! ## Access Control Model
//!
//! ```text
//! caller roles → inheritance closure → matching grants → Permission → attribute filter
//! ```
//!
//! - A **grant** binds `(resource, action, possession)` to an attribute scope
//! - A **role** holds grants and may extend other roles
//! - A **permission** is resolved per query: granted if any effective role holds
//!   a grant matching exactly, with the union of the matching grants' attributes
//! - `own` and `any` are distinct: an `own` grant never satisfies an `any` query
//!
//! ## Example Configuration
//!
//! ```toml
//! [[policy.roles]]
//! name = "Viewer"
//! grants = [
//!   { resource = "Location", action = "read", possession = "any", attributes = ["name"] },
//! ]
//!
//! [[policy.roles]]
//! name = "Admin"
//! extends = ["Viewer"]
//! grants = [
//!   { resource = "Event", action = "read", possession = "any", attributes = ["*", "!secret"] },
//! ]
//! ```

pub mod attributes;
pub mod filter;
pub mod hierarchy;
pub mod permission;
pub mod resolver;
pub mod types;

pub use attributes::AttributeSet;
pub use filter::{filter_object, invalid_attributes};
pub use hierarchy::{Grant, RoleHierarchy};
pub use permission::Permission;
pub use resolver::PermissionResolver;
pub use types::{Action, Possession, RoleSet};
