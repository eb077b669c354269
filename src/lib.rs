//! Role- and attribute-based access control for a resource API
//!
//! Every operation on `Event`, `Location` and `Customer` records passes
//! through a gate that decides, for the caller's roles and the operation's
//! `(resource, action, possession)`:
//!
//! - whether the operation is allowed at all,
//! - which attributes of an inbound payload the caller may not set,
//! - which attributes of an outbound record the caller may see.
//!
//! ## Permission Model
//!
//! ```text
//! caller roles → inheritance closure → matching grants → union of attributes
//! ```
//!
//! Grants are exact `(resource, action, possession)` triples carrying an
//! attribute scope in glob notation:
//! - `"*"` all attributes
//! - `"title"` allow one attribute
//! - `"!title"` deny one attribute
//!
//! ## Example Configuration
//!
//! ```toml
//! [[policy.roles]]
//! name = "User"
//! grants = [
//!   { resource = "Event", action = "read", possession = "any", attributes = ["*", "!customer"] },
//!   { resource = "Event", action = "create", possession = "any", attributes = ["title", "startsAt"] },
//! ]
//!
//! [[policy.roles]]
//! name = "Admin"
//! extends = ["User"]
//! grants = [
//!   { resource = "Event", action = "delete", possession = "any" },
//! ]
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod operations;
pub mod schema;
pub mod store;
pub mod util;

// Re-export main types
pub use access_control::{Permission, PermissionResolver, RoleSet};
pub use config::{AppConfig, load_config};
pub use error::{ConfigError, GateError};
pub use operations::{Gate, OperationRegistry};
pub use store::{DataSource, MemoryStore};
