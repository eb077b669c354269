//! Argument shapes accepted by the operation registry

use crate::store::{Record, Selector};
use serde::{Deserialize, Serialize};

pub use crate::store::FindManyArgs;

/// `{"where": {"id": ...}}`, used by single reads and deletes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindOneArgs {
    #[serde(rename = "where")]
    pub selector: Selector,
}

pub type DeleteArgs = FindOneArgs;

/// `{"data": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateArgs {
    pub data: Record,
}

/// `{"where": {"id": ...}, "data": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateArgs {
    #[serde(rename = "where")]
    pub selector: Selector,
    pub data: Record,
}

/// `{"parent": {...}}`: the already fetched parent record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationArgs {
    pub parent: Record,
}
