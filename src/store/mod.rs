//! Data access
//!
//! The gate talks to storage only through [`DataSource`]. Persistence is not
//! part of this crate's decision logic; [`MemoryStore`] is a complete
//! in-process implementation used by the CLI and the tests.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::{StoreError, StoreResult};
use crate::util::render_json;
// async_trait required for dyn-compatibility with Arc<dyn DataSource>
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A record or payload: ordered attribute name to value mapping
pub type Record = serde_json::Map<String, Value>;

/// Unique record selector (`{"id": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selector {
    pub id: Value,
}

impl Selector {
    pub fn id(id: impl Into<Value>) -> Self {
        Self { id: id.into() }
    }

    /// Canonical string form of the id, if it is a string or a number
    pub fn key(&self) -> Option<String> {
        value_key(&self.id)
    }

    /// True if `record`'s `id` equals this selector's id
    pub fn matches(&self, record: &Record) -> bool {
        match (self.key(), record.get("id").and_then(value_key)) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => false,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_json(self))
    }
}

/// String and number ids compare by their textual form
pub(crate) fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Ordering by a single field, written as `{"title": "desc"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, SortOrder>",
    into = "BTreeMap<String, SortOrder>"
)]
pub struct OrderBy {
    pub field: String,
    pub order: SortOrder,
}

impl TryFrom<BTreeMap<String, SortOrder>> for OrderBy {
    type Error = String;

    fn try_from(map: BTreeMap<String, SortOrder>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((field, order)), None) => Ok(OrderBy { field, order }),
            _ => Err("orderBy must name exactly one field".to_string()),
        }
    }
}

impl From<OrderBy> for BTreeMap<String, SortOrder> {
    fn from(order: OrderBy) -> Self {
        BTreeMap::from([(order.field, order.order)])
    }
}

/// Arguments of a list query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindManyArgs {
    /// Equality filter on top-level attributes
    #[serde(rename = "where")]
    pub filter: Record,
    pub order_by: Option<OrderBy>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

/// Data access collaborator
///
/// Every call is asynchronous and may fail; the gate never retries.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn find_many(&self, resource: &str, args: &FindManyArgs) -> StoreResult<Vec<Record>>;

    async fn find_one(&self, resource: &str, selector: &Selector) -> StoreResult<Option<Record>>;

    /// Relation fields arrive as `{"connect": <selector>}`
    async fn create(&self, resource: &str, data: Record) -> StoreResult<Record>;

    async fn update(&self, resource: &str, selector: &Selector, data: Record)
    -> StoreResult<Record>;

    async fn delete(&self, resource: &str, selector: &Selector) -> StoreResult<Record>;

    /// Follow a to-one relation from the record matched by `selector`
    async fn find_related(
        &self,
        resource: &str,
        selector: &Selector,
        relation: &str,
    ) -> StoreResult<Option<Record>>;

    /// Not-found classifier, consulted on update and delete failures
    fn is_record_not_found(&self, error: &StoreError) -> bool {
        matches!(error, StoreError::NotFound { .. })
    }
}
