//! In-memory data source
//!
//! Records live in insertion order per resource behind a tokio `RwLock`.
//! Relation fields written as `{"connect": {"id": ...}}` are stored as
//! `<field>Id` foreign keys; connecting to a missing record is a not-found
//! failure, like any other missing target.

use crate::error::{StoreError, StoreResult};
use crate::schema::{ResourceDescriptor, Schema};
use crate::store::{DataSource, FindManyArgs, Record, Selector, SortOrder, value_key};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

type Tables = HashMap<String, Vec<Record>>;

/// In-memory [`DataSource`]
pub struct MemoryStore {
    schema: Arc<Schema>,
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store with one table per schema resource
    pub fn new(schema: Arc<Schema>) -> Self {
        let tables = schema
            .resources()
            .map(|descriptor| (descriptor.name.to_string(), Vec::new()))
            .collect();
        Self {
            schema,
            tables: RwLock::new(tables),
        }
    }

    /// Create a store from a fixture document: `{"Event": [{...}], "Location": [...]}`.
    ///
    /// Records are stored verbatim; each must carry an `id`.
    pub fn from_fixtures(schema: Arc<Schema>, fixtures: &Value) -> StoreResult<Self> {
        let store = Self::new(schema);
        let Some(resources) = fixtures.as_object() else {
            return Err(StoreError::Backend(
                "fixtures must be an object keyed by resource".to_string(),
            ));
        };

        {
            let mut tables = store.tables.try_write().map_err(|e| {
                StoreError::Backend(format!("store is locked during seeding: {}", e))
            })?;
            for (resource, records) in resources {
                let table = tables
                    .get_mut(resource)
                    .ok_or_else(|| StoreError::UnknownResource(resource.clone()))?;
                let records: Vec<Record> = serde_json::from_value(records.clone())?;
                for record in records {
                    let id = record.get("id").and_then(value_key).ok_or_else(|| {
                        StoreError::Backend(format!("fixture record in '{}' has no id", resource))
                    })?;
                    if table.iter().any(|r| Selector::id(id.clone()).matches(r)) {
                        return Err(StoreError::Conflict {
                            resource: resource.clone(),
                            id,
                        });
                    }
                    table.push(record);
                }
            }
        }

        Ok(store)
    }

    /// Number of records stored for a resource
    pub async fn count(&self, resource: &str) -> usize {
        self.tables
            .read()
            .await
            .get(resource)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn descriptor(&self, resource: &str) -> StoreResult<&ResourceDescriptor> {
        self.schema
            .get(resource)
            .ok_or_else(|| StoreError::UnknownResource(resource.to_string()))
    }

    /// Replace `{"connect": selector}` relation inputs with foreign keys
    fn apply_relations(
        tables: &Tables,
        descriptor: &ResourceDescriptor,
        data: Record,
    ) -> StoreResult<Record> {
        let mut stored = Record::new();
        for (key, value) in data {
            let Some(relation) = descriptor.relation(&key) else {
                stored.insert(key, value);
                continue;
            };
            match value {
                Value::Null => {
                    stored.insert(relation.foreign_key(), Value::Null);
                }
                Value::Object(mut input) => {
                    let connect = input.remove("connect").ok_or_else(|| {
                        StoreError::Backend(format!(
                            "relation '{}' expects a connect instruction",
                            key
                        ))
                    })?;
                    let selector: Selector = serde_json::from_value(connect)?;
                    let exists = tables
                        .get(relation.target)
                        .is_some_and(|table| table.iter().any(|r| selector.matches(r)));
                    if !exists {
                        return Err(StoreError::NotFound {
                            resource: relation.target.to_string(),
                            selector: selector.to_string(),
                        });
                    }
                    stored.insert(relation.foreign_key(), selector.id);
                }
                other => {
                    return Err(StoreError::Backend(format!(
                        "relation '{}' expects an object, got {}",
                        key, other
                    )));
                }
            }
        }
        Ok(stored)
    }

    fn not_found(resource: &str, selector: &Selector) -> StoreError {
        StoreError::NotFound {
            resource: resource.to_string(),
            selector: selector.to_string(),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Missing and null sort first
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl DataSource for MemoryStore {
    #[instrument(skip(self, args), fields(resource = %resource))]
    async fn find_many(&self, resource: &str, args: &FindManyArgs) -> StoreResult<Vec<Record>> {
        self.descriptor(resource)?;
        let tables = self.tables.read().await;
        let table = tables.get(resource).map(Vec::as_slice).unwrap_or_default();

        let mut results: Vec<Record> = table
            .iter()
            .filter(|record| {
                args.filter
                    .iter()
                    .all(|(key, wanted)| record.get(key).unwrap_or(&Value::Null) == wanted)
            })
            .cloned()
            .collect();

        if let Some(order_by) = &args.order_by {
            // Stable sort keeps insertion order among equal keys
            results.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order_by.field), b.get(&order_by.field));
                match order_by.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let results = results
            .into_iter()
            .skip(args.skip.unwrap_or(0))
            .take(args.take.unwrap_or(usize::MAX))
            .collect::<Vec<_>>();

        debug!(count = results.len(), "Listed records");
        Ok(results)
    }

    async fn find_one(&self, resource: &str, selector: &Selector) -> StoreResult<Option<Record>> {
        self.descriptor(resource)?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource)
            .and_then(|table| table.iter().find(|r| selector.matches(r)))
            .cloned())
    }

    #[instrument(skip(self, data), fields(resource = %resource))]
    async fn create(&self, resource: &str, data: Record) -> StoreResult<Record> {
        let descriptor = *self.descriptor(resource)?;
        let mut tables = self.tables.write().await;

        let mut record = Self::apply_relations(&tables, &descriptor, data)?;
        let id = match record.get("id").and_then(value_key) {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                record.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let table = tables.entry(resource.to_string()).or_default();
        if table.iter().any(|r| Selector::id(id.clone()).matches(r)) {
            return Err(StoreError::Conflict {
                resource: resource.to_string(),
                id,
            });
        }
        table.push(record.clone());

        debug!(id = %id, "Created record");
        Ok(record)
    }

    #[instrument(skip(self, data), fields(resource = %resource, selector = %selector))]
    async fn update(
        &self,
        resource: &str,
        selector: &Selector,
        data: Record,
    ) -> StoreResult<Record> {
        let descriptor = *self.descriptor(resource)?;
        let mut tables = self.tables.write().await;

        let changes = Self::apply_relations(&tables, &descriptor, data)?;
        let record = tables
            .get_mut(resource)
            .and_then(|table| table.iter_mut().find(|r| selector.matches(r)))
            .ok_or_else(|| Self::not_found(resource, selector))?;

        for (key, value) in changes {
            record.insert(key, value);
        }
        Ok(record.clone())
    }

    #[instrument(skip(self), fields(resource = %resource, selector = %selector))]
    async fn delete(&self, resource: &str, selector: &Selector) -> StoreResult<Record> {
        self.descriptor(resource)?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(resource)
            .ok_or_else(|| Self::not_found(resource, selector))?;
        let position = table
            .iter()
            .position(|r| selector.matches(r))
            .ok_or_else(|| Self::not_found(resource, selector))?;
        Ok(table.remove(position))
    }

    async fn find_related(
        &self,
        resource: &str,
        selector: &Selector,
        relation: &str,
    ) -> StoreResult<Option<Record>> {
        let descriptor = self.descriptor(resource)?;
        let relation = descriptor
            .relation(relation)
            .ok_or_else(|| StoreError::UnknownRelation {
                resource: resource.to_string(),
                relation: relation.to_string(),
            })?;

        let tables = self.tables.read().await;
        let Some(parent) = tables
            .get(resource)
            .and_then(|table| table.iter().find(|r| selector.matches(r)))
        else {
            return Ok(None);
        };
        let Some(target_id) = parent.get(&relation.foreign_key()).and_then(value_key) else {
            return Ok(None);
        };

        let target = Selector::id(target_id);
        Ok(tables
            .get(relation.target)
            .and_then(|table| table.iter().find(|r| target.matches(r)))
            .cloned())
    }
}
