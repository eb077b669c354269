//! Operation gate
//!
//! Enforces authorization and attribute filtering around every operation:
//!
//! ```text
//! authorize → (reject | validate input) → dispatch → (filter output) → done
//!                                            └→ not found (update/delete)
//! ```
//!
//! Rejections always happen before the data source is called. Create, update
//! and delete return the written record unfiltered.

use crate::access_control::{
    Permission, PermissionResolver, RoleSet, filter_object, invalid_attributes,
};
use crate::error::{GateError, GateResult, StoreError};
use crate::operations::policy::OperationPolicy;
use crate::schema::Schema;
use crate::store::{DataSource, FindManyArgs, Record, Selector};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Operation gate
#[derive(Clone)]
pub struct Gate {
    resolver: PermissionResolver,
    store: Arc<dyn DataSource>,
    schema: Arc<Schema>,
}

impl Gate {
    pub fn new(
        resolver: PermissionResolver,
        store: Arc<dyn DataSource>,
        schema: Arc<Schema>,
    ) -> Self {
        Self {
            resolver,
            store,
            schema,
        }
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolve the permission for a policy and reject if it is not granted
    fn authorize(&self, roles: &RoleSet, policy: &OperationPolicy) -> GateResult<Permission> {
        let permission =
            self.resolver
                .resolve(roles, policy.resource, policy.action, policy.possession);

        if let Err(denied) = permission.require() {
            // Audit log: access denied
            warn!(
                resource = policy.resource,
                action = %policy.action,
                possession = %policy.possession,
                roles = %roles,
                "Access denied"
            );
            return Err(denied.into());
        }
        Ok(permission)
    }

    /// Reject payloads naming attributes outside the permission
    fn validate_input(&self, permission: &Permission, data: &Record) -> GateResult<()> {
        let properties = invalid_attributes(permission, data);
        if properties.is_empty() {
            return Ok(());
        }

        warn!(
            resource = permission.resource(),
            action = %permission.action(),
            properties = ?properties,
            roles = ?permission.roles(),
            "Forbidden attributes in payload"
        );
        Err(GateError::ForbiddenAttributes {
            resource: permission.resource().to_string(),
            action: permission.action(),
            properties,
            roles: permission.roles().to_vec(),
        })
    }

    /// Rewrite relation fields into connect instructions; null means unset
    fn connect_relations(&self, resource: &str, mut data: Record) -> Record {
        let Some(descriptor) = self.schema.get(resource) else {
            return data;
        };
        for relation in descriptor.relations {
            match data.remove(relation.field) {
                None | Some(Value::Null) => {}
                Some(reference) => {
                    let mut connect = Record::new();
                    connect.insert("connect".to_string(), reference);
                    data.insert(relation.field.to_string(), Value::Object(connect));
                }
            }
        }
        data
    }

    /// Translate the collaborator's not-found signal; everything else passes through
    fn translate_not_found(&self, error: StoreError, selector: &Selector) -> GateError {
        if self.store.is_record_not_found(&error) {
            debug!(error = %error, "Target record not found");
            GateError::NotFound {
                selector: selector.to_string(),
            }
        } else {
            GateError::Upstream(error)
        }
    }

    /// List read: `read:any`, every element filtered independently
    #[instrument(skip(self, roles, args), fields(resource = policy.resource))]
    pub async fn find_many(
        &self,
        roles: &RoleSet,
        policy: &OperationPolicy,
        args: &FindManyArgs,
    ) -> GateResult<Vec<Record>> {
        let permission = self.authorize(roles, policy)?;
        let results = self.store.find_many(policy.resource, args).await?;
        Ok(results
            .iter()
            .map(|result| filter_object(&permission, result))
            .collect())
    }

    /// Single read: `read:own`; a missing record is `None`, not an error
    #[instrument(skip(self, roles, selector), fields(resource = policy.resource, selector = %selector))]
    pub async fn find_one(
        &self,
        roles: &RoleSet,
        policy: &OperationPolicy,
        selector: &Selector,
    ) -> GateResult<Option<Record>> {
        let permission = self.authorize(roles, policy)?;
        let result = self.store.find_one(policy.resource, selector).await?;
        Ok(result.map(|record| filter_object(&permission, &record)))
    }

    /// Create: `create:any`, payload validated before dispatch
    #[instrument(skip(self, roles, data), fields(resource = policy.resource))]
    pub async fn create(
        &self,
        roles: &RoleSet,
        policy: &OperationPolicy,
        data: Record,
    ) -> GateResult<Record> {
        let permission = self.authorize(roles, policy)?;
        self.validate_input(&permission, &data)?;

        let data = self.connect_relations(policy.resource, data);
        Ok(self.store.create(policy.resource, data).await?)
    }

    /// Update: `update:any`, payload validated, not-found translated
    #[instrument(skip(self, roles, selector, data), fields(resource = policy.resource, selector = %selector))]
    pub async fn update(
        &self,
        roles: &RoleSet,
        policy: &OperationPolicy,
        selector: &Selector,
        data: Record,
    ) -> GateResult<Record> {
        let permission = self.authorize(roles, policy)?;
        self.validate_input(&permission, &data)?;

        let data = self.connect_relations(policy.resource, data);
        self.store
            .update(policy.resource, selector, data)
            .await
            .map_err(|e| self.translate_not_found(e, selector))
    }

    /// Delete: `delete:any`, not-found translated, no filtering
    #[instrument(skip(self, roles, selector), fields(resource = policy.resource, selector = %selector))]
    pub async fn delete(
        &self,
        roles: &RoleSet,
        policy: &OperationPolicy,
        selector: &Selector,
    ) -> GateResult<Record> {
        self.authorize(roles, policy)?;
        self.store
            .delete(policy.resource, selector)
            .await
            .map_err(|e| self.translate_not_found(e, selector))
    }

    /// Relation field: the related resource is authorized on its own,
    /// independently of any permission over `parent_resource`.
    #[instrument(skip(self, roles, parent), fields(resource = policy.resource))]
    pub async fn resolve_relation(
        &self,
        roles: &RoleSet,
        policy: &OperationPolicy,
        parent_resource: &str,
        field: &str,
        parent: &Record,
    ) -> GateResult<Option<Record>> {
        let permission = self.authorize(roles, policy)?;

        let id = parent.get("id").cloned().unwrap_or(Value::Null);
        if id.is_null() {
            return Err(GateError::InvalidArguments(format!(
                "parent {} has no id",
                parent_resource
            )));
        }

        let result = self
            .store
            .find_related(parent_resource, &Selector::id(id), field)
            .await?;
        Ok(result.map(|record| filter_object(&permission, &record)))
    }
}
