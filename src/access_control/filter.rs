//! Attribute filter
//!
//! Applies a resolved [`Permission`] to inbound payloads and outbound objects.
//! Only top-level keys are inspected: a relation written as
//! `{"location": {"id": "..."}}` is checked as `location`.
//!
//! Callers must check [`Permission::granted`] first; the filter assumes a
//! granted permission.

use crate::access_control::permission::Permission;
use crate::store::Record;

/// Keys present in `payload` that the permission does not allow, in payload order.
///
/// Always empty for an unrestricted permission.
pub fn invalid_attributes(permission: &Permission, payload: &Record) -> Vec<String> {
    if permission.attributes().is_unrestricted() {
        return Vec::new();
    }
    payload
        .keys()
        .filter(|key| !permission.attributes().contains(key))
        .cloned()
        .collect()
}

/// Shallow copy of `object` keeping only allowed keys. The input is not modified.
pub fn filter_object(permission: &Permission, object: &Record) -> Record {
    if permission.attributes().is_unrestricted() {
        return object.clone();
    }
    object
        .iter()
        .filter(|(key, _)| permission.attributes().contains(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
