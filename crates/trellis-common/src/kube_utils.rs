//! Helpers for semi-structured Kubernetes objects
//!
//! The topology compiler handles provider-specific objects (infrastructure
//! clusters, control planes, machine templates) as [`DynamicObject`]s. These
//! helpers cover the handful of cross-cutting operations on them: building
//! references, deriving group-kinds, and stripping server-assigned metadata.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::{DynamicObject, ObjectMeta, TypeMeta};

/// Parse apiVersion into (group, version)
///
/// # Examples
/// ```
/// use trellis_common::kube_utils::parse_api_version;
///
/// let (group, version) = parse_api_version("cluster.x-k8s.io/v1alpha4");
/// assert_eq!(group, "cluster.x-k8s.io");
/// assert_eq!(version, "v1alpha4");
///
/// let (group, version) = parse_api_version("v1");
/// assert_eq!(group, "");
/// assert_eq!(version, "v1");
/// ```
pub fn parse_api_version(api_version: &str) -> (String, String) {
    match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

/// Format a group-kind the way Kubernetes prints it: `Kind.group`, or just
/// `Kind` for the core group
pub fn group_kind(api_version: &str, kind: &str) -> String {
    let (group, _) = parse_api_version(api_version);
    if group.is_empty() {
        kind.to_string()
    } else {
        format!("{kind}.{group}")
    }
}

/// Group-kind of the object a reference points at
pub fn reference_group_kind(reference: &ObjectReference) -> String {
    group_kind(
        reference.api_version.as_deref().unwrap_or_default(),
        reference.kind.as_deref().unwrap_or_default(),
    )
}

/// apiVersion and kind of a dynamic object, empty strings when absent
pub fn type_meta(object: &DynamicObject) -> (&str, &str) {
    object
        .types
        .as_ref()
        .map(|t| (t.api_version.as_str(), t.kind.as_str()))
        .unwrap_or(("", ""))
}

/// Kind of a dynamic object, empty when the object carries no type info
pub fn kind_of(object: &DynamicObject) -> &str {
    type_meta(object).1
}

/// Set apiVersion and kind on a dynamic object
pub fn set_type_meta(object: &mut DynamicObject, api_version: &str, kind: &str) {
    object.types = Some(TypeMeta {
        api_version: api_version.to_string(),
        kind: kind.to_string(),
    });
}

/// Build a reference (apiVersion/kind/name/namespace) to an object
pub fn object_to_reference(object: &DynamicObject) -> ObjectReference {
    let (api_version, kind) = type_meta(object);
    ObjectReference {
        api_version: Some(api_version.to_string()),
        kind: Some(kind.to_string()),
        name: object.metadata.name.clone(),
        namespace: object.metadata.namespace.clone(),
        ..Default::default()
    }
}

/// Name carried by a reference, if present and non-empty
pub fn reference_name(reference: Option<&ObjectReference>) -> Option<&str> {
    reference
        .and_then(|r| r.name.as_deref())
        .filter(|name| !name.is_empty())
}

/// Strip metadata assigned by the API server so a copy can be created anew.
///
/// Removes:
/// - uid, resourceVersion, generation, creationTimestamp
/// - managedFields (server-side apply ownership tracking)
/// - finalizers and ownerReferences, which belong to the source object
pub fn strip_server_metadata(meta: &mut ObjectMeta) {
    meta.uid = None;
    meta.resource_version = None;
    meta.generation = None;
    meta.creation_timestamp = None;
    meta.managed_fields = None;
    meta.finalizers = None;
    meta.owner_references = None;
}
