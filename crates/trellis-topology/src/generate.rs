//! Generating standalone objects from templates
//!
//! A template (e.g. `DockerClusterTemplate`) wraps the object it stamps out
//! under `spec.template`. [`SpecTemplateGenerator`] lifts that body into a
//! concrete object (`DockerCluster`) scoped to one cluster.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::{DynamicObject, ObjectMeta};
#[cfg(test)]
use mockall::automock;

use trellis_common::constants::{
    CLUSTER_NAME_LABEL, TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION,
    TEMPLATE_CLONED_FROM_NAME_ANNOTATION, TEMPLATE_SUFFIX,
};
use trellis_common::kube_utils::{
    reference_group_kind, set_type_meta, strip_server_metadata, type_meta,
};
use trellis_common::{Error, Result};

/// Generates a concrete object from a template
#[cfg_attr(test, automock)]
pub trait TemplateGenerator: Send + Sync {
    /// Generate an object from `template`
    ///
    /// # Arguments
    ///
    /// * `template` - The template to generate from
    /// * `template_ref` - Reference the template was resolved from, recorded as provenance
    /// * `namespace` - Namespace of the generated object
    /// * `labels` - Labels to add to the generated object
    /// * `cluster_name` - Name of the cluster the object belongs to
    ///
    /// The returned object has no name; callers assign one.
    fn generate(
        &self,
        template: &DynamicObject,
        template_ref: &ObjectReference,
        namespace: &str,
        labels: &BTreeMap<String, String>,
        cluster_name: &str,
    ) -> Result<DynamicObject>;
}

/// Default generator: the object body is the template's `spec.template`
#[derive(Clone, Copy, Debug, Default)]
pub struct SpecTemplateGenerator;

impl TemplateGenerator for SpecTemplateGenerator {
    fn generate(
        &self,
        template: &DynamicObject,
        template_ref: &ObjectReference,
        namespace: &str,
        labels: &BTreeMap<String, String>,
        cluster_name: &str,
    ) -> Result<DynamicObject> {
        let (api_version, kind) = type_meta(template);
        let template_name = template.metadata.name.as_deref().unwrap_or_default();

        let mut body = template
            .data
            .get("spec")
            .and_then(|spec| spec.get("template"))
            .ok_or_else(|| {
                Error::generation(
                    kind,
                    format!("missing spec.template on {kind} {template_name:?}"),
                )
            })?
            .as_object()
            .cloned()
            .ok_or_else(|| {
                Error::generation(
                    kind,
                    format!("spec.template on {kind} {template_name:?} is not an object"),
                )
            })?;

        let mut metadata = match body.remove("metadata") {
            Some(raw) => serde_json::from_value::<ObjectMeta>(raw).map_err(|e| {
                Error::generation(kind, format!("invalid spec.template.metadata: {e}"))
            })?,
            None => ObjectMeta::default(),
        };
        body.remove("apiVersion");
        body.remove("kind");

        strip_server_metadata(&mut metadata);
        metadata.name = None;
        metadata.generate_name = None;
        metadata.namespace = Some(namespace.to_string());

        let object_labels = metadata.labels.get_or_insert_with(BTreeMap::new);
        object_labels.extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        object_labels.insert(CLUSTER_NAME_LABEL.to_string(), cluster_name.to_string());

        let annotations = metadata.annotations.get_or_insert_with(BTreeMap::new);
        annotations.insert(
            TEMPLATE_CLONED_FROM_NAME_ANNOTATION.to_string(),
            template_ref.name.clone().unwrap_or_default(),
        );
        annotations.insert(
            TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION.to_string(),
            reference_group_kind(template_ref),
        );

        let mut object = DynamicObject {
            types: None,
            metadata,
            data: serde_json::Value::Object(body),
        };
        set_type_meta(
            &mut object,
            api_version,
            kind.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(kind),
        );
        Ok(object)
    }
}
