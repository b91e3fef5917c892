//! Cloning class templates into cluster-scoped objects and templates
//!
//! ClusterClass templates are shared by every cluster of the class, so the
//! compiler never uses them directly. Each one is either:
//! - generated into a standalone object (e.g. `DockerClusterTemplate` ->
//!   `DockerCluster`) via [`Cloner::template_to_object`], or
//! - copied into a per-cluster template (e.g. a `DockerMachineTemplate`
//!   referenced by a MachineDeployment) via [`Cloner::template_to_template`].
//!
//! Both keep the name of the object the current state already references,
//! so the persistence layer sees an update instead of a replacement.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::DynamicObject;
use tracing::trace;

use trellis_common::capi::Cluster;
use trellis_common::constants::{
    enforce_topology_labels, topology_labels, TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION,
    TEMPLATE_CLONED_FROM_NAME_ANNOTATION,
};
use trellis_common::kube_utils::{
    kind_of, reference_group_kind, reference_name, strip_server_metadata,
};
use trellis_common::{Error, Result};

use crate::generate::TemplateGenerator;
use crate::names::NameGenerator;

/// Inputs for cloning one template
#[derive(Clone, Debug)]
pub struct TemplateToInput<'a> {
    /// The class template to clone
    pub template: &'a DynamicObject,
    /// Reference the template was resolved from, recorded as provenance
    pub template_cloned_from_ref: &'a ObjectReference,
    /// Cluster the clone belongs to
    pub cluster: &'a Cluster,
    /// Prefix for a freshly generated name
    pub name_prefix: String,
    /// Reference to the object of this role in the current state, if any
    pub current_object_ref: Option<&'a ObjectReference>,
}

/// Clones templates using the pass's generation and naming collaborators
#[derive(Clone, Copy)]
pub struct Cloner<'a> {
    generator: &'a dyn TemplateGenerator,
    names: &'a dyn NameGenerator,
}

impl<'a> Cloner<'a> {
    /// Create a cloner backed by the given collaborators
    pub fn new(generator: &'a dyn TemplateGenerator, names: &'a dyn NameGenerator) -> Self {
        Self { generator, names }
    }

    /// Generate a standalone object from a template
    ///
    /// Adds the cluster and topology-owned labels, then reuses the current
    /// object's name or generates a new one from the prefix.
    pub fn template_to_object(&self, input: &TemplateToInput<'_>) -> Result<DynamicObject> {
        let kind = kind_of(input.template);
        let labels = topology_labels(input.cluster.name());

        let mut object = self
            .generator
            .generate(
                input.template,
                input.template_cloned_from_ref,
                input.cluster.namespace(),
                &labels,
                input.cluster.name(),
            )
            .map_err(|e| match e {
                Error::Generation { .. } => e,
                other => other.wrap(format!("failed to generate object from template {kind}")),
            })?;

        // Generators may carry template labels over; ours must win.
        enforce_topology_labels(
            object.metadata.labels.get_or_insert_with(BTreeMap::new),
            input.cluster.name(),
        );
        object.metadata.name = Some(self.resolve_name(input));

        trace!(
            kind = %kind_of(&object),
            name = ?object.metadata.name,
            "generated object from template"
        );
        Ok(object)
    }

    /// Copy a template for exclusive use by one cluster
    ///
    /// Strips server-assigned metadata, adds the cluster and topology-owned
    /// labels and the cloned-from annotations, then reuses the current
    /// template's name or generates a new one from the prefix.
    pub fn template_to_template(&self, input: &TemplateToInput<'_>) -> DynamicObject {
        let mut template = input.template.clone();
        strip_server_metadata(&mut template.metadata);

        enforce_topology_labels(
            template.metadata.labels.get_or_insert_with(BTreeMap::new),
            input.cluster.name(),
        );

        let annotations = template.metadata.annotations.get_or_insert_with(BTreeMap::new);
        annotations.insert(
            TEMPLATE_CLONED_FROM_NAME_ANNOTATION.to_string(),
            input
                .template_cloned_from_ref
                .name
                .clone()
                .unwrap_or_default(),
        );
        annotations.insert(
            TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION.to_string(),
            reference_group_kind(input.template_cloned_from_ref),
        );

        template.metadata.name = Some(self.resolve_name(input));

        trace!(kind = %kind_of(&template), name = ?template.metadata.name, "cloned template");
        template
    }

    /// Generate a fresh name from `prefix`
    pub fn generate_name(&self, prefix: &str) -> String {
        self.names.generate_name(prefix)
    }

    /// Reuse the current name when there is one, otherwise generate one
    pub fn name_or_generate(&self, current: Option<&str>, prefix: &str) -> String {
        match current.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.generate_name(prefix),
        }
    }

    fn resolve_name(&self, input: &TemplateToInput<'_>) -> String {
        self.name_or_generate(reference_name(input.current_object_ref), &input.name_prefix)
    }
}
