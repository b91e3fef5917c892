//! Desired MachineDeployment and its per-cluster templates

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::DynamicObject;

use trellis_common::capi::{MachineDeployment, MachineDeploymentTopology};
use trellis_common::constants::{enforce_topology_labels, TOPOLOGY_MACHINE_DEPLOYMENT_LABEL};
use trellis_common::kube_utils::object_to_reference;
use trellis_common::{Error, Result};

use crate::metadata::merge_metadata;
use crate::scope::{DesiredMachineDeployment, Scope};
use crate::template::{Cloner, TemplateToInput};

/// Name prefix for a worker group's bootstrap template
pub fn bootstrap_template_name_prefix(cluster_name: &str, instance: &str) -> String {
    format!("{cluster_name}-{instance}-bootstrap-")
}

/// Name prefix for a worker group's infrastructure machine template
pub fn infrastructure_machine_template_name_prefix(cluster_name: &str, instance: &str) -> String {
    format!("{cluster_name}-{instance}-infra-")
}

/// Compute the objects of one topology worker group
pub(crate) fn compute_machine_deployment(
    scope: &Scope,
    cloner: &Cloner<'_>,
    topology: &MachineDeploymentTopology,
) -> Result<DesiredMachineDeployment> {
    let blueprint = scope
        .blueprint
        .machine_deployments
        .get(&topology.class)
        .ok_or_else(|| {
            Error::class_not_found(&topology.class, scope.blueprint.cluster_class.name())
        })?;
    let cluster = &scope.current.cluster;
    let current = scope.current.machine_deployments.get(&topology.name);

    // Only reuse a template name when the template it names could be resolved.
    let current_bootstrap_ref = current
        .filter(|c| c.bootstrap_template.is_some())
        .and_then(|c| c.object.bootstrap_config_ref());
    let current_infrastructure_ref = current
        .filter(|c| c.infrastructure_machine_template.is_some())
        .map(|c| c.object.infrastructure_ref());

    let mut bootstrap_template = clone_template(
        cloner,
        scope,
        &blueprint.bootstrap_template,
        bootstrap_template_name_prefix(cluster.name(), &topology.name),
        current_bootstrap_ref,
    );
    label_with_instance(&mut bootstrap_template, &topology.name);

    let mut infrastructure_machine_template = clone_template(
        cloner,
        scope,
        &blueprint.infrastructure_machine_template,
        infrastructure_machine_template_name_prefix(cluster.name(), &topology.name),
        current_infrastructure_ref,
    );
    label_with_instance(&mut infrastructure_machine_template, &topology.name);

    let name = cloner.name_or_generate(
        current.map(|c| c.object.name()),
        &format!("{}-{}-", cluster.name(), topology.name),
    );

    let mut identity = BTreeMap::new();
    enforce_topology_labels(&mut identity, cluster.name());
    identity.insert(
        TOPOLOGY_MACHINE_DEPLOYMENT_LABEL.to_string(),
        topology.name.clone(),
    );

    let mut machine_deployment = MachineDeployment::new(name, cluster.namespace());
    machine_deployment.metadata.labels = Some(identity.clone());

    let spec = &mut machine_deployment.spec;
    spec.cluster_name = cluster.name().to_string();
    spec.replicas = topology.replicas;

    // Identity labels on the machine template reach MachineSets and Machines.
    spec.template.metadata = merge_metadata(&topology.metadata, &blueprint.metadata);
    spec.template.metadata.labels.extend(identity);

    let machine = &mut spec.template.spec;
    machine.cluster_name = cluster.name().to_string();
    machine.version = Some(scope.blueprint.topology.version.clone());
    machine.bootstrap.config_ref = Some(object_to_reference(&bootstrap_template));
    machine.infrastructure_ref = object_to_reference(&infrastructure_machine_template);

    Ok(DesiredMachineDeployment {
        bootstrap_template,
        infrastructure_machine_template,
        object: machine_deployment,
    })
}

fn clone_template(
    cloner: &Cloner<'_>,
    scope: &Scope,
    template: &DynamicObject,
    name_prefix: String,
    current_object_ref: Option<&ObjectReference>,
) -> DynamicObject {
    let cloned_from = object_to_reference(template);
    cloner.template_to_template(&TemplateToInput {
        template,
        template_cloned_from_ref: &cloned_from,
        cluster: &scope.current.cluster,
        name_prefix,
        current_object_ref,
    })
}

fn label_with_instance(template: &mut DynamicObject, instance: &str) {
    template
        .metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(
            TOPOLOGY_MACHINE_DEPLOYMENT_LABEL.to_string(),
            instance.to_string(),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::fixtures;
    use crate::generate::SpecTemplateGenerator;
    use crate::names::MockNameGenerator;
    use crate::scope::MachineDeploymentState;
    use trellis_common::capi::Metadata;
    use trellis_common::constants::{
        CLUSTER_NAME_LABEL, TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION,
        TEMPLATE_CLONED_FROM_NAME_ANNOTATION, TOPOLOGY_OWNED_LABEL,
    };

    fn pool(class: &str, name: &str, replicas: Option<i32>) -> MachineDeploymentTopology {
        MachineDeploymentTopology {
            metadata: Metadata {
                labels: [("tier".to_string(), "topology".to_string())].into(),
                annotations: Default::default(),
            },
            class: class.to_string(),
            name: name.to_string(),
            replicas,
        }
    }

    fn current_state(bootstrap: bool, infrastructure: bool) -> MachineDeploymentState {
        let mut object = MachineDeployment::new("prod-pool1-keep", "fleet");
        object.spec.template.spec.bootstrap.config_ref = Some(ObjectReference {
            name: Some("prod-pool1-bootstrap-keep".to_string()),
            ..Default::default()
        });
        object.spec.template.spec.infrastructure_ref = ObjectReference {
            name: Some("prod-pool1-infra-keep".to_string()),
            ..Default::default()
        };
        MachineDeploymentState {
            object,
            bootstrap_template: bootstrap.then(fixtures::bootstrap_template),
            infrastructure_machine_template: infrastructure.then(fixtures::worker_machine_template),
        }
    }

    #[test]
    fn new_worker_group_gets_templates_and_deployment() {
        let scope = fixtures::scope();
        let names = fixtures::prefixed_names();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let topology = pool("default-worker", "pool1", Some(3));
        let desired = compute_machine_deployment(&scope, &cloner, &topology).expect("compute");

        assert_eq!(
            desired.bootstrap_template.metadata.name.as_deref(),
            Some("prod-pool1-bootstrap-gen")
        );
        assert_eq!(
            desired.infrastructure_machine_template.metadata.name.as_deref(),
            Some("prod-pool1-infra-gen")
        );

        let md = &desired.object;
        assert_eq!(md.name(), "prod-pool1-gen");
        assert_eq!(md.metadata.namespace.as_deref(), Some("fleet"));
        assert_eq!(md.spec.cluster_name, "prod");
        assert_eq!(md.spec.replicas, Some(3));
        assert_eq!(md.spec.template.spec.cluster_name, "prod");
        assert_eq!(md.spec.template.spec.version.as_deref(), Some("v1.21.2"));
        assert_eq!(
            md.bootstrap_config_ref().and_then(|r| r.name.as_deref()),
            Some("prod-pool1-bootstrap-gen")
        );
        assert_eq!(
            md.infrastructure_ref().kind.as_deref(),
            Some("DockerMachineTemplate")
        );
        assert_eq!(
            md.infrastructure_ref().name.as_deref(),
            Some("prod-pool1-infra-gen")
        );
    }

    #[test]
    fn identity_labels_reach_every_object() {
        let scope = fixtures::scope();
        let names = fixtures::prefixed_names();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let topology = pool("default-worker", "pool1", None);
        let desired = compute_machine_deployment(&scope, &cloner, &topology).expect("compute");

        let object_labels = desired.object.metadata.labels.as_ref().expect("labels");
        assert_eq!(object_labels.len(), 3);
        assert_eq!(object_labels[CLUSTER_NAME_LABEL], "prod");
        assert_eq!(object_labels[TOPOLOGY_OWNED_LABEL], "");
        assert_eq!(object_labels[TOPOLOGY_MACHINE_DEPLOYMENT_LABEL], "pool1");

        let machine_labels = &desired.object.spec.template.metadata.labels;
        assert_eq!(machine_labels["tier"], "topology");
        assert_eq!(machine_labels["class-only"], "yes");
        assert_eq!(machine_labels[TOPOLOGY_MACHINE_DEPLOYMENT_LABEL], "pool1");
        assert_eq!(machine_labels[CLUSTER_NAME_LABEL], "prod");

        for template in [&desired.bootstrap_template, &desired.infrastructure_machine_template] {
            let labels = template.metadata.labels.as_ref().expect("labels");
            assert_eq!(labels[CLUSTER_NAME_LABEL], "prod");
            assert_eq!(labels[TOPOLOGY_MACHINE_DEPLOYMENT_LABEL], "pool1");
        }
        assert_eq!(desired.object.spec.replicas, None);
    }

    #[test]
    fn templates_record_where_they_were_cloned_from() {
        let scope = fixtures::scope();
        let names = fixtures::prefixed_names();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let topology = pool("default-worker", "pool1", None);
        let desired = compute_machine_deployment(&scope, &cloner, &topology).expect("compute");

        let annotations = desired
            .infrastructure_machine_template
            .metadata
            .annotations
            .as_ref()
            .expect("annotations");
        assert_eq!(annotations[TEMPLATE_CLONED_FROM_NAME_ANNOTATION], "worker-machine-template");
        assert_eq!(
            annotations[TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION],
            "DockerMachineTemplate.infrastructure.cluster.x-k8s.io"
        );
    }

    #[test]
    fn existing_worker_group_keeps_all_names() {
        let mut scope = fixtures::scope();
        scope
            .current
            .machine_deployments
            .insert("pool1".to_string(), current_state(true, true));
        let mut names = MockNameGenerator::new();
        names.expect_generate_name().never();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let topology = pool("default-worker", "pool1", Some(1));
        let desired = compute_machine_deployment(&scope, &cloner, &topology).expect("compute");

        assert_eq!(desired.object.name(), "prod-pool1-keep");
        assert_eq!(
            desired.bootstrap_template.metadata.name.as_deref(),
            Some("prod-pool1-bootstrap-keep")
        );
        assert_eq!(
            desired.infrastructure_machine_template.metadata.name.as_deref(),
            Some("prod-pool1-infra-keep")
        );
    }

    #[test]
    fn unresolved_current_template_gets_a_fresh_name() {
        let mut scope = fixtures::scope();
        scope
            .current
            .machine_deployments
            .insert("pool1".to_string(), current_state(false, true));
        let names = fixtures::prefixed_names();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let topology = pool("default-worker", "pool1", None);
        let desired = compute_machine_deployment(&scope, &cloner, &topology).expect("compute");

        assert_eq!(
            desired.bootstrap_template.metadata.name.as_deref(),
            Some("prod-pool1-bootstrap-gen")
        );
        assert_eq!(
            desired.infrastructure_machine_template.metadata.name.as_deref(),
            Some("prod-pool1-infra-keep")
        );
        assert_eq!(desired.object.name(), "prod-pool1-keep");
    }

    #[test]
    fn unknown_class_is_rejected() {
        let scope = fixtures::scope();
        let names = fixtures::prefixed_names();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let err = compute_machine_deployment(&scope, &cloner, &pool("gpu", "pool1", None))
            .expect_err("must fail");

        assert_eq!(
            err.to_string(),
            "MachineDeployment blueprint gpu not found in ClusterClass quick-start"
        );
    }

    #[test]
    fn zero_replicas_are_kept() {
        let scope = fixtures::scope();
        let names = fixtures::prefixed_names();
        let cloner = Cloner::new(&SpecTemplateGenerator, &names);

        let topology = pool("default-worker", "pool1", Some(0));
        let desired = compute_machine_deployment(&scope, &cloner, &topology).expect("compute");

        assert_eq!(desired.object.spec.replicas, Some(0));
    }
}
