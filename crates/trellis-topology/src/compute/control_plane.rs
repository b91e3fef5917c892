//! Desired ControlPlane and its InfrastructureMachineTemplate

use kube::core::DynamicObject;

use trellis_common::capi::Metadata;
use trellis_common::constants::enforce_topology_labels;
use trellis_common::kube_utils::kind_of;
use trellis_common::{Error, Result};

use super::cloned_from_ref;
use crate::contract;
use crate::metadata::merge_metadata;
use crate::scope::Scope;
use crate::template::{Cloner, TemplateToInput};

/// Name prefix for the control plane's infrastructure machine template
pub fn control_plane_infrastructure_machine_template_name_prefix(cluster_name: &str) -> String {
    format!("{cluster_name}-controlplane-")
}

/// Compute the InfrastructureMachineTemplate referenced by the control plane
///
/// Fails when the blueprint carries no such template. It is cloned as a
/// template because the control plane, not the compiler, creates machines
/// from it.
pub(crate) fn compute_control_plane_infrastructure_machine_template(
    scope: &Scope,
    cloner: &Cloner<'_>,
) -> Result<DynamicObject> {
    let Some(template) = scope.blueprint.control_plane.infrastructure_machine_template.as_ref()
    else {
        return Err(Error::contract(
            "controlPlane.infrastructureMachineTemplate",
            "blueprint has no control plane infrastructure machine template",
        ));
    };
    let cluster = &scope.current.cluster;
    let cloned_from = cloned_from_ref(
        scope
            .blueprint
            .cluster_class
            .spec
            .control_plane
            .machine_infrastructure
            .as_ref()
            .and_then(|mi| mi.reference.as_ref()),
        template,
    );

    let current_ref = scope
        .current
        .control_plane_object()
        .map(|cp| {
            contract::control_plane()
                .machine_template()
                .infrastructure_ref()
                .get(cp)
                .map_err(|e| {
                    e.wrap(
                        "failed to get spec.machineTemplate.infrastructureRef \
                         for the current ControlPlane object",
                    )
                })
        })
        .transpose()?;

    Ok(cloner.template_to_template(&TemplateToInput {
        template,
        template_cloned_from_ref: &cloned_from,
        cluster,
        name_prefix: control_plane_infrastructure_machine_template_name_prefix(cluster.name()),
        current_object_ref: current_ref.as_ref(),
    }))
}

/// Compute the ControlPlane from the class control plane template
///
/// When `infrastructure_machine_template` is given, the control plane is
/// pointed at it and its machine metadata is set so the cluster labels reach
/// the machines it creates.
pub(crate) fn compute_control_plane(
    scope: &Scope,
    cloner: &Cloner<'_>,
    infrastructure_machine_template: Option<&DynamicObject>,
) -> Result<DynamicObject> {
    let template = &scope.blueprint.control_plane.template;
    let class = &scope.blueprint.cluster_class;
    let topology = &scope.blueprint.topology;
    let cluster = &scope.current.cluster;
    let cloned_from = cloned_from_ref(class.spec.control_plane.reference.as_ref(), template);

    let mut control_plane = cloner
        .template_to_object(&TemplateToInput {
            template,
            template_cloned_from_ref: &cloned_from,
            cluster,
            name_prefix: format!("{}-", cluster.name()),
            current_object_ref: cluster.spec.control_plane_ref.as_ref(),
        })
        .map_err(|e| {
            e.wrap(format!(
                "failed to generate the ControlPlane object from the {}",
                kind_of(template)
            ))
        })?;

    if let Some(machine_template) = infrastructure_machine_template {
        contract::control_plane()
            .machine_template()
            .infrastructure_ref()
            .set(&mut control_plane, machine_template)
            .map_err(|e| {
                e.wrap(
                    "failed to set spec.machineTemplate.infrastructureRef \
                     in the ControlPlane object",
                )
            })?;

        let mut machine_metadata: Metadata =
            merge_metadata(&topology.control_plane.metadata, &class.spec.control_plane.metadata);
        enforce_topology_labels(&mut machine_metadata.labels, cluster.name());
        contract::control_plane()
            .machine_template()
            .metadata()
            .set(&mut control_plane, &machine_metadata)
            .map_err(|e| {
                e.wrap("failed to set spec.machineTemplate.metadata in the ControlPlane object")
            })?;
    }

    // Unset replicas means the provider does not support them; leave the field alone.
    if let Some(replicas) = topology.control_plane.replicas {
        contract::control_plane()
            .replicas()
            .set(&mut control_plane, i64::from(replicas))
            .map_err(|e| e.wrap("failed to set spec.replicas in the ControlPlane object"))?;
    }

    contract::control_plane()
        .version()
        .set(&mut control_plane, &topology.version)
        .map_err(|e| e.wrap("failed to set spec.version in the ControlPlane object"))?;

    Ok(control_plane)
}
