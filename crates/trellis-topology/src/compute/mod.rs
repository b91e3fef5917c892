//! Desired state compiler
//!
//! Turns a [`Scope`] into the [`DesiredState`] of a managed cluster by
//! running one computer per object role, in dependency order:
//!
//! 1. InfrastructureCluster, from the class infrastructure template
//! 2. Control plane InfrastructureMachineTemplate, when the class has one
//! 3. ControlPlane, referencing the template from step 2
//! 4. Cluster, referencing the objects from steps 1 and 3
//! 5. One MachineDeployment (plus bootstrap and infrastructure machine
//!    templates) per topology worker group
//!
//! # Usage
//!
//! ```text
//! let compiler = DesiredStateCompiler::default();
//! let desired = compiler.compute_desired_state(&scope)?;
//! // desired.cluster, desired.infrastructure_cluster, desired.control_plane, ...
//! ```
//!
//! Any failure aborts the whole pass; there is no partial result.

mod cluster;
mod control_plane;
mod infrastructure_cluster;
mod machine_deployment;

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::DynamicObject;
use tracing::{debug, info, instrument, warn};

use trellis_common::kube_utils::object_to_reference;
use trellis_common::Result;

use crate::generate::{SpecTemplateGenerator, TemplateGenerator};
use crate::names::{NameGenerator, SimpleNameGenerator};
use crate::scope::{DesiredControlPlane, DesiredMachineDeployment, DesiredState, Scope};
use crate::template::Cloner;

pub use control_plane::control_plane_infrastructure_machine_template_name_prefix;
pub use machine_deployment::{
    bootstrap_template_name_prefix, infrastructure_machine_template_name_prefix,
};

/// Computes the desired state of managed clusters
///
/// Holds the template generation and naming collaborators; each call to
/// [`compute_desired_state`](Self::compute_desired_state) is independent.
pub struct DesiredStateCompiler {
    generator: Box<dyn TemplateGenerator>,
    names: Box<dyn NameGenerator>,
}

impl DesiredStateCompiler {
    /// Create a compiler with the given collaborators
    ///
    /// # Arguments
    /// * `generator` - Turns class templates into standalone objects
    /// * `names` - Produces names for objects that do not exist yet
    pub fn new(
        generator: impl TemplateGenerator + 'static,
        names: impl NameGenerator + 'static,
    ) -> Self {
        Self {
            generator: Box::new(generator),
            names: Box::new(names),
        }
    }

    /// Compute the desired state for the cluster in `scope`
    ///
    /// Reads `scope` only. Objects that already exist keep their names, so
    /// repeated passes over an unchanged scope produce the same result.
    #[instrument(skip_all, fields(cluster = %scope.current.cluster.name()))]
    pub fn compute_desired_state(&self, scope: &Scope) -> Result<DesiredState> {
        let cloner = Cloner::new(self.generator.as_ref(), self.names.as_ref());

        match compute(scope, &cloner) {
            Ok(desired) => {
                info!(
                    resources = desired.resource_count(),
                    machine_deployments = desired.machine_deployments.len(),
                    "computed desired state"
                );
                Ok(desired)
            }
            Err(e) => {
                warn!(error = %e, "failed to compute desired state");
                Err(e)
            }
        }
    }
}

impl Default for DesiredStateCompiler {
    fn default() -> Self {
        Self::new(SpecTemplateGenerator, SimpleNameGenerator)
    }
}

fn compute(scope: &Scope, cloner: &Cloner<'_>) -> Result<DesiredState> {
    let infrastructure_cluster =
        infrastructure_cluster::compute_infrastructure_cluster(scope, cloner)?;
    debug!(name = ?infrastructure_cluster.metadata.name, "computed infrastructure cluster");

    let infrastructure_machine_template =
        if scope.blueprint.has_control_plane_infrastructure_machine() {
            Some(control_plane::compute_control_plane_infrastructure_machine_template(
                scope, cloner,
            )?)
        } else {
            None
        };

    let control_plane = control_plane::compute_control_plane(
        scope,
        cloner,
        infrastructure_machine_template.as_ref(),
    )?;
    debug!(
        name = ?control_plane.metadata.name,
        machine_template = ?infrastructure_machine_template
            .as_ref()
            .and_then(|t| t.metadata.name.as_deref()),
        "computed control plane"
    );

    let cluster = cluster::compute_cluster(scope, &infrastructure_cluster, &control_plane);

    let machine_deployments = if scope.blueprint.has_machine_deployments() {
        scope
            .blueprint
            .topology
            .workers
            .iter()
            .flat_map(|workers| &workers.machine_deployments)
            .map(|topology| {
                debug!(
                    name = %topology.name,
                    class = %topology.class,
                    "computing machine deployment"
                );
                machine_deployment::compute_machine_deployment(scope, cloner, topology)
                    .map(|desired| (topology.name.clone(), desired))
            })
            .collect::<Result<BTreeMap<String, DesiredMachineDeployment>>>()?
    } else {
        BTreeMap::new()
    };

    Ok(DesiredState {
        cluster,
        infrastructure_cluster,
        control_plane: DesiredControlPlane {
            object: control_plane,
            infrastructure_machine_template,
        },
        machine_deployments,
    })
}

/// Provenance reference for a cloned template
///
/// Uses the class reference the template was resolved from, falling back to a
/// reference built from the template itself.
fn cloned_from_ref(
    class_ref: Option<&ObjectReference>,
    template: &DynamicObject,
) -> ObjectReference {
    class_ref
        .cloned()
        .unwrap_or_else(|| object_to_reference(template))
}

// =============================================================================
// Test fixtures
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
