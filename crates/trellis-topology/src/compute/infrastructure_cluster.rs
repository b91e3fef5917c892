//! Desired InfrastructureCluster

use kube::core::DynamicObject;

use trellis_common::kube_utils::kind_of;
use trellis_common::Result;

use super::cloned_from_ref;
use crate::scope::Scope;
use crate::template::{Cloner, TemplateToInput};

/// Compute the InfrastructureCluster from the class infrastructure template
pub(crate) fn compute_infrastructure_cluster(
    scope: &Scope,
    cloner: &Cloner<'_>,
) -> Result<DynamicObject> {
    let template = &scope.blueprint.infrastructure_cluster_template;
    let cloned_from = cloned_from_ref(
        scope
            .blueprint
            .cluster_class
            .spec
            .infrastructure
            .reference
            .as_ref(),
        template,
    );
    let cluster = &scope.current.cluster;

    cloner
        .template_to_object(&TemplateToInput {
            template,
            template_cloned_from_ref: &cloned_from,
            cluster,
            name_prefix: format!("{}-", cluster.name()),
            current_object_ref: cluster.spec.infrastructure_ref.as_ref(),
        })
        .map_err(|e| {
            e.wrap(format!(
                "failed to generate the InfrastructureCluster object from the {}",
                kind_of(template)
            ))
        })
}
