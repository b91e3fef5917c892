//! Desired Cluster

use std::collections::BTreeMap;

use kube::core::DynamicObject;

use trellis_common::capi::Cluster;
use trellis_common::constants::enforce_topology_labels;
use trellis_common::kube_utils::object_to_reference;

use crate::scope::Scope;

/// Compute the cluster object pointing at the computed infrastructure
/// cluster and control plane
///
/// Starts from a deep copy of the current cluster so fields the compiler
/// does not manage are preserved.
pub(crate) fn compute_cluster(
    scope: &Scope,
    infrastructure_cluster: &DynamicObject,
    control_plane: &DynamicObject,
) -> Cluster {
    let mut cluster = scope.current.cluster.clone();
    let name = cluster.name().to_string();

    enforce_topology_labels(cluster.metadata.labels.get_or_insert_with(BTreeMap::new), &name);

    cluster.spec.infrastructure_ref = Some(object_to_reference(infrastructure_cluster));
    cluster.spec.control_plane_ref = Some(object_to_reference(control_plane));
    cluster
}
