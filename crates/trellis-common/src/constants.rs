//! Label and annotation keys stamped on topology-managed objects
//!
//! These form a closed set: every object the compiler emits carries
//! [`CLUSTER_NAME_LABEL`] and [`TOPOLOGY_OWNED_LABEL`], worker-group objects
//! additionally carry [`TOPOLOGY_MACHINE_DEPLOYMENT_LABEL`], and every object
//! cloned from a template carries the two cloned-from annotations.

use std::collections::BTreeMap;

/// Label identifying the cluster an object belongs to
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

/// Label marking an object as managed by the topology controller (empty value)
pub const TOPOLOGY_OWNED_LABEL: &str = "topology.cluster.x-k8s.io/owned";

/// Label carrying the worker-group instance name from the topology
pub const TOPOLOGY_MACHINE_DEPLOYMENT_LABEL: &str = "topology.cluster.x-k8s.io/deployment-name";

/// Annotation recording the name of the template an object was cloned from
pub const TEMPLATE_CLONED_FROM_NAME_ANNOTATION: &str = "topology.cluster.x-k8s.io/cloned-from-name";

/// Annotation recording the group-kind of the template an object was cloned from
pub const TEMPLATE_CLONED_FROM_GROUP_KIND_ANNOTATION: &str =
    "topology.cluster.x-k8s.io/cloned-from-groupkind";

/// Suffix shared by all template kinds (e.g. `DockerMachineTemplate`)
pub const TEMPLATE_SUFFIX: &str = "Template";

/// Cluster API core apiVersion used for objects built directly by the compiler
pub const CLUSTER_API_VERSION: &str = "cluster.x-k8s.io/v1alpha4";

/// Insert the cluster-identity and topology-ownership labels
///
/// Existing keys other than these two are left untouched.
pub fn enforce_topology_labels(labels: &mut BTreeMap<String, String>, cluster_name: &str) {
    labels.insert(CLUSTER_NAME_LABEL.to_string(), cluster_name.to_string());
    labels.insert(TOPOLOGY_OWNED_LABEL.to_string(), String::new());
}

/// Fresh label set carrying only the cluster-identity and ownership labels
pub fn topology_labels(cluster_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    enforce_topology_labels(&mut labels, cluster_name);
    labels
}
