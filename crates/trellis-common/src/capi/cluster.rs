//! Cluster API `Cluster` object and its managed topology

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::{ObjectMeta, TypeMeta};
use serde::{Deserialize, Serialize};

use crate::constants::CLUSTER_API_VERSION;

/// Labels and annotations only
///
/// Used wherever a topology or class contributes metadata to objects it
/// does not fully own (machine templates, worker groups).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Metadata {
    /// Labels to apply
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations to apply
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Metadata {
    /// True when neither labels nor annotations are set
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.annotations.is_empty()
    }
}

/// A Cluster API `Cluster`
///
/// Only the fields the topology compiler reads or writes are typed; the rest
/// of the spec round-trips through [`ClusterSpec::other`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Cluster {
    /// apiVersion and kind
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// Cluster spec
    #[serde(default)]
    pub spec: ClusterSpec,
}

impl Cluster {
    /// Create a cluster with the given name and namespace
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: CLUSTER_API_VERSION.to_string(),
                kind: "Cluster".to_string(),
            }),
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            spec: ClusterSpec::default(),
        }
    }

    /// Set the managed topology
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.spec.topology = Some(topology);
        self
    }

    /// Cluster name, empty when unset
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Cluster namespace, empty when unset
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }
}

/// Spec of a Cluster API `Cluster`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Reference to the provider-specific infrastructure cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_ref: Option<ObjectReference>,
    /// Reference to the control plane object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_ref: Option<ObjectReference>,
    /// Managed topology, present for ClusterClass-based clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<Topology>,
    /// Fields the compiler does not interpret (clusterNetwork, paused, ...)
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Instance-specific intent for a ClusterClass-based cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    /// Name of the ClusterClass this cluster is built from
    pub class: String,
    /// Kubernetes version applied to the control plane and all worker groups
    pub version: String,
    /// Control plane intent
    #[serde(default)]
    pub control_plane: ControlPlaneTopology,
    /// Worker groups; `None` when the topology declares no workers section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<WorkersTopology>,
}

/// Control plane intent
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneTopology {
    /// Metadata propagated to control plane machines
    #[serde(default)]
    pub metadata: Metadata,
    /// Desired replicas. `None` means the control plane provider does not
    /// support externally managed replicas; it is distinct from `Some(0)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

/// Worker groups of a topology
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkersTopology {
    /// Worker groups in declaration order
    #[serde(default)]
    pub machine_deployments: Vec<MachineDeploymentTopology>,
}

/// One worker group instance
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentTopology {
    /// Metadata propagated to the group's machines
    #[serde(default)]
    pub metadata: Metadata,
    /// Worker class in the ClusterClass this group is built from
    pub class: String,
    /// Instance name, unique within the topology
    pub name: String,
    /// Desired replicas; `None` leaves scaling to an external actor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}
