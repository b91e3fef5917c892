//! Inputs and output of one desired-state computation
//!
//! A [`Scope`] pairs the [`ClusterBlueprint`] (what the ClusterClass and the
//! cluster's topology ask for) with the [`CurrentState`] (what exists today).
//! Both are read-only snapshots supplied by the caller for a single pass; the
//! compiler returns a freshly built [`DesiredState`].

use std::collections::BTreeMap;

use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};

use trellis_common::capi::{Cluster, ClusterClass, MachineDeployment, Metadata, Topology};

/// Everything needed to compute the desired state of one cluster
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Class templates and topology intent
    pub blueprint: ClusterBlueprint,
    /// Observed objects of this cluster
    pub current: CurrentState,
}

impl Scope {
    /// Create a scope from a blueprint and the current state
    pub fn new(blueprint: ClusterBlueprint, current: CurrentState) -> Self {
        Self { blueprint, current }
    }
}

/// The resolved ClusterClass templates plus the cluster's topology
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBlueprint {
    /// Instance-specific intent
    pub topology: Topology,
    /// The ClusterClass the templates were resolved from
    pub cluster_class: ClusterClass,
    /// Template for the infrastructure cluster
    pub infrastructure_cluster_template: DynamicObject,
    /// Control plane templates
    pub control_plane: ControlPlaneBlueprint,
    /// Worker class name -> templates
    #[serde(default)]
    pub machine_deployments: BTreeMap<String, MachineDeploymentBlueprint>,
}

impl ClusterBlueprint {
    /// True when control plane machines need an infrastructure machine template
    pub fn has_control_plane_infrastructure_machine(&self) -> bool {
        self.control_plane.infrastructure_machine_template.is_some()
    }

    /// True when the topology declares a workers section
    pub fn has_machine_deployments(&self) -> bool {
        self.topology.workers.is_some()
    }
}

/// Control plane templates of a blueprint
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneBlueprint {
    /// Control plane template
    pub template: DynamicObject,
    /// Infrastructure machine template, present only when the class declares
    /// `spec.controlPlane.machineInfrastructure`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_machine_template: Option<DynamicObject>,
}

/// Templates of one worker class
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentBlueprint {
    /// Class-level default metadata for machines
    #[serde(default)]
    pub metadata: Metadata,
    /// Bootstrap config template
    pub bootstrap_template: DynamicObject,
    /// Infrastructure machine template
    pub infrastructure_machine_template: DynamicObject,
}

/// Objects that exist today for a cluster
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentState {
    /// The cluster object
    pub cluster: Cluster,
    /// Current infrastructure cluster, if created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_cluster: Option<DynamicObject>,
    /// Current control plane, if created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlaneState>,
    /// Topology instance name -> current worker group
    #[serde(default)]
    pub machine_deployments: BTreeMap<String, MachineDeploymentState>,
}

impl CurrentState {
    /// Current state of a cluster nothing has been created for yet
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            infrastructure_cluster: None,
            control_plane: None,
            machine_deployments: BTreeMap::new(),
        }
    }

    /// The current control plane object, if any
    pub fn control_plane_object(&self) -> Option<&DynamicObject> {
        self.control_plane.as_ref().and_then(|cp| cp.object.as_ref())
    }
}

/// Current control plane objects
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneState {
    /// The control plane object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<DynamicObject>,
    /// The infrastructure machine template it references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_machine_template: Option<DynamicObject>,
}

/// Current objects of one worker group
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentState {
    /// The MachineDeployment
    pub object: MachineDeployment,
    /// The bootstrap template it references, if it could be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_template: Option<DynamicObject>,
    /// The infrastructure machine template it references, if it could be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_machine_template: Option<DynamicObject>,
}

/// The complete target object graph for one cluster
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    /// The cluster object, with references to the computed objects
    pub cluster: Cluster,
    /// The infrastructure cluster
    pub infrastructure_cluster: DynamicObject,
    /// Control plane objects
    pub control_plane: DesiredControlPlane,
    /// Topology instance name -> worker group objects
    pub machine_deployments: BTreeMap<String, DesiredMachineDeployment>,
}

impl DesiredState {
    /// Number of objects the persistence layer has to reconcile
    pub fn resource_count(&self) -> usize {
        let control_plane =
            1 + usize::from(self.control_plane.infrastructure_machine_template.is_some());
        // cluster + infrastructure cluster + control plane + 3 per worker group
        2 + control_plane + 3 * self.machine_deployments.len()
    }

    /// Worker group instance names, in order
    pub fn machine_deployment_names(&self) -> impl Iterator<Item = &str> {
        self.machine_deployments.keys().map(String::as_str)
    }
}

/// Desired control plane objects
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredControlPlane {
    /// The control plane object
    pub object: DynamicObject,
    /// The infrastructure machine template for control plane machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_machine_template: Option<DynamicObject>,
}

/// Desired objects of one worker group
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredMachineDeployment {
    /// Per-cluster copy of the class bootstrap template
    pub bootstrap_template: DynamicObject,
    /// Per-cluster copy of the class infrastructure machine template
    pub infrastructure_machine_template: DynamicObject,
    /// The MachineDeployment
    pub object: MachineDeployment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ObjectMeta;
    use trellis_common::capi::WorkersTopology;

    fn object(name: &str) -> DynamicObject {
        DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: serde_json::json!({}),
        }
    }

    fn blueprint(workers: Option<WorkersTopology>, cp_machines: bool) -> ClusterBlueprint {
        ClusterBlueprint {
            topology: Topology {
                class: "quick-start".to_string(),
                version: "v1.21.2".to_string(),
                workers,
                ..Default::default()
            },
            cluster_class: ClusterClass::default(),
            infrastructure_cluster_template: object("infra"),
            control_plane: ControlPlaneBlueprint {
                template: object("cp"),
                infrastructure_machine_template: cp_machines.then(|| object("cp-machines")),
            },
            machine_deployments: BTreeMap::new(),
        }
    }

    #[test]
    fn blueprint_predicates_follow_optional_sections() {
        let bare = blueprint(None, false);
        assert!(!bare.has_control_plane_infrastructure_machine());
        assert!(!bare.has_machine_deployments());

        let full = blueprint(Some(WorkersTopology::default()), true);
        assert!(full.has_control_plane_infrastructure_machine());
        assert!(full.has_machine_deployments());
    }

    #[test]
    fn control_plane_object_is_none_without_control_plane() {
        let mut current = CurrentState::new(Cluster::new("c", "ns"));
        assert!(current.control_plane_object().is_none());

        current.control_plane = Some(ControlPlaneState::default());
        assert!(current.control_plane_object().is_none());

        current.control_plane = Some(ControlPlaneState {
            object: Some(object("cp")),
            infrastructure_machine_template: None,
        });
        assert_eq!(
            current
                .control_plane_object()
                .and_then(|cp| cp.metadata.name.as_deref()),
            Some("cp")
        );
    }

    #[test]
    fn resource_count_covers_every_computed_object() {
        let mut state = DesiredState {
            cluster: Cluster::new("c", "ns"),
            infrastructure_cluster: object("infra"),
            control_plane: DesiredControlPlane {
                object: object("cp"),
                infrastructure_machine_template: Some(object("cp-machines")),
            },
            machine_deployments: BTreeMap::new(),
        };
        assert_eq!(state.resource_count(), 4);

        state.machine_deployments.insert(
            "pool1".to_string(),
            DesiredMachineDeployment {
                bootstrap_template: object("b"),
                infrastructure_machine_template: object("i"),
                object: MachineDeployment::new("md", "ns"),
            },
        );
        assert_eq!(state.resource_count(), 7);
        assert_eq!(state.machine_deployment_names().collect::<Vec<_>>(), ["pool1"]);
    }
}
