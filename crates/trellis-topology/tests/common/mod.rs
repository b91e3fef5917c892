//! Shared fixtures for desired-state integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kube::core::DynamicObject;
use serde_json::{json, Value};

use trellis_common::capi::{Cluster, ClusterClass, MachineDeploymentTopology, Topology};
use trellis_topology::{
    ClusterBlueprint, ControlPlaneBlueprint, ControlPlaneState, CurrentState, DesiredState,
    MachineDeploymentBlueprint, MachineDeploymentState, NameGenerator, Scope,
};

pub const CLUSTER: &str = "prod";
pub const NAMESPACE: &str = "fleet";
pub const VERSION: &str = "v1.21.2";

/// Deterministic names: `<prefix><tag>0`, `<prefix><tag>1`, ...
#[derive(Clone, Default)]
pub struct CountingNames {
    tag: String,
    next: Arc<AtomicUsize>,
}

impl CountingNames {
    /// Generator whose names never collide with another tag's
    pub fn tagged(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl NameGenerator for CountingNames {
    fn generate_name(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}{}{n}", self.tag)
    }
}

pub fn dynamic(value: Value) -> DynamicObject {
    serde_json::from_value(value).expect("valid object")
}

pub fn cluster_class(worker_classes: &[&str]) -> ClusterClass {
    let workers: Vec<Value> = worker_classes
        .iter()
        .map(|class| {
            json!({
                "class": class,
                "template": {
                    "metadata": { "labels": { "pool-class": class } },
                    "bootstrap": { "ref": {
                        "apiVersion": "bootstrap.cluster.x-k8s.io/v1alpha4",
                        "kind": "KubeadmConfigTemplate",
                        "name": format!("{class}-bootstrap")
                    } },
                    "infrastructure": { "ref": {
                        "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha4",
                        "kind": "DockerMachineTemplate",
                        "name": format!("{class}-machines")
                    } }
                }
            })
        })
        .collect();

    serde_json::from_value(json!({
        "apiVersion": "cluster.x-k8s.io/v1alpha4",
        "kind": "ClusterClass",
        "metadata": { "name": "quick-start", "namespace": NAMESPACE },
        "spec": {
            "infrastructure": { "ref": {
                "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha4",
                "kind": "DockerClusterTemplate",
                "name": "quick-start-cluster"
            } },
            "controlPlane": {
                "metadata": { "labels": { "role": "control-plane" } },
                "ref": {
                    "apiVersion": "controlplane.cluster.x-k8s.io/v1alpha4",
                    "kind": "KubeadmControlPlaneTemplate",
                    "name": "quick-start-control-plane"
                },
                "machineInfrastructure": { "ref": {
                    "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha4",
                    "kind": "DockerMachineTemplate",
                    "name": "quick-start-control-plane-machines"
                } }
            },
            "workers": { "machineDeployments": workers }
        }
    }))
    .expect("valid ClusterClass")
}

fn template(api_version: &str, kind: &str, name: &str, spec: Value) -> DynamicObject {
    dynamic(json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "uid": format!("uid-{name}"),
            "resourceVersion": "42"
        },
        "spec": { "template": { "spec": spec } }
    }))
}

pub fn pool(class: &str, name: &str, replicas: Option<i32>) -> MachineDeploymentTopology {
    MachineDeploymentTopology {
        class: class.to_string(),
        name: name.to_string(),
        replicas,
        ..Default::default()
    }
}

pub fn topology(pools: Vec<MachineDeploymentTopology>) -> Topology {
    serde_json::from_value(json!({
        "class": "quick-start",
        "version": VERSION,
        "controlPlane": { "replicas": 3, "metadata": { "labels": { "role": "api" } } },
        "workers": { "machineDeployments": pools }
    }))
    .expect("valid topology")
}

/// Scope for a cluster nothing has been created for yet
pub fn scope(worker_classes: &[&str], pools: Vec<MachineDeploymentTopology>) -> Scope {
    let class = cluster_class(worker_classes);
    let topology = topology(pools);

    let machine_deployments = worker_classes
        .iter()
        .map(|class| {
            (
                class.to_string(),
                MachineDeploymentBlueprint {
                    metadata: serde_json::from_value(json!({ "labels": { "pool-class": class } }))
                        .expect("valid metadata"),
                    bootstrap_template: template(
                        "bootstrap.cluster.x-k8s.io/v1alpha4",
                        "KubeadmConfigTemplate",
                        &format!("{class}-bootstrap"),
                        json!({ "joinConfiguration": {} }),
                    ),
                    infrastructure_machine_template: template(
                        "infrastructure.cluster.x-k8s.io/v1alpha4",
                        "DockerMachineTemplate",
                        &format!("{class}-machines"),
                        json!({ "extraMounts": [] }),
                    ),
                },
            )
        })
        .collect();

    let blueprint = ClusterBlueprint {
        topology: topology.clone(),
        cluster_class: class,
        infrastructure_cluster_template: template(
            "infrastructure.cluster.x-k8s.io/v1alpha4",
            "DockerClusterTemplate",
            "quick-start-cluster",
            json!({ "loadBalancer": {} }),
        ),
        control_plane: ControlPlaneBlueprint {
            template: template(
                "controlplane.cluster.x-k8s.io/v1alpha4",
                "KubeadmControlPlaneTemplate",
                "quick-start-control-plane",
                json!({ "kubeadmConfigSpec": {} }),
            ),
            infrastructure_machine_template: Some(template(
                "infrastructure.cluster.x-k8s.io/v1alpha4",
                "DockerMachineTemplate",
                "quick-start-control-plane-machines",
                json!({ "extraMounts": [] }),
            )),
        },
        machine_deployments,
    };

    let cluster = Cluster::new(CLUSTER, NAMESPACE).with_topology(topology);
    Scope::new(blueprint, CurrentState::new(cluster))
}

/// Feed a computed state back in as the current state, as if it had been applied
pub fn applied(scope: &Scope, desired: &DesiredState) -> Scope {
    let current = CurrentState {
        cluster: desired.cluster.clone(),
        infrastructure_cluster: Some(desired.infrastructure_cluster.clone()),
        control_plane: Some(ControlPlaneState {
            object: Some(desired.control_plane.object.clone()),
            infrastructure_machine_template: desired
                .control_plane
                .infrastructure_machine_template
                .clone(),
        }),
        machine_deployments: desired
            .machine_deployments
            .iter()
            .map(|(name, md)| {
                (
                    name.clone(),
                    MachineDeploymentState {
                        object: md.object.clone(),
                        bootstrap_template: Some(md.bootstrap_template.clone()),
                        infrastructure_machine_template: Some(
                            md.infrastructure_machine_template.clone(),
                        ),
                    },
                )
            })
            .collect(),
    };
    Scope::new(scope.blueprint.clone(), current)
}
