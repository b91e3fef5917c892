//! Cluster API object types consumed and produced by the topology compiler
//!
//! These are typed views over the `cluster.x-k8s.io` objects whose fields the
//! compiler interprets. Provider-specific objects (infrastructure clusters,
//! control planes, machine templates) stay semi-structured as
//! [`kube::core::DynamicObject`].

mod cluster;
mod cluster_class;
mod machine_deployment;

pub use cluster::{
    Cluster, ClusterSpec, ControlPlaneTopology, MachineDeploymentTopology, Metadata, Topology,
    WorkersTopology,
};
pub use cluster_class::{
    ClusterClass, ClusterClassSpec, ControlPlaneClass, LocalObjectTemplate,
    MachineDeploymentClass, MachineDeploymentClassTemplate, WorkersClass,
};
pub use machine_deployment::{
    Bootstrap, MachineDeployment, MachineDeploymentSpec, MachineSpec, MachineTemplateSpec,
    MACHINE_DEPLOYMENT_KIND,
};
