//! Desired-state compiler for ClusterClass-based cluster topologies
//!
//! Given a resolved ClusterClass blueprint and the objects that exist today,
//! [`DesiredStateCompiler`] computes every object a managed cluster should
//! have: the InfrastructureCluster, the ControlPlane (and its machine
//! template), the Cluster itself, and one MachineDeployment with per-cluster
//! bootstrap and infrastructure templates per worker group.
//!
//! The compiler is pure: it reads a [`Scope`] and returns a [`DesiredState`].
//! Comparing that state with the cluster and applying the difference is left
//! to the caller.

#![deny(missing_docs)]

pub mod compute;
pub mod contract;
pub mod generate;
pub mod metadata;
pub mod names;
pub mod scope;
pub mod template;

pub use compute::DesiredStateCompiler;
pub use generate::{SpecTemplateGenerator, TemplateGenerator};
pub use names::{NameGenerator, SimpleNameGenerator};
pub use scope::{
    ClusterBlueprint, ControlPlaneBlueprint, ControlPlaneState, CurrentState, DesiredControlPlane,
    DesiredMachineDeployment, DesiredState, MachineDeploymentBlueprint, MachineDeploymentState,
    Scope,
};
pub use trellis_common::{Error, Result};
