//! Cluster API `ClusterClass`: the class-level references a blueprint is resolved from

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::{ObjectMeta, TypeMeta};
use serde::{Deserialize, Serialize};

use super::Metadata;

/// A Cluster API `ClusterClass`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClusterClass {
    /// apiVersion and kind
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// ClusterClass spec
    #[serde(default)]
    pub spec: ClusterClassSpec,
}

impl ClusterClass {
    /// ClusterClass name, empty when unset
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Look up a worker class by name
    pub fn machine_deployment_class(&self, class: &str) -> Option<&MachineDeploymentClass> {
        self.spec
            .workers
            .machine_deployments
            .iter()
            .find(|md| md.class == class)
    }
}

/// Spec of a `ClusterClass`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterClassSpec {
    /// Template for the provider-specific infrastructure cluster
    #[serde(default)]
    pub infrastructure: LocalObjectTemplate,
    /// Control plane class
    #[serde(default)]
    pub control_plane: ControlPlaneClass,
    /// Worker classes
    #[serde(default)]
    pub workers: WorkersClass,
}

/// A reference to a template living next to the ClusterClass
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct LocalObjectTemplate {
    /// The template reference
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ObjectReference>,
}

impl LocalObjectTemplate {
    /// Template reference pointing at the given object
    pub fn new(reference: ObjectReference) -> Self {
        Self {
            reference: Some(reference),
        }
    }
}

/// Control plane class
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneClass {
    /// Metadata propagated to control plane machines
    #[serde(default)]
    pub metadata: Metadata,
    /// Reference to the control plane template
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ObjectReference>,
    /// Infrastructure machine template for control plane machines, when the
    /// control plane provider runs its own machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_infrastructure: Option<LocalObjectTemplate>,
}

/// Worker classes
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkersClass {
    /// MachineDeployment classes
    #[serde(default)]
    pub machine_deployments: Vec<MachineDeploymentClass>,
}

/// A MachineDeployment class
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MachineDeploymentClass {
    /// Class name referenced by topology worker groups
    pub class: String,
    /// Templates and default metadata of the class
    #[serde(default)]
    pub template: MachineDeploymentClassTemplate,
}

/// Templates of a MachineDeployment class
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MachineDeploymentClassTemplate {
    /// Default metadata for machines of this class
    #[serde(default)]
    pub metadata: Metadata,
    /// Bootstrap config template
    #[serde(default)]
    pub bootstrap: LocalObjectTemplate,
    /// Infrastructure machine template
    #[serde(default)]
    pub infrastructure: LocalObjectTemplate,
}
