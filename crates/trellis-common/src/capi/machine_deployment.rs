//! Cluster API `MachineDeployment`

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::{ObjectMeta, TypeMeta};
use serde::{Deserialize, Serialize};

use super::Metadata;
use crate::constants::CLUSTER_API_VERSION;

/// Kind of a MachineDeployment
pub const MACHINE_DEPLOYMENT_KIND: &str = "MachineDeployment";

/// A Cluster API `MachineDeployment`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MachineDeployment {
    /// apiVersion and kind
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// MachineDeployment spec
    #[serde(default)]
    pub spec: MachineDeploymentSpec,
}

impl MachineDeployment {
    /// Create an empty MachineDeployment with type information set
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            types: Some(TypeMeta {
                api_version: CLUSTER_API_VERSION.to_string(),
                kind: MACHINE_DEPLOYMENT_KIND.to_string(),
            }),
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            spec: MachineDeploymentSpec::default(),
        }
    }

    /// MachineDeployment name, empty when unset
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Reference to the bootstrap config template used by this deployment
    pub fn bootstrap_config_ref(&self) -> Option<&ObjectReference> {
        self.spec.template.spec.bootstrap.config_ref.as_ref()
    }

    /// Reference to the infrastructure machine template used by this deployment
    pub fn infrastructure_ref(&self) -> &ObjectReference {
        &self.spec.template.spec.infrastructure_ref
    }
}

/// Spec of a `MachineDeployment`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentSpec {
    /// Name of the owning cluster
    pub cluster_name: String,
    /// Desired replicas; `None` leaves scaling to an external actor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Template for the machines of this deployment
    #[serde(default)]
    pub template: MachineTemplateSpec,
}

/// Machine template embedded in a `MachineDeployment`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MachineTemplateSpec {
    /// Metadata propagated to MachineSets and Machines
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    /// Machine spec
    #[serde(default)]
    pub spec: MachineSpec,
}

/// Spec of a Machine
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Name of the owning cluster
    pub cluster_name: String,
    /// Bootstrap configuration source
    #[serde(default)]
    pub bootstrap: Bootstrap,
    /// Infrastructure machine template reference
    #[serde(default)]
    pub infrastructure_ref: ObjectReference,
    /// Kubernetes version of the machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Bootstrap configuration source of a Machine
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    /// Reference to the bootstrap config template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_ref: Option<ObjectReference>,
    /// Pre-rendered bootstrap data secret, bypassing the config reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_secret_name: Option<String>,
}
