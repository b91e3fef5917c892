//! Typed accessors for well-known fields of semi-structured objects
//!
//! Control plane providers expose a common set of fields (replicas, version,
//! machine template) without sharing a Rust type. Each accessor knows its
//! field path and converts between the JSON body and a typed value, failing
//! with [`Error::Contract`] when the object does not expose the path.
//!
//! ```text
//! let current = contract::control_plane()
//!     .machine_template()
//!     .infrastructure_ref()
//!     .get(&control_plane)?;
//! ```

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::DynamicObject;
use serde_json::{Map, Value};

use trellis_common::capi::Metadata;
use trellis_common::kube_utils::object_to_reference;
use trellis_common::{Error, Result};

/// Accessors for control plane objects
pub fn control_plane() -> ControlPlaneContract {
    ControlPlaneContract
}

/// Fields every control plane provider exposes
#[derive(Clone, Copy, Debug)]
pub struct ControlPlaneContract;

impl ControlPlaneContract {
    /// `spec.machineTemplate`, for providers that run their own machines
    pub fn machine_template(&self) -> ControlPlaneMachineTemplate {
        ControlPlaneMachineTemplate
    }

    /// `spec.replicas`
    pub fn replicas(&self) -> Int64Field {
        Int64Field {
            path: &["spec", "replicas"],
        }
    }

    /// `spec.version`
    pub fn version(&self) -> StringField {
        StringField {
            path: &["spec", "version"],
        }
    }
}

/// `spec.machineTemplate` of a control plane
#[derive(Clone, Copy, Debug)]
pub struct ControlPlaneMachineTemplate;

impl ControlPlaneMachineTemplate {
    /// `spec.machineTemplate.infrastructureRef`
    pub fn infrastructure_ref(&self) -> RefField {
        RefField {
            path: &["spec", "machineTemplate", "infrastructureRef"],
        }
    }

    /// `spec.machineTemplate.metadata`
    pub fn metadata(&self) -> MetadataField {
        MetadataField {
            path: &["spec", "machineTemplate", "metadata"],
        }
    }
}

/// Accessor for an object reference field
#[derive(Clone, Copy, Debug)]
pub struct RefField {
    path: &'static [&'static str],
}

impl RefField {
    /// Dotted field path
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Read the reference
    pub fn get(&self, object: &DynamicObject) -> Result<ObjectReference> {
        let value = get_nested(&object.data, self.path)?;
        let field = |name: &str| -> Result<Option<String>> {
            match value.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(Error::contract(
                    format!("{}.{name}", self.path()),
                    format!("expected a string, found {other}"),
                )),
            }
        };

        let reference = ObjectReference {
            api_version: field("apiVersion")?,
            kind: field("kind")?,
            name: field("name")?,
            namespace: field("namespace")?,
            ..Default::default()
        };
        if reference.name.as_deref().unwrap_or_default().is_empty() {
            return Err(Error::contract(self.path(), "reference has no name"));
        }
        Ok(reference)
    }

    /// Point the reference at `target`
    pub fn set(&self, object: &mut DynamicObject, target: &DynamicObject) -> Result<()> {
        let reference = object_to_reference(target);
        let mut value = Map::new();
        for (key, field) in [
            ("apiVersion", reference.api_version),
            ("kind", reference.kind),
            ("name", reference.name),
            ("namespace", reference.namespace),
        ] {
            if let Some(field) = field {
                value.insert(key.to_string(), Value::String(field));
            }
        }
        set_nested(&mut object.data, self.path, Value::Object(value))
    }
}

/// Accessor for a labels/annotations metadata field
#[derive(Clone, Copy, Debug)]
pub struct MetadataField {
    path: &'static [&'static str],
}

impl MetadataField {
    /// Dotted field path
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Read the metadata
    pub fn get(&self, object: &DynamicObject) -> Result<Metadata> {
        let value = get_nested(&object.data, self.path)?;
        serde_json::from_value(value.clone())
            .map_err(|e| Error::contract(self.path(), format!("invalid metadata: {e}")))
    }

    /// Replace the metadata
    pub fn set(&self, object: &mut DynamicObject, metadata: &Metadata) -> Result<()> {
        let value = serde_json::to_value(metadata)
            .map_err(|e| Error::serialization_for_kind("Metadata", e.to_string()))?;
        set_nested(&mut object.data, self.path, value)
    }
}

/// Accessor for an integer field
#[derive(Clone, Copy, Debug)]
pub struct Int64Field {
    path: &'static [&'static str],
}

impl Int64Field {
    /// Dotted field path
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Read the value
    pub fn get(&self, object: &DynamicObject) -> Result<i64> {
        get_nested(&object.data, self.path)?
            .as_i64()
            .ok_or_else(|| Error::contract(self.path(), "expected an integer"))
    }

    /// Write the value
    pub fn set(&self, object: &mut DynamicObject, value: i64) -> Result<()> {
        set_nested(&mut object.data, self.path, Value::from(value))
    }
}

/// Accessor for a string field
#[derive(Clone, Copy, Debug)]
pub struct StringField {
    path: &'static [&'static str],
}

impl StringField {
    /// Dotted field path
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Read the value
    pub fn get(&self, object: &DynamicObject) -> Result<String> {
        get_nested(&object.data, self.path)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::contract(self.path(), "expected a string"))
    }

    /// Write the value
    pub fn set(&self, object: &mut DynamicObject, value: &str) -> Result<()> {
        set_nested(&mut object.data, self.path, Value::String(value.to_string()))
    }
}

fn get_nested<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        current = current.get(*segment).ok_or_else(|| {
            Error::contract(path[..=depth].join("."), "field not found")
        })?;
    }
    Ok(current)
}

/// Write `value` at `path`, creating missing intermediate objects
fn set_nested(root: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Err(Error::contract("", "empty field path"));
    };

    if root.is_null() {
        *root = Value::Object(Map::new());
    }
    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let map = current.as_object_mut().ok_or_else(|| {
            Error::contract(path[..depth].join("."), "expected an object")
        })?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    current
        .as_object_mut()
        .ok_or_else(|| Error::contract(parents.join("."), "expected an object"))?
        .insert(last.to_string(), value);
    Ok(())
}
