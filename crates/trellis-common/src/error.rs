//! Error types for the Trellis topology compiler
//!
//! Errors are structured with fields so callers can tell which object kind,
//! field path, or worker class caused a reconcile pass to fail. None of them
//! are fatal: a failed pass computes nothing and is retried by the caller.

use thiserror::Error;

/// Main error type for Trellis operations
#[derive(Debug, Error)]
pub enum Error {
    /// The template generation collaborator rejected a template
    #[error("failed to generate object from template {kind}: {message}")]
    Generation {
        /// Kind of the template that could not be generated
        kind: String,
        /// Description of what failed
        message: String,
    },

    /// A typed field accessor could not read or write its path
    #[error("contract error at {path}: {message}")]
    Contract {
        /// Dotted field path (e.g., "spec.machineTemplate.infrastructureRef")
        path: String,
        /// Description of what failed
        message: String,
    },

    /// A topology entry names a worker class absent from the ClusterClass
    #[error("MachineDeployment blueprint {class} not found in ClusterClass {cluster_class}")]
    ClassNotFound {
        /// The class name requested by the topology
        class: String,
        /// Name of the ClusterClass that was searched
        cluster_class: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// An error annotated with the operation that produced it
    #[error("{context}: {source}")]
    Wrapped {
        /// What was being attempted when the error occurred
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a generation error for the given template kind
    pub fn generation(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Generation {
            kind: kind.into(),
            message: msg.into(),
        }
    }

    /// Create a contract error for the given field path
    pub fn contract(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Contract {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an unresolved-class error
    pub fn class_not_found(class: impl Into<String>, cluster_class: impl Into<String>) -> Self {
        Self::ClassNotFound {
            class: class.into(),
            cluster_class: cluster_class.into(),
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Wrap this error with a description of the failed operation
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any number of [`Error::Wrapped`] layers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Wrapped { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Field path of the root cause, if it is a contract error
    pub fn field_path(&self) -> Option<&str> {
        match self.root_cause() {
            Error::Contract { path, .. } => Some(path),
            _ => None,
        }
    }
}
