//! Common types for Trellis: Cluster API objects, label constants, errors, and utilities

#![deny(missing_docs)]

pub mod capi;
pub mod constants;
pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
