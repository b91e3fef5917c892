//! Layered label/annotation merging
//!
//! Topology-level metadata overrides class-level defaults key by key.

use std::collections::BTreeMap;

use trellis_common::capi::Metadata;

/// Merge two maps into a new one. On key collision the value from `primary` wins.
pub fn merge_map(
    primary: &BTreeMap<String, String>,
    secondary: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = secondary.clone();
    merged.extend(primary.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Merge labels and annotations independently, `primary` winning on collision
pub fn merge_metadata(primary: &Metadata, secondary: &Metadata) -> Metadata {
    Metadata {
        labels: merge_map(&primary.labels, &secondary.labels),
        annotations: merge_map(&primary.annotations, &secondary.annotations),
    }
}
