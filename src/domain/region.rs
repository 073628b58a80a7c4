//! Region identifiers and the references that carry them

/// Identifier of a brain region.
///
/// Region ids are the label values stored in annotation volumes.
pub type RegionId = u32;

/// Error returned when a region reference does not end in a numeric id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Malformed region reference '{0}': the final path segment must be a non-negative integer")]
pub struct MalformedReference(String);

/// Extracts the region id from a region reference.
///
/// A region reference is a slash-delimited resource locator whose final path
/// segment is the numeric id, for example
/// `http://api.brain-map.org/api/v2/data/Structure/997`. A bare id (`"997"`)
/// is also accepted.
///
/// # Errors
///
/// Returns [`MalformedReference`] if the final segment is not an integer.
pub fn region_id_from_reference(reference: &str) -> Result<RegionId, MalformedReference> {
    reference
        .trim()
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| MalformedReference(reference.to_string()))
}
