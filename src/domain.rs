//! Domain models for region-aware compositing.
//!
//! This module contains the region hierarchy, region references, the ordered
//! override map and the run configuration.

/// Brain region hierarchy and descendant resolution.
pub mod hierarchy;
pub use hierarchy::{Region, RegionHierarchy};

/// Region identifiers and region references.
pub mod region;
pub use region::{MalformedReference, RegionId, region_id_from_reference};

mod overrides;
pub use overrides::{Override, OverrideMap};

/// Configuration files describing compositing runs.
pub mod config;
pub use config::{MergeConfig, RegionOverride, Rule};
