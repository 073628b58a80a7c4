//! Region-aware compositing of labeled brain atlas volumes
//!
//! A default volume is copied and, region by region, the voxels covered by
//! a region and all of its descendants are replaced with values from an
//! override volume.

pub mod domain;
pub use domain::{MergeConfig, OverrideMap, RegionHierarchy, RegionId};

/// Loading, saving and discovering volumes.
pub mod storage;
pub use storage::{Geometry, LabelVolume, Volume, VolumeData, VolumeError};

/// The compositing algorithm.
pub mod compositor;
pub use compositor::{Compositor, MergeError, MergeOutcome, merge};
