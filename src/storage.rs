//! Persisted volumes
//!
//! Volumes are stored as NRRD files. This module loads and saves them and
//! discovers the dataset files to process.

/// NRRD encoding and decoding.
pub mod nrrd;

mod discovery;
mod volume;

pub use discovery::{VOLUME_EXTENSION, collect_volume_paths};
pub(crate) use volume::with_array;
pub use volume::{ElementType, Geometry, LabelVolume, Volume, VolumeData, VolumeError};
