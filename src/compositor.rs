//! Region-aware compositing of volumes
//!
//! The [`Compositor`] merges every default dataset found at a location with
//! the per-region overrides of an [`OverrideMap`]. For each dataset a copy of
//! the default array is taken, and for each override (in map order) the
//! voxels whose annotation label lies in the region's descendant set are
//! replaced with the override's values, converted to the default's element
//! type. Later overrides win where masks overlap.

use std::{
    collections::{BTreeSet, HashSet},
    io,
    path::{Path, PathBuf},
};

use ndarray::{Array3, Zip};
use num_traits::AsPrimitive;
use thiserror::Error;

use crate::{
    domain::{OverrideMap, RegionHierarchy, RegionId},
    storage::{
        LabelVolume, VOLUME_EXTENSION, Volume, VolumeData, VolumeError, collect_volume_paths,
        with_array,
    },
};

/// Errors that abort a compositing run.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The default location does not exist.
    #[error("the output of the default rule does not exist at {0}")]
    DefaultOutputMissing(PathBuf),

    /// The default location contains no dataset files.
    #[error("no default output to merge: no .{extension} files found at {location}")]
    NoDefaultOutput {
        /// The searched location.
        location: PathBuf,
        /// The dataset file extension searched for.
        extension: String,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        /// The output directory.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A default dataset could not be loaded.
    #[error("failed to load default dataset: {0}")]
    LoadDefault(#[source] VolumeError),

    /// An override directory lacks the file matching a default dataset.
    #[error("region {region}: override file {expected} for dataset {dataset} does not exist")]
    MissingOverrideFile {
        /// The default dataset being merged.
        dataset: PathBuf,
        /// The region of the override entry.
        region: RegionId,
        /// The file that was expected in the override directory.
        expected: PathBuf,
    },

    /// An override file could not be loaded.
    #[error("region {region}: failed to load override for dataset {dataset}: {source}")]
    LoadOverride {
        /// The default dataset being merged.
        dataset: PathBuf,
        /// The region of the override entry.
        region: RegionId,
        /// The load failure.
        source: VolumeError,
    },

    /// The annotation volume does not match the default dataset's shape.
    #[error(
        "annotation shape {annotation:?} does not match shape {expected:?} of dataset {dataset}"
    )]
    AnnotationShapeMismatch {
        /// The default dataset being merged.
        dataset: PathBuf,
        /// Shape of the default dataset.
        expected: [usize; 3],
        /// Shape of the annotation volume.
        annotation: [usize; 3],
    },

    /// An override volume does not match the default dataset's shape.
    #[error(
        "region {region}: override {file} has shape {found:?}, dataset {dataset} has shape {expected:?}"
    )]
    ShapeMismatch {
        /// The default dataset being merged.
        dataset: PathBuf,
        /// The region of the override entry.
        region: RegionId,
        /// The override file.
        file: PathBuf,
        /// Shape of the default dataset.
        expected: [usize; 3],
        /// Shape of the override volume.
        found: [usize; 3],
    },

    /// A merged dataset could not be written.
    #[error("failed to save merged dataset: {0}")]
    Save(#[source] VolumeError),
}

/// The source or mask of an overlay does not have the target's shape.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("shape {found:?} does not match {expected:?}")]
pub struct ShapeMismatch {
    /// Shape of the target.
    pub expected: [usize; 3],
    /// Shape of the source or mask.
    pub found: [usize; 3],
}

/// A region that was skipped because the hierarchy does not contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion {
    /// The region id from the override map.
    pub region: RegionId,
    /// The dataset that was being merged.
    pub dataset: PathBuf,
}

/// The result of merging one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDataset {
    /// Path of the merged volume.
    pub output: PathBuf,
    /// Override regions skipped because the hierarchy lacks them.
    pub unknown_regions: Vec<RegionId>,
}

/// The result of a compositing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged volume paths, in dataset discovery order.
    pub outputs: Vec<PathBuf>,
    /// Every override skipped because of an unknown region.
    pub unknown_regions: Vec<UnknownRegion>,
}

/// Merges default datasets with region overrides.
///
/// The hierarchy and annotation are borrowed immutably for the whole run.
#[derive(Debug, Clone)]
pub struct Compositor<'a> {
    hierarchy: &'a RegionHierarchy,
    annotation: &'a LabelVolume,
    extension: String,
}

impl<'a> Compositor<'a> {
    /// Creates a compositor that merges `.nrrd` datasets.
    #[must_use]
    pub fn new(hierarchy: &'a RegionHierarchy, annotation: &'a LabelVolume) -> Self {
        Self {
            hierarchy,
            annotation,
            extension: VOLUME_EXTENSION.to_string(),
        }
    }

    /// Sets the extension of the dataset files to discover.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Merges every dataset found at `default_location` and writes the
    /// results to `output_dir`.
    ///
    /// Datasets are processed one at a time in sorted path order. The run
    /// stops at the first error; results already written stay on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the default location is missing or holds no
    /// datasets, the output directory cannot be created, or any dataset
    /// fails to merge (see [`Compositor::merge_file`]).
    pub fn merge(
        &self,
        overrides: &OverrideMap,
        default_location: &Path,
        output_dir: &Path,
    ) -> Result<MergeOutcome, MergeError> {
        if !default_location.exists() {
            return Err(MergeError::DefaultOutputMissing(
                default_location.to_path_buf(),
            ));
        }

        let datasets = collect_volume_paths(default_location, &self.extension);
        if datasets.is_empty() {
            return Err(MergeError::NoDefaultOutput {
                location: default_location.to_path_buf(),
                extension: self.extension.clone(),
            });
        }

        std::fs::create_dir_all(output_dir).map_err(|source| MergeError::CreateOutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let mut outcome = MergeOutcome::default();
        for dataset in datasets {
            let merged = self.merge_file(overrides, &dataset, output_dir)?;
            outcome.outputs.push(merged.output);
            outcome
                .unknown_regions
                .extend(merged.unknown_regions.into_iter().map(|region| UnknownRegion {
                    region,
                    dataset: dataset.clone(),
                }));
        }
        Ok(outcome)
    }

    /// Merges a single default dataset and writes the result to
    /// `output_dir`, under the dataset's file name.
    ///
    /// Overrides naming a region the hierarchy does not contain are skipped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset or an override cannot be loaded, an
    /// override file is missing, the annotation or an override does not
    /// match the dataset's shape, or the result cannot be saved.
    pub fn merge_file(
        &self,
        overrides: &OverrideMap,
        default_file: &Path,
        output_dir: &Path,
    ) -> Result<MergedDataset, MergeError> {
        let Some(file_name) = default_file.file_name().map(Path::new) else {
            return Err(MergeError::DefaultOutputMissing(default_file.to_path_buf()));
        };

        let default = Volume::load(default_file).map_err(MergeError::LoadDefault)?;
        if self.annotation.shape() != default.shape() {
            return Err(MergeError::AnnotationShapeMismatch {
                dataset: default_file.to_path_buf(),
                expected: default.shape(),
                annotation: self.annotation.shape(),
            });
        }

        let mut result = default.data().clone();
        let mut unknown_regions = Vec::new();

        for entry in overrides {
            let ids = self.hierarchy.descendants_of(entry.region);
            if ids.is_empty() {
                tracing::warn!(
                    "Region {} is not found in the hierarchy provided, skipping it for {}",
                    entry.region,
                    default_file.display()
                );
                unknown_regions.push(entry.region);
                continue;
            }

            let file = entry.file_for(file_name);
            if !file.is_file() {
                return Err(MergeError::MissingOverrideFile {
                    dataset: default_file.to_path_buf(),
                    region: entry.region,
                    expected: file,
                });
            }

            let replacement = Volume::load(&file).map_err(|source| MergeError::LoadOverride {
                dataset: default_file.to_path_buf(),
                region: entry.region,
                source,
            })?;

            let mask = region_mask(self.annotation.labels(), &ids);
            overlay(&mut result, replacement.data(), &mask).map_err(
                |ShapeMismatch { expected, found }| MergeError::ShapeMismatch {
                    dataset: default_file.to_path_buf(),
                    region: entry.region,
                    file: file.clone(),
                    expected,
                    found,
                },
            )?;

            tracing::debug!(
                "Replaced region {} ({} ids) of {} with {}",
                entry.region,
                ids.len(),
                file_name.display(),
                file.display()
            );
        }

        let output = output_dir.join(file_name);
        default
            .with_data(result)
            .save(&output)
            .map_err(MergeError::Save)?;
        tracing::info!("Merged {} into {}", default_file.display(), output.display());

        Ok(MergedDataset {
            output,
            unknown_regions,
        })
    }
}

/// Merges every dataset at `default_location` with the overrides and returns
/// the paths of the merged volumes.
///
/// Unknown regions are logged and skipped.
///
/// # Errors
///
/// See [`Compositor::merge`].
pub fn merge(
    hierarchy: &RegionHierarchy,
    annotation: &LabelVolume,
    overrides: &OverrideMap,
    default_location: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, MergeError> {
    Compositor::new(hierarchy, annotation)
        .merge(overrides, default_location, output_dir)
        .map(|outcome| outcome.outputs)
}

/// Marks every voxel whose label is one of `ids`.
#[must_use]
pub fn region_mask(labels: &Array3<RegionId>, ids: &BTreeSet<RegionId>) -> Array3<bool> {
    let ids: HashSet<RegionId> = ids.iter().copied().collect();
    Zip::from(labels).par_map_collect(|label| ids.contains(label))
}

/// Copies `source` into `target` wherever `mask` is set.
///
/// Samples are converted to the element type of `target` the way an `as`
/// cast does: floats are truncated toward zero and saturate at the bounds of
/// an integer type, and integers wrap when narrowed.
///
/// # Errors
///
/// Returns an error, leaving `target` untouched, if `source` or `mask` has a
/// different shape than `target`.
pub fn overlay(
    target: &mut VolumeData,
    source: &VolumeData,
    mask: &Array3<bool>,
) -> Result<(), ShapeMismatch> {
    let expected = target.shape();
    for found in [source.shape(), mask.dim().into()] {
        if found != expected {
            return Err(ShapeMismatch { expected, found });
        }
    }

    with_array!(target, target => {
        with_array!(source, source => overlay_array(target, source, mask))
    });
    Ok(())
}

fn overlay_array<T, S>(target: &mut Array3<T>, source: &Array3<S>, mask: &Array3<bool>)
where
    T: Copy + Send + Sync + 'static,
    S: AsPrimitive<T> + Send + Sync,
{
    Zip::from(target)
        .and(source)
        .and(mask)
        .par_for_each(|target, &source, &selected| {
            if selected {
                *target = source.as_();
            }
        });
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;
    use crate::storage::Geometry;

    const SHAPE: (usize, usize, usize) = (2, 2, 2);

    /// Hierarchy `{1 root, 2 child of 1, 3 child of 1}`.
    fn hierarchy() -> RegionHierarchy {
        RegionHierarchy::from_parent_links([(1, None), (2, Some(1)), (3, Some(1))]).unwrap()
    }

    /// Labels `[[[1,2],[3,1]],[[2,3],[1,2]]]`.
    fn annotation() -> LabelVolume {
        let labels = Array3::from_shape_vec(SHAPE, vec![1, 2, 3, 1, 2, 3, 1, 2]).unwrap();
        LabelVolume::new(labels, Geometry::default())
    }

    fn default_geometry() -> Geometry {
        Geometry::from_spacing([25.0; 3], [100.0, 200.0, 300.0])
    }

    fn override_map<const N: usize>(entries: [(RegionId, PathBuf); N]) -> OverrideMap {
        entries.into_iter().collect()
    }

    fn write_filled(path: &Path, value: f32, geometry: Geometry) {
        Volume::new(Array3::from_elem(SHAPE, value), geometry)
            .save(path)
            .unwrap();
    }

    fn values(path: &Path) -> Vec<f32> {
        match Volume::load(path).unwrap().into_parts().0 {
            VolumeData::F32(array) => array.iter().copied().collect(),
            other => panic!("unexpected element type {}", other.element_type()),
        }
    }

    struct Fixture {
        tmp: tempfile::TempDir,
    }

    impl Fixture {
        /// A default dataset `density.nrrd` filled with zeros.
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            write_filled(
                &tmp.path().join("default").join("density.nrrd"),
                0.0,
                default_geometry(),
            );
            Self { tmp }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.tmp.path().join(name)
        }

        fn override_dir(&self, name: &str, value: f32) -> PathBuf {
            let dir = self.path(name);
            write_filled(&dir.join("density.nrrd"), value, Geometry::default());
            dir
        }

        fn merge(&self, overrides: &OverrideMap) -> Result<MergeOutcome, MergeError> {
            let hierarchy = hierarchy();
            let annotation = annotation();
            Compositor::new(&hierarchy, &annotation).merge(
                overrides,
                &self.path("default"),
                &self.path("merged"),
            )
        }
    }

    #[test]
    fn replaces_voxels_of_region() {
        let fixture = Fixture::new();
        let overrides = override_map([(2, fixture.override_dir("dir_a", 9.0))]);

        let outcome = fixture.merge(&overrides).unwrap();

        assert_eq!(outcome.outputs, vec![fixture.path("merged").join("density.nrrd")]);
        assert!(outcome.unknown_regions.is_empty());
        assert_eq!(
            values(&outcome.outputs[0]),
            vec![0.0, 9.0, 0.0, 0.0, 9.0, 0.0, 0.0, 9.0]
        );
    }

    #[test]
    fn parent_region_covers_descendants() {
        let fixture = Fixture::new();
        let overrides = override_map([(1, fixture.override_dir("dir_a", 4.0))]);

        let outcome = fixture.merge(&overrides).unwrap();

        assert_eq!(values(&outcome.outputs[0]), vec![4.0; 8]);
    }

    #[test]
    fn later_override_wins_where_masks_overlap() {
        let fixture = Fixture::new();
        let overrides = override_map([
            (1, fixture.override_dir("dir_a", 5.0)),
            (2, fixture.override_dir("dir_b", 7.0)),
        ]);

        let outcome = fixture.merge(&overrides).unwrap();

        assert_eq!(
            values(&outcome.outputs[0]),
            vec![5.0, 7.0, 5.0, 5.0, 7.0, 5.0, 5.0, 7.0]
        );
    }

    #[test]
    fn repeated_region_keeps_last_entry() {
        let fixture = Fixture::new();
        let overrides = override_map([
            (3, fixture.override_dir("dir_a", 5.0)),
            (3, fixture.override_dir("dir_b", 7.0)),
        ]);

        let outcome = fixture.merge(&overrides).unwrap();

        assert_eq!(
            values(&outcome.outputs[0]),
            vec![0.0, 0.0, 7.0, 0.0, 0.0, 7.0, 0.0, 0.0]
        );
    }

    #[test]
    fn unknown_region_is_skipped_with_warning() {
        let fixture = Fixture::new();
        let overrides = override_map([(99, fixture.path("nowhere"))]);

        let outcome = fixture.merge(&overrides).unwrap();

        assert_eq!(values(&outcome.outputs[0]), vec![0.0; 8]);
        assert_eq!(
            outcome.unknown_regions,
            vec![UnknownRegion {
                region: 99,
                dataset: fixture.path("default").join("density.nrrd"),
            }]
        );
    }

    #[test]
    fn merged_volume_keeps_default_shape_and_geometry() {
        let fixture = Fixture::new();
        let overrides = override_map([(2, fixture.override_dir("dir_a", 9.0))]);

        let outcome = fixture.merge(&overrides).unwrap();
        let merged = Volume::load(&outcome.outputs[0]).unwrap();

        assert_eq!(merged.shape(), [2, 2, 2]);
        assert_eq!(merged.geometry(), &default_geometry());
    }

    #[test]
    fn default_volume_is_not_modified() {
        let fixture = Fixture::new();
        let overrides = override_map([(1, fixture.override_dir("dir_a", 3.0))]);

        fixture.merge(&overrides).unwrap();

        assert_eq!(
            values(&fixture.path("default").join("density.nrrd")),
            vec![0.0; 8]
        );
    }

    #[test]
    fn merges_each_file_of_a_directory() {
        let fixture = Fixture::new();
        write_filled(
            &fixture.path("default").join("astrocytes.nrrd"),
            1.0,
            default_geometry(),
        );
        let dir = fixture.override_dir("dir_a", 9.0);
        write_filled(&dir.join("astrocytes.nrrd"), 8.0, Geometry::default());
        let overrides = override_map([(3, dir)]);

        let outcome = fixture.merge(&overrides).unwrap();

        let merged = fixture.path("merged");
        assert_eq!(
            outcome.outputs,
            vec![merged.join("astrocytes.nrrd"), merged.join("density.nrrd")]
        );
        assert_eq!(
            values(&outcome.outputs[0]),
            vec![1.0, 1.0, 8.0, 1.0, 1.0, 8.0, 1.0, 1.0]
        );
        assert_eq!(
            values(&outcome.outputs[1]),
            vec![0.0, 0.0, 9.0, 0.0, 0.0, 9.0, 0.0, 0.0]
        );
    }

    #[test]
    fn merge_function_returns_output_paths() {
        let fixture = Fixture::new();
        let overrides = override_map([(2, fixture.override_dir("dir_a", 9.0))]);

        let outputs = merge(
            &hierarchy(),
            &annotation(),
            &overrides,
            &fixture.path("default").join("density.nrrd"),
            &fixture.path("merged"),
        )
        .unwrap();

        assert_eq!(outputs, vec![fixture.path("merged").join("density.nrrd")]);
    }

    #[test]
    fn missing_override_file_is_fatal() {
        let fixture = Fixture::new();
        let empty = fixture.path("empty");
        std::fs::create_dir_all(&empty).unwrap();
        let overrides = override_map([(2, empty.clone())]);

        let err = fixture.merge(&overrides).unwrap_err();

        assert!(matches!(
            err,
            MergeError::MissingOverrideFile { region: 2, expected, .. }
                if expected == empty.join("density.nrrd")
        ));
    }

    #[test]
    fn override_shape_mismatch_is_fatal() {
        let fixture = Fixture::new();
        let dir = fixture.path("dir_a");
        Volume::new(Array3::<f32>::zeros((2, 2, 3)), Geometry::default())
            .save(&dir.join("density.nrrd"))
            .unwrap();
        let overrides = override_map([(2, dir)]);

        let err = fixture.merge(&overrides).unwrap_err();

        assert!(matches!(
            err,
            MergeError::ShapeMismatch {
                region: 2,
                expected: [2, 2, 2],
                found: [2, 2, 3],
                ..
            }
        ));
    }

    #[test]
    fn override_is_converted_to_default_element_type() {
        let fixture = Fixture::new();
        let dir = fixture.path("dir_a");
        Volume::new(Array3::<u8>::from_elem(SHAPE, 200), Geometry::default())
            .save(&dir.join("density.nrrd"))
            .unwrap();
        let overrides = override_map([(2, dir)]);

        let outcome = fixture.merge(&overrides).unwrap();

        assert_eq!(
            values(&outcome.outputs[0]),
            vec![0.0, 200.0, 0.0, 0.0, 200.0, 0.0, 0.0, 200.0]
        );
    }

    #[test]
    fn annotation_shape_mismatch_is_fatal() {
        let fixture = Fixture::new();
        let hierarchy = hierarchy();
        let annotation = LabelVolume::new(Array3::zeros((1, 2, 2)), Geometry::default());

        let err = Compositor::new(&hierarchy, &annotation)
            .merge(
                &OverrideMap::new(),
                &fixture.path("default"),
                &fixture.path("merged"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            MergeError::AnnotationShapeMismatch {
                expected: [2, 2, 2],
                annotation: [1, 2, 2],
                ..
            }
        ));
    }

    #[test]
    fn empty_default_directory_is_fatal() {
        let fixture = Fixture::new();
        let empty = fixture.path("empty");
        std::fs::create_dir_all(&empty).unwrap();
        let hierarchy = hierarchy();
        let annotation = annotation();

        let err = Compositor::new(&hierarchy, &annotation)
            .merge(&OverrideMap::new(), &empty, &fixture.path("merged"))
            .unwrap_err();

        assert!(matches!(err, MergeError::NoDefaultOutput { .. }));
        assert!(!fixture.path("merged").exists());
    }

    #[test]
    fn missing_default_location_is_fatal() {
        let fixture = Fixture::new();
        let hierarchy = hierarchy();
        let annotation = annotation();

        let err = Compositor::new(&hierarchy, &annotation)
            .merge(
                &OverrideMap::new(),
                &fixture.path("missing"),
                &fixture.path("merged"),
            )
            .unwrap_err();

        assert!(matches!(err, MergeError::DefaultOutputMissing(_)));
    }

    #[test]
    fn custom_extension_selects_datasets() {
        let fixture = Fixture::new();
        std::fs::copy(
            fixture.path("default").join("density.nrrd"),
            fixture.path("default").join("density.vol"),
        )
        .unwrap();
        let hierarchy = hierarchy();
        let annotation = annotation();

        let outcome = Compositor::new(&hierarchy, &annotation)
            .with_extension("vol")
            .merge(
                &OverrideMap::new(),
                &fixture.path("default"),
                &fixture.path("merged"),
            )
            .unwrap();

        assert_eq!(outcome.outputs, vec![fixture.path("merged").join("density.vol")]);
    }

    #[test]
    fn earlier_outputs_remain_after_failure() {
        let fixture = Fixture::new();
        write_filled(
            &fixture.path("default").join("astrocytes.nrrd"),
            1.0,
            default_geometry(),
        );
        // only the first dataset (astrocytes) has an override
        let dir = fixture.path("dir_a");
        write_filled(&dir.join("astrocytes.nrrd"), 8.0, Geometry::default());
        let overrides = override_map([(3, dir)]);

        let err = fixture.merge(&overrides).unwrap_err();

        assert!(matches!(err, MergeError::MissingOverrideFile { .. }));
        assert!(fixture.path("merged").join("astrocytes.nrrd").is_file());
        assert!(!fixture.path("merged").join("density.nrrd").exists());
    }

    #[test]
    fn region_mask_selects_labels_in_set() {
        let mask = region_mask(annotation().labels(), &BTreeSet::from([2, 3]));
        assert_eq!(
            mask.iter().copied().collect::<Vec<_>>(),
            vec![false, true, true, false, true, true, false, true]
        );
    }

    #[test]
    fn overlay_rejects_shape_mismatch() {
        let mask = Array3::from_elem(SHAPE, true);
        let mut target = VolumeData::from(Array3::<f32>::zeros(SHAPE));

        let err = overlay(
            &mut target,
            &VolumeData::from(Array3::<f32>::ones((2, 2, 1))),
            &mask,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ShapeMismatch {
                expected: [2, 2, 2],
                found: [2, 2, 1],
            }
        );
        assert_eq!(target, VolumeData::from(Array3::<f32>::zeros(SHAPE)));
    }

    #[test]
    fn overlay_casts_like_numeric_assignment() {
        let mask = Array3::from_shape_vec(
            SHAPE,
            vec![true, false, true, true, false, true, true, true],
        )
        .unwrap();
        let source = Array3::from_shape_vec(
            SHAPE,
            vec![1.9, 5.0, -2.7, 300.0, 5.0, -1.0, 0.0, 65.5],
        )
        .unwrap();
        let mut target = VolumeData::from(Array3::<u8>::from_elem(SHAPE, 9));

        overlay(&mut target, &VolumeData::from(source), &mask).unwrap();

        let VolumeData::U8(target) = &target else {
            panic!("unexpected element type {}", target.element_type());
        };
        assert_eq!(
            target.iter().copied().collect::<Vec<_>>(),
            vec![1, 9, 0, 255, 9, 0, 0, 65]
        );
    }
}
