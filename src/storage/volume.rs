//! Volumes and their spatial metadata
//!
//! A [`Volume`] pairs a 3-D array of samples with the [`Geometry`] that
//! places it in space. A [`LabelVolume`] is the read-only annotation used to
//! select voxels by region.

use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use ndarray::Array3;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

use crate::{domain::RegionId, storage::nrrd};

/// Numeric element type of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl ElementType {
    /// Size of one sample in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::U16 => "uint16",
            Self::I16 => "int16",
            Self::U32 => "uint32",
            Self::I32 => "int32",
            Self::U64 => "uint64",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// The samples of a volume, in one of the supported element types.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeData {
    /// Unsigned 8-bit samples.
    U8(Array3<u8>),
    /// Signed 8-bit samples.
    I8(Array3<i8>),
    /// Unsigned 16-bit samples.
    U16(Array3<u16>),
    /// Signed 16-bit samples.
    I16(Array3<i16>),
    /// Unsigned 32-bit samples.
    U32(Array3<u32>),
    /// Signed 32-bit samples.
    I32(Array3<i32>),
    /// Unsigned 64-bit samples.
    U64(Array3<u64>),
    /// Signed 64-bit samples.
    I64(Array3<i64>),
    /// 32-bit float samples.
    F32(Array3<f32>),
    /// 64-bit float samples.
    F64(Array3<f64>),
}

/// Evaluates an expression against whichever array a [`VolumeData`] holds.
macro_rules! with_array {
    ($data:expr, $array:ident => $body:expr) => {
        match $data {
            VolumeData::U8($array) => $body,
            VolumeData::I8($array) => $body,
            VolumeData::U16($array) => $body,
            VolumeData::I16($array) => $body,
            VolumeData::U32($array) => $body,
            VolumeData::I32($array) => $body,
            VolumeData::U64($array) => $body,
            VolumeData::I64($array) => $body,
            VolumeData::F32($array) => $body,
            VolumeData::F64($array) => $body,
        }
    };
}
pub(crate) use with_array;

impl VolumeData {
    /// The element type of the samples.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::U8(_) => ElementType::U8,
            Self::I8(_) => ElementType::I8,
            Self::U16(_) => ElementType::U16,
            Self::I16(_) => ElementType::I16,
            Self::U32(_) => ElementType::U32,
            Self::I32(_) => ElementType::I32,
            Self::U64(_) => ElementType::U64,
            Self::I64(_) => ElementType::I64,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    /// The shape of the voxel array.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        with_array!(self, array => array.dim().into())
    }

    /// The number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        with_array!(self, array => array.len())
    }

    /// Whether the array has no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Array3<$ty>> for VolumeData {
                fn from(array: Array3<$ty>) -> Self {
                    Self::$variant(array)
                }
            }
        )*
    };
}

impl_from_array!(
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

/// Placement of a voxel array in physical space.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Step vector of each array axis. The diagonal holds the voxel size.
    pub space_directions: [[f64; 3]; 3],
    /// Physical position of voxel `(0, 0, 0)`.
    pub space_origin: [f64; 3],
    /// Name of the anatomical space, such as `left-posterior-superior`.
    pub space: Option<String>,
}

impl Geometry {
    /// Axis-aligned geometry with the given voxel size and offset.
    #[must_use]
    pub const fn from_spacing(spacing: [f64; 3], origin: [f64; 3]) -> Self {
        Self {
            space_directions: [
                [spacing[0], 0.0, 0.0],
                [0.0, spacing[1], 0.0],
                [0.0, 0.0, spacing[2]],
            ],
            space_origin: origin,
            space: None,
        }
    }

    /// The voxel size along each axis.
    #[must_use]
    pub const fn spacing(&self) -> [f64; 3] {
        [
            self.space_directions[0][0],
            self.space_directions[1][1],
            self.space_directions[2][2],
        ]
    }

    /// The physical offset of the volume.
    #[must_use]
    pub const fn offset(&self) -> [f64; 3] {
        self.space_origin
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::from_spacing([1.0; 3], [0.0; 3])
    }
}

/// Errors that can occur when loading or saving volumes.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// No file exists at the path.
    #[error("volume file {0} not found")]
    NotFound(PathBuf),

    /// The file could not be read or written.
    #[error("failed to access volume file {path}: {source}")]
    Io {
        /// Path of the volume file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The file is not a readable volume.
    #[error("unreadable volume file {path}: {source}")]
    Format {
        /// Path of the volume file.
        path: PathBuf,
        /// What is wrong with the file contents.
        source: nrrd::Error,
    },

    /// An annotation volume holds floating-point samples.
    #[error("annotation volumes must hold integer labels, found {0} samples")]
    NonIntegerLabels(ElementType),

    /// An annotation label is negative or does not fit a region id.
    #[error("annotation label {0} is not a valid region id")]
    LabelOutOfRange(i128),
}

/// A 3-D array of samples together with its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: VolumeData,
    geometry: Geometry,
}

impl Volume {
    /// Creates a volume from samples and geometry.
    pub fn new(data: impl Into<VolumeData>, geometry: Geometry) -> Self {
        Self {
            data: data.into(),
            geometry,
        }
    }

    /// Loads a volume from an NRRD file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or is
    /// not a supported NRRD file.
    pub fn load(path: &Path) -> Result<Self, VolumeError> {
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => VolumeError::NotFound(path.to_path_buf()),
            _ => VolumeError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let volume =
            nrrd::read(&mut BufReader::new(file)).map_err(|source| VolumeError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "Loaded {} volume of shape {:?} from {}",
            volume.element_type(),
            volume.shape(),
            path.display()
        );
        Ok(volume)
    }

    /// Saves the volume as an NRRD file, replacing any existing file.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save(&self, path: &Path) -> Result<(), VolumeError> {
        let io_error = |source: io::Error| VolumeError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        nrrd::write(self, &mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)
    }

    /// The samples of the volume.
    #[must_use]
    pub const fn data(&self) -> &VolumeData {
        &self.data
    }

    /// The geometry of the volume.
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The shape of the voxel array.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.data.shape()
    }

    /// The element type of the samples.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Returns a new volume with this volume's geometry and the given samples.
    #[must_use]
    pub fn with_data(&self, data: impl Into<VolumeData>) -> Self {
        Self::new(data, self.geometry.clone())
    }

    /// Splits the volume into samples and geometry.
    #[must_use]
    pub fn into_parts(self) -> (VolumeData, Geometry) {
        (self.data, self.geometry)
    }
}

/// A volume of region ids, one per voxel.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume {
    labels: Array3<RegionId>,
    geometry: Geometry,
}

impl LabelVolume {
    /// Creates a label volume from region ids and geometry.
    #[must_use]
    pub const fn new(labels: Array3<RegionId>, geometry: Geometry) -> Self {
        Self { labels, geometry }
    }

    /// Loads an annotation volume from an NRRD file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded as a volume or if its
    /// samples are not valid region ids.
    pub fn load(path: &Path) -> Result<Self, VolumeError> {
        Self::from_volume(Volume::load(path)?)
    }

    /// Converts an integer volume into a label volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume holds floating-point samples, or any
    /// sample is negative or larger than the largest region id.
    pub fn from_volume(volume: Volume) -> Result<Self, VolumeError> {
        let (data, geometry) = volume.into_parts();
        let element_type = data.element_type();
        let labels = match data {
            VolumeData::U32(array) => array,
            VolumeData::U8(array) => to_labels(&array)?,
            VolumeData::I8(array) => to_labels(&array)?,
            VolumeData::U16(array) => to_labels(&array)?,
            VolumeData::I16(array) => to_labels(&array)?,
            VolumeData::I32(array) => to_labels(&array)?,
            VolumeData::U64(array) => to_labels(&array)?,
            VolumeData::I64(array) => to_labels(&array)?,
            VolumeData::F32(_) | VolumeData::F64(_) => {
                return Err(VolumeError::NonIntegerLabels(element_type));
            }
        };
        Ok(Self { labels, geometry })
    }

    /// The region id of every voxel.
    #[must_use]
    pub const fn labels(&self) -> &Array3<RegionId> {
        &self.labels
    }

    /// The geometry of the annotation.
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The shape of the voxel array.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.labels.dim().into()
    }
}

fn to_labels<T>(array: &Array3<T>) -> Result<Array3<RegionId>, VolumeError>
where
    T: Copy + Into<i128> + Send + Sync,
    RegionId: TryFrom<T>,
{
    if let Some(&invalid) = array
        .par_iter()
        .find_first(|&&value| RegionId::try_from(value).is_err())
    {
        return Err(VolumeError::LabelOutOfRange(invalid.into()));
    }
    // every sample was range-checked above
    Ok(array.mapv(|value| RegionId::try_from(value).unwrap_or_default()))
}
