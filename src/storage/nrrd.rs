//! Reading and writing NRRD volumes
//!
//! Supports three-dimensional volumes with attached data in `raw`, `text`,
//! `gzip` or `bzip2` encoding. Volumes are always written as `gzip`. The first NRRD axis varies fastest in the file; in memory the
//! array shape is `(sizes[0], sizes[1], sizes[2])` so voxel `(i, j, k)` is
//! the `i`-th sample along the first axis.

use std::{
    collections::HashMap,
    io::{self, BufRead, Read, Write},
    str::FromStr,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bzip2::read::BzDecoder;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use ndarray::{Array3, ShapeBuilder};

use crate::storage::volume::{ElementType, Geometry, Volume, VolumeData, with_array};

const MAGIC_PREFIX: &str = "NRRD000";

/// Errors that can occur when decoding an NRRD stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading from the underlying stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The stream does not start with an NRRD magic line.
    #[error("missing NRRD magic line")]
    MissingMagic,

    /// A required header field is absent.
    #[error("missing required header field '{0}'")]
    MissingField(&'static str),

    /// A header field has a value that cannot be parsed.
    #[error("invalid value '{value}' for header field '{field}'")]
    InvalidField {
        /// Name of the field.
        field: String,
        /// The offending value.
        value: String,
    },

    /// The file uses a feature this reader does not handle.
    #[error("unsupported NRRD feature: {0}")]
    Unsupported(String),

    /// The data section holds fewer samples than the header announces.
    #[error("expected {expected} samples but the data section holds {found}")]
    Truncated {
        /// Number of samples announced by `sizes`.
        expected: usize,
        /// Number of complete samples found.
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Raw,
    Text,
    Gzip,
    Bzip2,
}

impl Encoding {
    const fn is_binary(self) -> bool {
        !matches!(self, Self::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

#[derive(Debug)]
struct Header {
    element_type: ElementType,
    sizes: [usize; 3],
    encoding: Encoding,
    endian: Option<Endian>,
    geometry: Geometry,
}

impl Header {
    fn sample_count(&self) -> Option<usize> {
        self.sizes
            .iter()
            .try_fold(1_usize, |count, &size| count.checked_mul(size))
    }
}

/// Reads a volume from an NRRD stream.
///
/// # Errors
///
/// Returns an error if the stream is not a three-dimensional NRRD volume with
/// attached data in a supported encoding, or if the data section is
/// incomplete.
pub fn read<R: BufRead>(reader: &mut R) -> Result<Volume, Error> {
    let header = read_header(reader)?;
    let data = match header.element_type {
        ElementType::U8 => read_samples::<u8, _>(reader, &header)?,
        ElementType::I8 => read_samples::<i8, _>(reader, &header)?,
        ElementType::U16 => read_samples::<u16, _>(reader, &header)?,
        ElementType::I16 => read_samples::<i16, _>(reader, &header)?,
        ElementType::U32 => read_samples::<u32, _>(reader, &header)?,
        ElementType::I32 => read_samples::<i32, _>(reader, &header)?,
        ElementType::U64 => read_samples::<u64, _>(reader, &header)?,
        ElementType::I64 => read_samples::<i64, _>(reader, &header)?,
        ElementType::F32 => read_samples::<f32, _>(reader, &header)?,
        ElementType::F64 => read_samples::<f64, _>(reader, &header)?,
    };
    Ok(Volume::new(data, header.geometry))
}

/// Writes a volume as an NRRD stream with gzip-compressed little-endian data.
///
/// # Errors
///
/// Returns an error if writing to the stream fails.
pub fn write<W: Write>(volume: &Volume, writer: &mut W) -> io::Result<()> {
    let geometry = volume.geometry();
    let [x, y, z] = volume.shape();

    writeln!(writer, "NRRD0004")?;
    writeln!(writer, "# Complete NRRD file format specification at:")?;
    writeln!(writer, "# http://teem.sourceforge.net/nrrd/format.html")?;
    writeln!(writer, "type: {}", type_name(volume.element_type()))?;
    writeln!(writer, "dimension: 3")?;
    match &geometry.space {
        Some(space) => writeln!(writer, "space: {space}")?,
        None => writeln!(writer, "space dimension: 3")?,
    }
    writeln!(writer, "sizes: {x} {y} {z}")?;
    let directions: Vec<String> = geometry
        .space_directions
        .iter()
        .map(format_vector)
        .collect();
    writeln!(writer, "space directions: {}", directions.join(" "))?;
    writeln!(writer, "kinds: domain domain domain")?;
    writeln!(writer, "endian: little")?;
    writeln!(writer, "encoding: gzip")?;
    writeln!(writer, "space origin: {}", format_vector(&geometry.space_origin))?;
    writeln!(writer)?;

    let mut encoder = GzEncoder::new(writer, Compression::default());
    with_array!(volume.data(), array => {
        // reversing the axes yields the first axis fastest
        let samples: Vec<_> = array.t().iter().copied().collect();
        encoder.write_all(&Sample::encode(samples.as_slice()))
    })?;
    encoder.finish()?;
    Ok(())
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<Header, Error> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if !line.trim_end().starts_with(MAGIC_PREFIX) {
        return Err(Error::MissingMagic);
    }

    let mut fields = HashMap::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let entry = line.trim_end_matches(['\r', '\n']);
        if entry.is_empty() {
            break;
        }
        if entry.starts_with('#') || entry.contains(":=") {
            continue;
        }
        let (field, value) = entry
            .split_once(": ")
            .ok_or_else(|| invalid("header line", entry))?;
        fields.insert(field.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    parse_header(&fields)
}

fn parse_header(fields: &HashMap<String, String>) -> Result<Header, Error> {
    let get = |name: &'static str| fields.get(name).ok_or(Error::MissingField(name));

    if fields.contains_key("data file") || fields.contains_key("datafile") {
        return Err(Error::Unsupported("detached data files".to_string()));
    }

    let type_field = get("type")?;
    let element_type = parse_type(type_field).ok_or_else(|| invalid("type", type_field))?;

    let dimension = get("dimension")?;
    if dimension != "3" {
        return Err(Error::Unsupported(format!("{dimension}-dimensional volumes")));
    }

    let sizes_field = get("sizes")?;
    let sizes = parse_numbers::<usize>(sizes_field)
        .and_then(|sizes| <[usize; 3]>::try_from(sizes).ok())
        .ok_or_else(|| invalid("sizes", sizes_field))?;

    let encoding = match get("encoding")?.as_str() {
        "raw" => Encoding::Raw,
        "txt" | "text" | "ascii" => Encoding::Text,
        "gz" | "gzip" => Encoding::Gzip,
        "bz2" | "bzip2" => Encoding::Bzip2,
        other => return Err(Error::Unsupported(format!("'{other}' encoding"))),
    };

    let endian = match fields.get("endian").map(String::as_str) {
        None => None,
        Some("little") => Some(Endian::Little),
        Some("big") => Some(Endian::Big),
        Some(other) => return Err(invalid("endian", other)),
    };
    if encoding.is_binary() && element_type.size() > 1 && endian.is_none() {
        return Err(Error::MissingField("endian"));
    }

    let geometry = parse_geometry(fields)?;

    Ok(Header {
        element_type,
        sizes,
        encoding,
        endian,
        geometry,
    })
}

fn parse_geometry(fields: &HashMap<String, String>) -> Result<Geometry, Error> {
    let mut geometry = Geometry::default();

    if let Some(directions) = fields.get("space directions") {
        let vectors: Vec<[f64; 3]> = directions
            .split(')')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(parse_vector)
            .collect::<Option<_>>()
            .ok_or_else(|| invalid("space directions", directions))?;
        geometry.space_directions = vectors
            .try_into()
            .map_err(|_| invalid("space directions", directions))?;
    } else if let Some(spacings) = fields.get("spacings") {
        let spacing = parse_numbers::<f64>(spacings)
            .and_then(|values| <[f64; 3]>::try_from(values).ok())
            .ok_or_else(|| invalid("spacings", spacings))?;
        geometry = Geometry::from_spacing(spacing, [0.0; 3]);
    }

    if let Some(origin) = fields.get("space origin") {
        geometry.space_origin = parse_vector(origin.trim_end_matches(')'))
            .ok_or_else(|| invalid("space origin", origin))?;
    }

    geometry.space = fields.get("space").cloned();
    Ok(geometry)
}

/// Parses `(a,b,c` (the closing parenthesis already stripped).
fn parse_vector(token: &str) -> Option<[f64; 3]> {
    let inner = token.trim().strip_prefix('(')?;
    let components = inner
        .split(',')
        .map(|component| component.trim().parse().ok())
        .collect::<Option<Vec<f64>>>()?;
    components.try_into().ok()
}

fn parse_numbers<T: FromStr>(value: &str) -> Option<Vec<T>> {
    value
        .split_whitespace()
        .map(|token| token.parse().ok())
        .collect()
}

fn parse_type(name: &str) -> Option<ElementType> {
    let element_type = match name {
        "uchar" | "unsigned char" | "uint8" | "uint8_t" => ElementType::U8,
        "signed char" | "int8" | "int8_t" => ElementType::I8,
        "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
            ElementType::U16
        }
        "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
            ElementType::I16
        }
        "uint" | "unsigned int" | "uint32" | "uint32_t" => ElementType::U32,
        "int" | "signed int" | "int32" | "int32_t" => ElementType::I32,
        "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64" | "uint64_t" => {
            ElementType::U64
        }
        "longlong" | "long long" | "long long int" | "signed long long"
        | "signed long long int" | "int64" | "int64_t" => ElementType::I64,
        "float" => ElementType::F32,
        "double" => ElementType::F64,
        _ => return None,
    };
    Some(element_type)
}

const fn type_name(element_type: ElementType) -> &'static str {
    match element_type {
        ElementType::U8 => "uint8",
        ElementType::I8 => "int8",
        ElementType::U16 => "uint16",
        ElementType::I16 => "int16",
        ElementType::U32 => "uint32",
        ElementType::I32 => "int32",
        ElementType::U64 => "uint64",
        ElementType::I64 => "int64",
        ElementType::F32 => "float",
        ElementType::F64 => "double",
    }
}

fn format_vector(vector: &[f64; 3]) -> String {
    format!("({},{},{})", vector[0], vector[1], vector[2])
}

fn invalid(field: &str, value: &str) -> Error {
    Error::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn read_samples<T, R>(reader: &mut R, header: &Header) -> Result<VolumeData, Error>
where
    T: Sample,
    R: BufRead,
{
    let [x, y, z] = header.sizes;
    let too_large = || invalid("sizes", &format!("{x} {y} {z}"));
    let expected = header.sample_count().ok_or_else(too_large)?;
    let byte_len = expected
        .checked_mul(size_of::<T>())
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(too_large)?;

    let samples = match header.encoding {
        Encoding::Raw => decode_binary::<T, _>(reader.take(byte_len), header, expected)?,
        Encoding::Gzip => {
            decode_binary::<T, _>(GzDecoder::new(reader).take(byte_len), header, expected)?
        }
        Encoding::Bzip2 => {
            decode_binary::<T, _>(BzDecoder::new(reader).take(byte_len), header, expected)?
        }
        Encoding::Text => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            let samples = text
                .split_whitespace()
                .take(expected)
                .map(|token| token.parse().map_err(|_| invalid("data", token)))
                .collect::<Result<Vec<T>, _>>()?;
            if samples.len() < expected {
                return Err(Error::Truncated {
                    expected,
                    found: samples.len(),
                });
            }
            samples
        }
    };

    let array = Array3::from_shape_vec((x, y, z).f(), samples)
        .map_err(|e| Error::Unsupported(e.to_string()))?;
    Ok(T::wrap(array))
}

/// Decodes at most `expected` samples from a (possibly decompressing) stream
/// already limited to the announced byte length.
fn decode_binary<T, R>(mut reader: R, header: &Header, expected: usize) -> Result<Vec<T>, Error>
where
    T: Sample,
    R: Read,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let found = bytes.len() / size_of::<T>();
    if found < expected {
        return Err(Error::Truncated { expected, found });
    }
    Ok(match header.endian.unwrap_or(Endian::Little) {
        Endian::Little => T::decode::<LittleEndian>(&bytes),
        Endian::Big => T::decode::<BigEndian>(&bytes),
    })
}

/// A numeric type that can be stored in an NRRD data section.
trait Sample: Copy + FromStr + Sized {
    fn decode<B: ByteOrder>(bytes: &[u8]) -> Vec<Self>;
    fn encode(samples: &[Self]) -> Vec<u8>;
    fn wrap(array: Array3<Self>) -> VolumeData;
}

impl Sample for u8 {
    fn decode<B: ByteOrder>(bytes: &[u8]) -> Vec<Self> {
        bytes.to_vec()
    }

    fn encode(samples: &[Self]) -> Vec<u8> {
        samples.to_vec()
    }

    fn wrap(array: Array3<Self>) -> VolumeData {
        VolumeData::U8(array)
    }
}

impl Sample for i8 {
    fn decode<B: ByteOrder>(bytes: &[u8]) -> Vec<Self> {
        bytes.iter().map(|&byte| Self::from_le_bytes([byte])).collect()
    }

    fn encode(samples: &[Self]) -> Vec<u8> {
        samples.iter().map(|sample| sample.to_le_bytes()[0]).collect()
    }

    fn wrap(array: Array3<Self>) -> VolumeData {
        VolumeData::I8(array)
    }
}

macro_rules! impl_sample {
    ($($ty:ty => $variant:ident, $read:ident, $write:ident);* $(;)?) => {
        $(
            impl Sample for $ty {
                fn decode<B: ByteOrder>(bytes: &[u8]) -> Vec<Self> {
                    let mut samples = vec![<$ty>::default(); bytes.len() / size_of::<$ty>()];
                    B::$read(bytes, &mut samples);
                    samples
                }

                fn encode(samples: &[Self]) -> Vec<u8> {
                    let mut bytes = vec![0; samples.len() * size_of::<$ty>()];
                    LittleEndian::$write(samples, &mut bytes);
                    bytes
                }

                fn wrap(array: Array3<Self>) -> VolumeData {
                    VolumeData::$variant(array)
                }
            }
        )*
    };
}

impl_sample!(
    u16 => U16, read_u16_into, write_u16_into;
    i16 => I16, read_i16_into, write_i16_into;
    u32 => U32, read_u32_into, write_u32_into;
    i32 => I32, read_i32_into, write_i32_into;
    u64 => U64, read_u64_into, write_u64_into;
    i64 => I64, read_i64_into, write_i64_into;
    f32 => F32, read_f32_into, write_f32_into;
    f64 => F64, read_f64_into, write_f64_into;
);
