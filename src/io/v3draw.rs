//! Vaa3D raw image stacks (`.v3draw`)
//!
//! Layout: the 24-byte magic string, one endianness byte (`L` or `B`), a
//! 2-byte datatype code (1 = u8, 2 = u16, 4 = f32), four sizes
//! `[x, y, z, channels]`, then samples ordered channel, z, y, x with x
//! fastest. Sizes are 4 bytes wide in current files and 2 bytes wide in
//! files written by older Vaa3D releases; the width is inferred from the file
//! length.

use std::path::Path;

use ndarray::Array3;

use crate::io::error::{PreprocessError, Result, file_system_error};
use crate::spatial::{Volume, VoxelType};

/// Magic string opening every Vaa3D raw file
pub const V3DRAW_MAGIC: &[u8] = b"raw_image_stack_by_hpeng";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }

    fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    fn f32(self, bytes: [u8; 4]) -> f32 {
        match self {
            Self::Little => f32::from_le_bytes(bytes),
            Self::Big => f32::from_be_bytes(bytes),
        }
    }
}

const fn datatype_code(voxel_type: VoxelType) -> u16 {
    match voxel_type {
        VoxelType::U8 => 1,
        VoxelType::U16 => 2,
        VoxelType::F32 => 4,
    }
}

const fn voxel_type_for(code: u16) -> Option<VoxelType> {
    match code {
        1 => Some(VoxelType::U8),
        2 => Some(VoxelType::U16),
        4 => Some(VoxelType::F32),
        _ => None,
    }
}

const fn bytes_per_sample(voxel_type: VoxelType) -> usize {
    match voxel_type {
        VoxelType::U8 => 1,
        VoxelType::U16 => 2,
        VoxelType::F32 => 4,
    }
}

fn malformed(path: &Path, reason: impl Into<String>) -> PreprocessError {
    PreprocessError::MalformedVolume {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn array<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    bytes.get(offset..offset + N)?.try_into().ok()
}

/// Decode a Vaa3D raw stack held in memory
///
/// Multi-channel stacks are reduced to the per-voxel channel maximum.
///
/// # Errors
///
/// Returns an error if the header is not recognised or the sample count does
/// not match the declared sizes
pub fn decode_v3draw(bytes: &[u8], path: &Path) -> Result<Volume> {
    if !bytes.starts_with(V3DRAW_MAGIC) {
        return Err(malformed(path, "missing Vaa3D raw magic string"));
    }
    let mut offset = V3DRAW_MAGIC.len();

    let endian = match bytes.get(offset) {
        Some(b'L') => Endian::Little,
        Some(b'B') => Endian::Big,
        _ => return Err(malformed(path, "unknown endianness marker")),
    };
    offset += 1;

    let code = array::<2>(bytes, offset)
        .map(|b| endian.u16(b))
        .ok_or_else(|| malformed(path, "truncated header"))?;
    let voxel_type = voxel_type_for(code)
        .ok_or_else(|| malformed(path, format!("unsupported datatype code {code}")))?;
    offset += 2;

    let sample_size = bytes_per_sample(voxel_type);
    let read_sizes = |width: usize| -> Option<[usize; 4]> {
        let mut sizes = [0usize; 4];
        for (i, size) in sizes.iter_mut().enumerate() {
            let at = offset + i * width;
            *size = if width == 4 {
                endian.u32(array::<4>(bytes, at)?) as usize
            } else {
                endian.u16(array::<2>(bytes, at)?) as usize
            };
        }
        Some(sizes)
    };
    let fits = |sizes: &[usize; 4], width: usize| {
        sizes
            .iter()
            .try_fold(sample_size, |acc, &s| acc.checked_mul(s))
            .and_then(|payload| payload.checked_add(offset + 4 * width))
            == Some(bytes.len())
    };

    let (sizes, size_width) = [4usize, 2]
        .into_iter()
        .find_map(|width| read_sizes(width).filter(|s| fits(s, width)).map(|s| (s, width)))
        .ok_or_else(|| malformed(path, "sample count does not match declared sizes"))?;
    offset += 4 * size_width;

    let [width, height, depth, channels] = sizes;
    let channel_len = width * height * depth;

    let samples: Vec<f64> = bytes
        .get(offset..)
        .unwrap_or_default()
        .chunks_exact(sample_size)
        .map(|chunk| match voxel_type {
            VoxelType::U8 => chunk.first().copied().map_or(0.0, f64::from),
            VoxelType::U16 => array::<2>(chunk, 0).map_or(0.0, |b| f64::from(endian.u16(b))),
            VoxelType::F32 => array::<4>(chunk, 0).map_or(0.0, |b| f64::from(endian.f32(b))),
        })
        .collect();

    let mut merged = samples.get(..channel_len).unwrap_or_default().to_vec();
    for channel in samples.chunks_exact(channel_len.max(1)).skip(1).take(channels) {
        for (dst, &src) in merged.iter_mut().zip(channel) {
            *dst = dst.max(src);
        }
    }

    let data = Array3::from_shape_vec((depth, height, width), merged)
        .map_err(|e| malformed(path, e.to_string()))?;
    Ok(Volume::new(data, voxel_type))
}

/// Encode a volume as a single-channel little-endian Vaa3D raw stack
pub fn encode_v3draw(volume: &Volume) -> Vec<u8> {
    let (depth, height, width) = volume.shape();
    let voxel_type = volume.voxel_type();

    let mut bytes = Vec::with_capacity(
        V3DRAW_MAGIC.len() + 19 + volume.data().len() * bytes_per_sample(voxel_type),
    );
    bytes.extend_from_slice(V3DRAW_MAGIC);
    bytes.push(b'L');
    bytes.extend_from_slice(&datatype_code(voxel_type).to_le_bytes());
    for size in [width, height, depth, 1] {
        bytes.extend_from_slice(&(size as u32).to_le_bytes());
    }

    for &v in volume.data() {
        let v = voxel_type.quantize(v);
        match voxel_type {
            VoxelType::U8 => bytes.push(v as u8),
            VoxelType::U16 => bytes.extend_from_slice(&(v as u16).to_le_bytes()),
            VoxelType::F32 => bytes.extend_from_slice(&(v as f32).to_le_bytes()),
        }
    }
    bytes
}

/// Read a Vaa3D raw stack from disk
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid stack
pub fn read_v3draw(path: &Path) -> Result<Volume> {
    let bytes = std::fs::read(path).map_err(|e| file_system_error(path, "read", e))?;
    decode_v3draw(&bytes, path)
}

/// Write a volume as a Vaa3D raw stack
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn write_v3draw(path: &Path, volume: &Volume) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| file_system_error(parent, "create directory", e))?;
    }
    std::fs::write(path, encode_v3draw(volume)).map_err(|e| file_system_error(path, "write", e))
}
