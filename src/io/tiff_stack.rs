//! Multi-page TIFF volumes: one greyscale page per z slice

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array3, Axis};
use num_traits::NumCast;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{TiffEncoder, colortype};

use crate::io::error::{PreprocessError, Result, file_system_error};
use crate::spatial::{Volume, VoxelType};

fn tiff_error(path: &Path) -> impl FnOnce(tiff::TiffError) -> PreprocessError + '_ {
    move |source| PreprocessError::Tiff {
        path: path.to_path_buf(),
        source,
    }
}

fn malformed(path: &Path, reason: impl Into<String>) -> PreprocessError {
    PreprocessError::MalformedVolume {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

// Samples per pixel for colour types that can be reduced to grey
const fn channel_count(color: ColorType) -> Option<usize> {
    match color {
        ColorType::Gray(_) => Some(1),
        ColorType::GrayA(_) => Some(2),
        ColorType::RGB(_) => Some(3),
        ColorType::RGBA(_) => Some(4),
        _ => None,
    }
}

// Per-pixel maximum over interleaved channels
fn reduce_channels(samples: Vec<f64>, channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels)
        .map(|pixel| pixel.iter().copied().fold(f64::MIN, f64::max))
        .collect()
}

/// Read a multi-page TIFF into a volume
///
/// Pages become z slices. 8-bit and 16-bit unsigned and 32-bit float samples
/// are supported; colour pages are reduced to their per-pixel channel maximum.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or decoded
/// - A page uses an unsupported colour type or sample format
/// - Pages differ in size or sample format
pub fn read_tiff_stack(path: &Path) -> Result<Volume> {
    let file = File::open(path).map_err(|e| file_system_error(path, "open", e))?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(tiff_error(path))?
        .with_limits(Limits::unlimited());

    let mut slices: Vec<f64> = Vec::new();
    let mut page_shape: Option<(usize, usize)> = None;
    let mut voxel_type: Option<VoxelType> = None;
    let mut depth = 0usize;

    loop {
        let (width, height) = decoder.dimensions().map_err(tiff_error(path))?;
        let (width, height) = (width as usize, height as usize);
        let color = decoder.colortype().map_err(tiff_error(path))?;
        let channels = channel_count(color)
            .ok_or_else(|| malformed(path, format!("unsupported colour type {color:?}")))?;

        let (samples, page_type): (Vec<f64>, VoxelType) =
            match decoder.read_image().map_err(tiff_error(path))? {
                DecodingResult::U8(buf) => (
                    buf.into_iter().map(<f64 as From<u8>>::from).collect(),
                    VoxelType::U8,
                ),
                DecodingResult::U16(buf) => {
                    (
                        buf.into_iter().map(<f64 as From<u16>>::from).collect(),
                        VoxelType::U16,
                    )
                }
                DecodingResult::F32(buf) => {
                    (
                        buf.into_iter().map(<f64 as From<f32>>::from).collect(),
                        VoxelType::F32,
                    )
                }
                _ => return Err(malformed(path, "unsupported sample format")),
            };

        let pixels = reduce_channels(samples, channels);
        if pixels.len() != width * height {
            return Err(malformed(
                path,
                format!(
                    "page {depth} holds {} pixels, expected {width}x{height}",
                    pixels.len()
                ),
            ));
        }

        match page_shape {
            Some(shape) if shape != (height, width) => {
                return Err(malformed(
                    path,
                    format!("page {depth} is {width}x{height}, earlier pages differ"),
                ));
            }
            _ => page_shape = Some((height, width)),
        }
        match voxel_type {
            Some(existing) if existing != page_type => {
                return Err(malformed(path, format!("page {depth} changes sample format")));
            }
            _ => voxel_type = Some(page_type),
        }

        slices.extend(pixels);
        depth += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(tiff_error(path))?;
    }

    let (height, width) = page_shape.unwrap_or((0, 0));
    let data = Array3::from_shape_vec((depth, height, width), slices)
        .map_err(|e| malformed(path, e.to_string()))?;
    Ok(Volume::new(data, voxel_type.unwrap_or(VoxelType::U8)))
}

// Slice z of the volume converted to the sample type T
fn slice_samples<T: NumCast + Default>(volume: &Volume, z: usize) -> Vec<T> {
    let voxel_type = volume.voxel_type();
    volume
        .data()
        .index_axis(Axis(0), z)
        .iter()
        .map(|&v| T::from(voxel_type.quantize(v)).unwrap_or_default())
        .collect()
}

/// Write a volume as a multi-page TIFF in its own element type
///
/// Values are clamped into the element type before encoding.
///
/// # Errors
///
/// Returns an error if:
/// - The volume has no voxels
/// - The parent directory or file cannot be created
/// - Encoding fails
pub fn write_tiff_stack(path: &Path, volume: &Volume) -> Result<()> {
    let (depth, height, width) = volume.shape();
    if depth == 0 || height == 0 || width == 0 {
        return Err(malformed(path, "cannot write a volume without voxels"));
    }
    let too_large = |e: std::num::TryFromIntError| {
        malformed(path, format!("slice dimensions exceed TIFF limits: {e}"))
    };
    let page_width = u32::try_from(width).map_err(too_large)?;
    let page_height = u32::try_from(height).map_err(too_large)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| file_system_error(parent, "create directory", e))?;
    }

    let file = File::create(path).map_err(|e| file_system_error(path, "create", e))?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(tiff_error(path))?;

    for z in 0..depth {
        let written = match volume.voxel_type() {
            VoxelType::U8 => encoder.write_image::<colortype::Gray8>(
                page_width,
                page_height,
                &slice_samples::<u8>(volume, z),
            ),
            VoxelType::U16 => encoder.write_image::<colortype::Gray16>(
                page_width,
                page_height,
                &slice_samples::<u16>(volume, z),
            ),
            VoxelType::F32 => encoder.write_image::<colortype::Gray32Float>(
                page_width,
                page_height,
                &slice_samples::<f32>(volume, z),
            ),
        };
        written.map_err(tiff_error(path))?;
    }

    Ok(())
}
