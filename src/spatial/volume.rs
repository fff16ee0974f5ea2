//! Volume container pairing voxel data with its on-disk element type
//!
//! Filters always work on `f64` voxels. The element type read from disk is
//! carried alongside so that both pipeline outputs can be converted back to it.

use ndarray::Array3;
use num_traits::{Bounded, NumCast, ToPrimitive};

/// Element type of a volume as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoxelType {
    /// Unsigned 8-bit integers
    U8,
    /// Unsigned 16-bit integers
    U16,
    /// 32-bit floats
    F32,
}

impl VoxelType {
    /// Largest representable value, used as the intensity rescale target
    pub const fn max_value(self) -> f64 {
        match self {
            Self::U8 => u8::MAX as f64,
            Self::U16 => u16::MAX as f64,
            Self::F32 => 1.0,
        }
    }

    /// Convert a working value into the range and precision of this type
    pub fn quantize(self, value: f64) -> f64 {
        match self {
            Self::U8 => saturate::<u8>(value),
            Self::U16 => saturate::<u16>(value),
            Self::F32 => <f32 as NumCast>::from(value).map_or(0.0, <f64 as From<f32>>::from),
        }
    }
}

// Floors and clamps into T, mapping NaN to zero
fn saturate<T: Bounded + ToPrimitive>(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let low = T::min_value().to_f64().unwrap_or(0.0);
    let high = T::max_value().to_f64().unwrap_or(0.0);
    value.floor().clamp(low, high)
}

/// A 3D voxel volume with axis order `(z, y, x)`
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array3<f64>,
    voxel_type: VoxelType,
}

impl Volume {
    /// Wrap voxel data with the element type it was read as
    pub const fn new(data: Array3<f64>, voxel_type: VoxelType) -> Self {
        Self { data, voxel_type }
    }

    /// Voxel data
    pub const fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Mutable voxel data
    pub const fn data_mut(&mut self) -> &mut Array3<f64> {
        &mut self.data
    }

    /// Consume the volume and return its voxel data
    pub fn into_data(self) -> Array3<f64> {
        self.data
    }

    /// Element type the volume will be written as
    pub const fn voxel_type(&self) -> VoxelType {
        self.voxel_type
    }

    /// Shape as `(depth, height, width)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Replace the voxel data, keeping the element type
    #[must_use]
    pub fn with_data(self, data: Array3<f64>) -> Self {
        Self::new(data, self.voxel_type)
    }

    /// Clamp and round every voxel into `voxel_type` and adopt it
    #[must_use]
    pub fn restore_type(mut self, voxel_type: VoxelType) -> Self {
        self.data.mapv_inplace(|v| voxel_type.quantize(v));
        self.voxel_type = voxel_type;
        self
    }

    /// Number of voxels with a value above zero
    pub fn count_positive(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0.0).count()
    }
}
