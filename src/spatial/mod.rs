//! Volume data structures and resampling

/// Volume container and element types
pub mod volume;
/// Trilinear zoom between shapes
pub mod zoom;

pub use volume::{Volume, VoxelType};
