//! Numerical volume filters used by the pipeline stages

/// Euclidean distance transform
pub mod distance;
/// Gaussian smoothing and shared border handling
pub mod gaussian;
/// Floor, rescale and segmentation of the final volume
pub mod intensity;
/// Median filtering
pub mod median;
/// Distance field diffusion and the distance-based stage
pub mod smoothing;
/// Fixed and Otsu thresholding
pub mod threshold;
