//! Iterative smoothing of distance fields and the distance-based stage

use ndarray::Array3;

use crate::filters::distance::{distance_transform, foreground_mask};
use crate::filters::threshold::otsu_threshold;
use crate::io::configuration::{
    DISTANCE_FOREGROUND_VALUE, DISTANCE_GRID_SPACING, FIELD_DIFFUSION_RATE,
};

/// Explicit 6-neighbour diffusion of a scalar field
///
/// Each iteration moves every voxel towards the mean of its face neighbours
/// by [`FIELD_DIFFUSION_RATE`] times the discrete Laplacian. Borders replicate
/// the edge voxel, so a constant field is a fixed point.
pub fn diffuse_field(field: &Array3<f64>, iterations: usize) -> Array3<f64> {
    let (depth, height, width) = field.dim();
    let mut current = field.clone();

    for _ in 0..iterations {
        let previous = current.clone();
        let at = |z: usize, y: usize, x: usize| previous.get((z, y, x)).copied().unwrap_or(0.0);

        for ((z, y, x), value) in current.indexed_iter_mut() {
            let centre = at(z, y, x);
            let neighbours = [
                at(z.saturating_sub(1), y, x),
                at((z + 1).min(depth - 1), y, x),
                at(z, y.saturating_sub(1), x),
                at(z, (y + 1).min(height - 1), x),
                at(z, y, x.saturating_sub(1)),
                at(z, y, (x + 1).min(width - 1)),
            ];
            let laplacian: f64 = neighbours.iter().map(|n| n - centre).sum();
            *value = FIELD_DIFFUSION_RATE.mul_add(laplacian, centre);
        }
    }

    current
}

/// Binarise a smoothed distance field of the volume's foreground
///
/// The distance from each non-zero voxel to the background is diffused for
/// `iterations` steps; voxels above the field's Otsu threshold become
/// [`DISTANCE_FOREGROUND_VALUE`] and everything else zero. A volume without
/// foreground comes back all zero.
pub fn distance_smoothing(data: &Array3<f64>, iterations: usize) -> Array3<f64> {
    if foreground_mask(data).not_any() {
        return Array3::zeros(data.dim());
    }

    let distance = distance_transform(data, DISTANCE_GRID_SPACING);
    let smoothed = diffuse_field(&distance, iterations);
    let threshold = otsu_threshold(smoothed.iter());

    smoothed.mapv(|v| {
        if v > threshold {
            DISTANCE_FOREGROUND_VALUE
        } else {
            0.0
        }
    })
}
