//! Cubic-window median filtering

use ndarray::Array3;

use crate::filters::gaussian::reflect_index;
use crate::io::error::{Result, invalid_parameter};

/// Convert a (possibly fractional) window size into a voxel count
///
/// # Errors
///
/// Returns an error if the floored size is smaller than one voxel
pub fn window_size(size: f64) -> Result<usize> {
    if !size.is_finite() || size < 1.0 {
        return Err(invalid_parameter(
            "median_size",
            &size,
            &"window must span at least one voxel",
        ));
    }
    Ok(size.floor() as usize)
}

/// Median filter with an isotropic `size`³ window and mirrored borders
///
/// For even sizes the window extends one voxel further towards lower
/// indices, and the upper median is taken.
///
/// # Errors
///
/// Returns an error if `size` is smaller than one voxel
pub fn median_filter(data: &Array3<f64>, size: f64) -> Result<Array3<f64>> {
    let size = window_size(size)?;
    if size == 1 {
        return Ok(data.clone());
    }

    let (depth, height, width) = data.dim();
    let low = (size / 2) as isize;
    let offsets: Vec<isize> = (0..size as isize).map(|o| o - low).collect();
    let mut window = Vec::with_capacity(size * size * size);

    let filtered = Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
        window.clear();
        for &dz in &offsets {
            let sz = reflect_index(z as isize + dz, depth);
            for &dy in &offsets {
                let sy = reflect_index(y as isize + dy, height);
                for &dx in &offsets {
                    let sx = reflect_index(x as isize + dx, width);
                    if let Some(&v) = data.get((sz, sy, sx)) {
                        window.push(v);
                    }
                }
            }
        }

        let rank = window.len() / 2;
        if rank >= window.len() {
            return 0.0;
        }
        let (_, median, _) = window.select_nth_unstable_by(rank, f64::total_cmp);
        *median
    });

    Ok(filtered)
}
