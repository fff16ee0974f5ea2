//! Trilinear resampling between volume shapes

use ndarray::Array3;

use crate::io::error::{Result, invalid_parameter};

/// Shape obtained by scaling every axis by `factor`, never smaller than one voxel
pub fn zoomed_shape(shape: (usize, usize, usize), factor: f64) -> (usize, usize, usize) {
    let scale = |n: usize| ((n as f64 * factor).round() as usize).max(1);
    (scale(shape.0), scale(shape.1), scale(shape.2))
}

/// Resample a volume by a uniform factor
///
/// # Errors
///
/// Returns an error if `factor` is not a finite positive number
pub fn zoom(data: &Array3<f64>, factor: f64) -> Result<Array3<f64>> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(invalid_parameter(
            "zoom_factor",
            &factor,
            &"must be a finite number greater than zero",
        ));
    }
    Ok(resample(data, zoomed_shape(data.dim(), factor)))
}

/// Trilinearly resample `data` onto `shape`
///
/// Corner voxels of source and target grids are aligned, so a resample down
/// followed by a resample back to the original shape reproduces the original
/// extent exactly.
pub fn resample(data: &Array3<f64>, shape: (usize, usize, usize)) -> Array3<f64> {
    let source = data.dim();
    if source == shape {
        return data.clone();
    }
    if source.0 == 0 || source.1 == 0 || source.2 == 0 {
        return Array3::zeros(shape);
    }

    let z_axis = axis_samples(source.0, shape.0);
    let y_axis = axis_samples(source.1, shape.1);
    let x_axis = axis_samples(source.2, shape.2);

    let at = |z: usize, y: usize, x: usize| data.get((z, y, x)).copied().unwrap_or(0.0);

    Array3::from_shape_fn(shape, |(z, y, x)| {
        let (z0, z1, wz) = z_axis.get(z).copied().unwrap_or((0, 0, 0.0));
        let (y0, y1, wy) = y_axis.get(y).copied().unwrap_or((0, 0, 0.0));
        let (x0, x1, wx) = x_axis.get(x).copied().unwrap_or((0, 0, 0.0));

        let lerp = |a: f64, b: f64, w: f64| (b - a).mul_add(w, a);
        let c00 = lerp(at(z0, y0, x0), at(z0, y0, x1), wx);
        let c01 = lerp(at(z0, y1, x0), at(z0, y1, x1), wx);
        let c10 = lerp(at(z1, y0, x0), at(z1, y0, x1), wx);
        let c11 = lerp(at(z1, y1, x0), at(z1, y1, x1), wx);
        lerp(lerp(c00, c01, wy), lerp(c10, c11, wy), wz)
    })
}

// For each target index: lower source index, upper source index, upper weight
fn axis_samples(source_len: usize, target_len: usize) -> Vec<(usize, usize, f64)> {
    let last = source_len.saturating_sub(1);
    let step = if target_len > 1 {
        last as f64 / (target_len - 1) as f64
    } else {
        0.0
    };

    (0..target_len)
        .map(|i| {
            let position = i as f64 * step;
            let lower = (position.floor() as usize).min(last);
            let upper = (lower + 1).min(last);
            (lower, upper, position - lower as f64)
        })
        .collect()
}
