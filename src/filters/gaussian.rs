//! Separable 3D Gaussian smoothing

use ndarray::{Array3, Axis};

use crate::io::configuration::GAUSSIAN_TRUNCATE;

/// Normalised 1D Gaussian kernel truncated at [`GAUSSIAN_TRUNCATE`] sigma
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5).floor() as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Map a possibly out-of-range index onto `0..len` by half-sample mirroring
///
/// `-1` maps to `0`, `len` maps to `len - 1`, and so on.
pub fn reflect_index(index: isize, len: usize) -> usize {
    let n = len as isize;
    if n <= 1 {
        return 0;
    }
    let period = 2 * n;
    let wrapped = index.rem_euclid(period);
    let mirrored = if wrapped < n {
        wrapped
    } else {
        period - 1 - wrapped
    };
    mirrored as usize
}

/// Convolve every lane along `axis` with `kernel`, mirroring at the borders
pub fn convolve_axis(data: &mut Array3<f64>, axis: Axis, kernel: &[f64]) {
    let radius = (kernel.len() / 2) as isize;
    let mut line = Vec::new();

    for mut lane in data.lanes_mut(axis) {
        line.clear();
        line.extend(lane.iter().copied());
        let len = line.len();

        for (i, out) in lane.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let source = reflect_index(i as isize + k as isize - radius, len);
                    w * line.get(source).copied().unwrap_or(0.0)
                })
                .sum();
        }
    }
}

/// Smooth a volume with an isotropic Gaussian of standard deviation `sigma`
///
/// Non-positive sigma returns the input unchanged.
pub fn gaussian_filter(data: &Array3<f64>, sigma: f64) -> Array3<f64> {
    let mut smoothed = data.clone();
    if sigma <= 0.0 || !sigma.is_finite() {
        return smoothed;
    }

    let kernel = gaussian_kernel(sigma);
    for axis in 0..3 {
        convolve_axis(&mut smoothed, Axis(axis), &kernel);
    }
    smoothed
}
