//! Exact Euclidean distance transform of a binary foreground
//!
//! Uses the separable lower-envelope algorithm of Felzenszwalb and
//! Huttenlocher: one squared-distance pass per axis, each linear in the
//! lane length. Everything outside the volume counts as background, so every
//! foreground voxel has a finite distance.

use bitvec::vec::BitVec;
use ndarray::{Array3, Axis, s};

// Finite stand-in for infinity; far beyond any squared voxel distance
const FAR: f64 = 1e20;

/// Foreground mask of all voxels with a non-zero value, in standard order
pub fn foreground_mask(data: &Array3<f64>) -> BitVec {
    data.iter().map(|&v| v != 0.0).collect()
}

/// Squared distance from each position to the nearest zero of `f` in 1D
///
/// `f` holds squared distances carried over from earlier axes.
// Envelope arrays are sized n + 1 and every index is bounded by q < n
#[allow(clippy::indexing_slicing)]
pub fn squared_distance_1d(f: &[f64], out: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let mut vertices = vec![0usize; n];
    let mut bounds = vec![0.0f64; n + 1];
    let mut k = 0usize;
    bounds[0] = f64::NEG_INFINITY;
    bounds[1] = f64::INFINITY;

    let parabola = |q: usize| f[q] + (q * q) as f64;

    for q in 1..n {
        let mut s = intersection(parabola(q), q, parabola(vertices[k]), vertices[k]);
        while s <= bounds[k] {
            k -= 1;
            s = intersection(parabola(q), q, parabola(vertices[k]), vertices[k]);
        }
        k += 1;
        vertices[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, value) in out.iter_mut().enumerate().take(n) {
        while bounds[k + 1] < q as f64 {
            k += 1;
        }
        let offset = q as f64 - vertices[k] as f64;
        *value = offset.mul_add(offset, f[vertices[k]]);
    }
}

fn intersection(fq: f64, q: usize, fv: f64, v: usize) -> f64 {
    (fq - fv) / (2.0 * q as f64 - 2.0 * v as f64)
}

/// Euclidean distance from every foreground voxel to the nearest background
///
/// Background voxels get distance zero. Distances are in voxels multiplied by
/// `spacing`.
pub fn distance_transform(data: &Array3<f64>, spacing: f64) -> Array3<f64> {
    let (depth, height, width) = data.dim();

    // One voxel of background on every side
    let mut squared = Array3::from_elem((depth + 2, height + 2, width + 2), 0.0);
    squared
        .slice_mut(s![1..=depth, 1..=height, 1..=width])
        .zip_mut_with(data, |d, &v| *d = if v == 0.0 { 0.0 } else { FAR });

    let mut input = Vec::new();
    let mut output = Vec::new();
    for axis in 0..3 {
        for mut lane in squared.lanes_mut(Axis(axis)) {
            input.clear();
            input.extend(lane.iter().copied());
            output.clear();
            output.resize(input.len(), 0.0);
            squared_distance_1d(&input, &mut output);
            for (dst, &src) in lane.iter_mut().zip(&output) {
                *dst = src;
            }
        }
    }

    squared
        .slice(s![1..=depth, 1..=height, 1..=width])
        .mapv(|d| d.sqrt() * spacing)
}
