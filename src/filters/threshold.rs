//! Global thresholding: fixed-value suppression and Otsu's method

use ndarray::Array3;

use crate::io::configuration::OTSU_BINS;

/// Zero every voxel at or below `threshold`, leaving the rest untouched
pub fn suppress_at_or_below(data: &mut Array3<f64>, threshold: f64) {
    data.mapv_inplace(|v| if v <= threshold { 0.0 } else { v });
}

/// Otsu threshold over all voxel values
///
/// Builds a histogram of [`OTSU_BINS`] equal-width bins spanning the value
/// range and returns the upper edge of the bin that maximises between-class
/// variance, so that `v <= threshold` selects exactly the background class.
/// A constant or empty input returns its single value (or zero).
pub fn otsu_threshold<'a>(values: impl IntoIterator<Item = &'a f64> + Clone) -> f64 {
    let mut iter = values.clone().into_iter().copied().filter(|v| v.is_finite());
    let Some(first) = iter.next() else {
        return 0.0;
    };
    let (min_val, max_val) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if (max_val - min_val).abs() < f64::EPSILON {
        return min_val;
    }

    let bin_width = (max_val - min_val) / OTSU_BINS as f64;
    let mut histogram = vec![0usize; OTSU_BINS];
    for v in values.into_iter().copied().filter(|v| v.is_finite()) {
        let bin = (((v - min_val) / bin_width).floor() as usize).min(OTSU_BINS - 1);
        if let Some(count) = histogram.get_mut(bin) {
            *count += 1;
        }
    }

    let total: usize = histogram.iter().sum();
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut count_background = 0usize;
    let mut sum_background = 0.0;
    let mut best_variance = 0.0;
    let mut best_bin = 0;

    for (bin, &count) in histogram.iter().enumerate() {
        count_background += count;
        if count_background == 0 {
            continue;
        }
        let count_foreground = total - count_background;
        if count_foreground == 0 {
            break;
        }

        sum_background += bin as f64 * count as f64;
        let weight_background = count_background as f64;
        let weight_foreground = count_foreground as f64;
        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;

        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_bin = bin;
        }
    }

    (best_bin as f64 + 1.0).mul_add(bin_width, min_val)
}

/// Zero every voxel at or below the volume's Otsu threshold
///
/// Returns the threshold that was applied.
pub fn suppress_below_otsu(data: &mut Array3<f64>) -> f64 {
    let threshold = otsu_threshold(data.iter());
    suppress_at_or_below(data, threshold);
    threshold
}
