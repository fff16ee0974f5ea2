//! Final intensity normalisation and segmentation derivation

use ndarray::Array3;

use crate::io::configuration::SEGMENTATION_MARKER;

/// Round every voxel down to the nearest integer
pub fn floor_values(data: &mut Array3<f64>) {
    data.mapv_inplace(f64::floor);
}

/// Linearly map the value range `[min, max]` onto `[0, target_max]`
///
/// Constant and empty volumes are left unchanged.
pub fn rescale_intensity(data: &mut Array3<f64>, target_max: f64) {
    let mut values = data.iter().copied().filter(|v| v.is_finite());
    let Some(first) = values.next() else {
        return;
    };
    let (min_val, max_val) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let span = max_val - min_val;
    if span <= f64::EPSILON {
        return;
    }

    let scale = target_max / span;
    data.mapv_inplace(|v| ((v - min_val) * scale).clamp(0.0, target_max));
}

/// Binary segmentation: [`SEGMENTATION_MARKER`] where `data > 0`, zero elsewhere
pub fn segmentation_mask(data: &Array3<f64>) -> Array3<f64> {
    data.mapv(|v| if v > 0.0 { SEGMENTATION_MARKER } else { 0.0 })
}
