//! Tests for uniform zoom and trilinear resampling

#[cfg(test)]
mod tests {
    use ndarray::{Array3, array};
    use volprep::ErrorKind;
    use volprep::spatial::zoom::{resample, zoom, zoomed_shape};

    #[test]
    fn test_zoomed_shape() {
        assert_eq!(zoomed_shape((10, 20, 30), 0.5), (5, 10, 15));
        assert_eq!(zoomed_shape((10, 20, 30), 2.0), (20, 40, 60));
        assert_eq!(zoomed_shape((3, 3, 3), 0.01), (1, 1, 1));
    }

    // Tests invalid factors are configuration errors
    // Verified by allowing zero factors through
    #[test]
    fn test_zoom_rejects_invalid_factor() {
        let data = Array3::zeros((2, 2, 2));
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let error = zoom(&data, factor).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Config);
        }
    }

    // Tests corner-aligned interpolation between two samples
    // Verified by using centre-aligned sample positions
    #[test]
    fn test_resample_interpolates_linearly() {
        let data = array![[[0.0, 10.0]]];
        let upsampled = resample(&data, (1, 1, 3));
        assert_eq!(upsampled, array![[[0.0, 5.0, 10.0]]]);
    }

    #[test]
    fn test_resample_same_shape_is_identity() {
        let data = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 100 + y * 10 + x) as f64);
        assert_eq!(resample(&data, (2, 3, 4)), data);
    }

    // Tests zooming down and back restores the exact shape
    // Verified by rounding the return shape from the zoom factor
    #[test]
    fn test_round_trip_restores_shape() {
        let data = Array3::from_elem((7, 9, 11), 3.0);
        let small = zoom(&data, 0.5).unwrap();
        assert_eq!(small.dim(), (4, 5, 6));

        let restored = resample(&small, data.dim());
        assert_eq!(restored.dim(), (7, 9, 11));
        assert!(restored.iter().all(|&v| (v - 3.0).abs() < 1e-12));
    }
}
