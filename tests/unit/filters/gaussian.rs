//! Tests for Gaussian kernels, mirrored indexing and volume smoothing

#[cfg(test)]
mod tests {
    use ndarray::{Array3, Axis};
    use volprep::filters::gaussian::{
        convolve_axis, gaussian_filter, gaussian_kernel, reflect_index,
    };

    // Tests kernel width follows the four-sigma truncation
    // Verified by changing the truncation constant
    #[test]
    fn test_kernel_shape_and_normalisation() {
        let kernel = gaussian_kernel(1.0);
        assert_eq!(kernel.len(), 9);

        let sum: f64 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        for (a, b) in kernel.iter().zip(kernel.iter().rev()) {
            assert!((a - b).abs() < 1e-15);
        }
        assert!(kernel[4] > kernel[3] && kernel[3] > kernel[0]);
    }

    #[test]
    fn test_reflect_index_mirrors_half_sample() {
        assert_eq!(reflect_index(-1, 5), 0);
        assert_eq!(reflect_index(-2, 5), 1);
        assert_eq!(reflect_index(5, 5), 4);
        assert_eq!(reflect_index(6, 5), 3);
        assert_eq!(reflect_index(2, 5), 2);
        assert_eq!(reflect_index(-7, 1), 0);
    }

    // Tests an impulse away from the borders keeps its mass
    // Verified by dropping kernel normalisation
    #[test]
    fn test_impulse_response() {
        let mut data = Array3::zeros((21, 21, 21));
        data[[10, 10, 10]] = 1.0;

        let smoothed = gaussian_filter(&data, 1.0);
        let total: f64 = smoothed.iter().sum();

        assert!((total - 1.0).abs() < 1e-9);
        assert!(smoothed[[10, 10, 10]] < 1.0);
        assert!(smoothed[[10, 10, 11]] > 0.0);
        assert!((smoothed[[10, 10, 11]] - smoothed[[10, 11, 10]]).abs() < 1e-12);
    }

    #[test]
    fn test_constant_volume_is_fixed_point() {
        let data = Array3::from_elem((3, 4, 5), 7.0);
        let smoothed = gaussian_filter(&data, 2.0);
        assert!(smoothed.iter().all(|&v| (v - 7.0).abs() < 1e-9));
    }

    // Tests non-positive sigma returns the input untouched
    // Verified by removing the early return
    #[test]
    fn test_non_positive_sigma_is_identity() {
        let data = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 12 + y * 4 + x) as f64);
        assert_eq!(gaussian_filter(&data, 0.0), data);
        assert_eq!(gaussian_filter(&data, -1.0), data);
    }

    #[test]
    fn test_convolve_axis_only_touches_that_axis() {
        let mut data = Array3::from_shape_fn((1, 3, 3), |(_, y, _)| y as f64);
        convolve_axis(&mut data, Axis(2), &[0.25, 0.5, 0.25]);

        for y in 0..3 {
            for x in 0..3 {
                assert!((data[[0, y, x]] - y as f64).abs() < 1e-12);
            }
        }
    }
}
