//! Tests for fixed-value and Otsu thresholding

#[cfg(test)]
mod tests {
    use ndarray::{Array3, array};
    use volprep::filters::threshold::{otsu_threshold, suppress_at_or_below, suppress_below_otsu};

    // Tests voxels equal to the threshold are suppressed along with lower ones
    // Verified by switching the comparison to strictly-below
    #[test]
    fn test_suppress_at_or_below_is_inclusive() {
        let mut data = array![[[1.0, 2.0, 3.0, 4.0]]];
        suppress_at_or_below(&mut data, 2.0);
        assert_eq!(data, array![[[0.0, 0.0, 3.0, 4.0]]]);
    }

    #[test]
    fn test_suppress_keeps_values_above_unchanged() {
        let mut data = array![[[-3.0, 0.5, 7.25]]];
        suppress_at_or_below(&mut data, 0.0);
        assert_eq!(data, array![[[0.0, 0.5, 7.25]]]);
    }

    // Tests a bimodal volume splits between its two modes
    // Verified by returning the histogram minimum
    #[test]
    fn test_otsu_separates_bimodal_values() {
        let mut values = vec![10.0; 50];
        values.extend(vec![200.0; 50]);
        values.extend([12.0, 11.0, 195.0, 205.0]);

        let threshold = otsu_threshold(values.iter());
        assert!(threshold > 12.0, "threshold {threshold} too low");
        assert!(threshold < 195.0, "threshold {threshold} too high");
    }

    // Tests low values sharing the background's last bin are suppressed too
    // Verified by returning the centre of the winning bin
    #[test]
    fn test_suppress_below_otsu_removes_whole_background_bin() {
        let mut data = Array3::from_elem((1, 4, 26), 10.0);
        for x in 0..26 {
            data[[0, 2, x]] = 200.0;
            data[[0, 3, x]] = 200.0;
        }
        data[[0, 0, 0]] = 12.0;
        data[[0, 3, 0]] = 205.0;

        let threshold = suppress_below_otsu(&mut data);

        assert!(threshold > 12.0, "threshold {threshold} kept a background voxel");
        assert!(data.iter().all(|&v| v == 0.0 || v >= 200.0));
        assert_eq!(data.iter().filter(|&&v| v > 0.0).count(), 52);
    }

    #[test]
    fn test_otsu_degenerate_inputs() {
        let constant = [4.0, 4.0, 4.0];
        assert!((otsu_threshold(constant.iter()) - 4.0).abs() < f64::EPSILON);

        let empty: [f64; 0] = [];
        assert!(otsu_threshold(empty.iter()).abs() < f64::EPSILON);
    }

    // Tests Otsu suppression keeps only the bright class
    // Verified by suppressing strictly below the threshold
    #[test]
    fn test_suppress_below_otsu() {
        let mut data = Array3::from_shape_fn((2, 4, 4), |(_, y, _)| if y < 2 { 5.0 } else { 90.0 });
        let threshold = suppress_below_otsu(&mut data);

        assert!(threshold > 5.0 && threshold < 90.0);
        assert_eq!(data.iter().filter(|&&v| v == 90.0).count(), 16);
        assert_eq!(data.iter().filter(|&&v| v == 0.0).count(), 16);
    }
}
