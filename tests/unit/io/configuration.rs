//! Tests for command-line defaults and external tool constants

#[cfg(test)]
mod tests {
    use volprep::io::configuration::{
        CONVERTED_SUFFIX, DEFAULT_MEDIAN_SIZE, DEFAULT_PIPELINE, DEFAULT_SIGMA,
        DEFAULT_SSM_ITERATIONS, DEFAULT_THRESHOLD, DEFAULT_ZOOM_FACTOR, DIFFUSION_FUNCTION,
        DIFFUSION_OUTPUT_SUFFIX, DIFFUSION_PLUGIN, DISTANCE_GRID_SPACING, FIELD_DIFFUSION_RATE,
        OTSU_BINS, OUTPUT_SUFFIX, SEGMENTATION_MARKER, SEGMENTATION_SUFFIX, TEMP_NAME_LENGTH,
        V3D_PATH_ENV,
    };
    use volprep::pipeline::stage::Pipeline;

    // Tests command-line defaults
    // Verified by changing default values
    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_PIPELINE, "TA");
        assert_eq!(DEFAULT_THRESHOLD, 0.0);
        assert_eq!(DEFAULT_SIGMA, 3.0);
        assert_eq!(DEFAULT_MEDIAN_SIZE, 3.0);
        assert_eq!(DEFAULT_SSM_ITERATIONS, 20);
        assert_eq!(DEFAULT_ZOOM_FACTOR, 1.0);
    }

    #[test]
    fn test_default_pipeline_parses() {
        assert!(Pipeline::parse(DEFAULT_PIPELINE).is_ok());
    }

    #[test]
    fn test_output_naming() {
        assert_eq!(OUTPUT_SUFFIX, ".pp");
        assert_eq!(SEGMENTATION_SUFFIX, ".seg.tif");
        assert_eq!(SEGMENTATION_MARKER, 180.0);
    }

    // Tests the explicit diffusion step stays within the stability bound
    // Verified by raising the rate above 1/6
    #[test]
    fn test_numeric_constants() {
        assert_eq!(DISTANCE_GRID_SPACING, 0.05);
        assert!(FIELD_DIFFUSION_RATE > 0.0 && FIELD_DIFFUSION_RATE <= 1.0 / 6.0);
        assert_eq!(OTSU_BINS, 256);
    }

    #[test]
    fn test_vaa3d_names() {
        assert_eq!(V3D_PATH_ENV, "V3DPATH");
        assert_eq!(TEMP_NAME_LENGTH, 10);
        assert_eq!(DIFFUSION_PLUGIN, "anisodiffusion_littlequick");
        assert_eq!(DIFFUSION_FUNCTION, "anisodiff_littlequick_func");
        assert_eq!(DIFFUSION_OUTPUT_SUFFIX, "_anisodiff.raw");
        assert_eq!(CONVERTED_SUFFIX, ".anisodiff.tif");
    }
}
