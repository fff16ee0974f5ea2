//! Pipeline constants and command-line defaults

// Command-line defaults
/// Default stage sequence when `--pipeline` is omitted
pub const DEFAULT_PIPELINE: &str = "TA";
/// Default threshold stack
pub const DEFAULT_THRESHOLD: f64 = 0.0;
/// Default Gaussian sigma stack
pub const DEFAULT_SIGMA: f64 = 3.0;
/// Default median window stack
pub const DEFAULT_MEDIAN_SIZE: f64 = 3.0;
/// Default number of smoothing iterations for the distance stage
pub const DEFAULT_SSM_ITERATIONS: usize = 20;
/// Default resampling factor applied before the pipeline
pub const DEFAULT_ZOOM_FACTOR: f64 = 1.0;

// Output naming
/// Suffix inserted before the extension of the default processed output
pub const OUTPUT_SUFFIX: &str = ".pp";
/// Suffix and extension of the segmentation mask written next to the output
pub const SEGMENTATION_SUFFIX: &str = ".seg.tif";
/// Extension of the default processed output
pub const DEFAULT_OUTPUT_EXTENSION: &str = "tif";

// Post-processing
/// Intensity assigned to foreground voxels in the segmentation output
pub const SEGMENTATION_MARKER: f64 = 180.0;

// Distance smoothing stage
/// Grid spacing used when converting voxel distances to field units
pub const DISTANCE_GRID_SPACING: f64 = 0.05;
/// Intensity of foreground voxels produced by the distance smoothing stage
pub const DISTANCE_FOREGROUND_VALUE: f64 = 255.0;
/// Explicit diffusion step; 1/6 keeps the 6-neighbour scheme stable
pub const FIELD_DIFFUSION_RATE: f64 = 1.0 / 6.0;

// Filters
/// Number of histogram bins used by Otsu thresholding
pub const OTSU_BINS: usize = 256;
/// Gaussian kernel half-width in units of sigma
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

// External diffusion tool
/// Environment variable naming the Vaa3D installation root
pub const V3D_PATH_ENV: &str = "V3DPATH";
/// Length of randomly generated scratch file names
pub const TEMP_NAME_LENGTH: usize = 10;
/// Vaa3D plugin performing anisotropic diffusion
pub const DIFFUSION_PLUGIN: &str = "anisodiffusion_littlequick";
/// Function of the diffusion plugin to invoke
pub const DIFFUSION_FUNCTION: &str = "anisodiff_littlequick_func";
/// Suffix the diffusion plugin appends to its input path
pub const DIFFUSION_OUTPUT_SUFFIX: &str = "_anisodiff.raw";
/// Vaa3D plugin converting between image formats
pub const CONVERSION_PLUGIN: &str = "libconvert_file_format";
/// Function of the conversion plugin to invoke
pub const CONVERSION_FUNCTION: &str = "convert_format";
/// Suffix of the converted diffusion result
pub const CONVERTED_SUFFIX: &str = ".anisodiff.tif";

// Progress bar display settings
/// Width of the stage progress bar in characters
pub const PROGRESS_BAR_WIDTH: u16 = 30;
