//! Stage-by-stage pipeline execution and output post-processing

use log::{debug, info};

use crate::filters::gaussian::gaussian_filter;
use crate::filters::intensity::{floor_values, rescale_intensity, segmentation_mask};
use crate::filters::median::median_filter;
use crate::filters::smoothing::distance_smoothing;
use crate::filters::threshold::{suppress_at_or_below, suppress_below_otsu};
use crate::io::configuration::{
    DEFAULT_MEDIAN_SIZE, DEFAULT_SIGMA, DEFAULT_SSM_ITERATIONS, DEFAULT_THRESHOLD,
};
use crate::io::error::{
    PreprocessError, Result, computation_error, external_tool_error, invalid_parameter,
};
use crate::pipeline::diffusion::DiffusionBackend;
use crate::pipeline::parameters::ParameterStack;
use crate::pipeline::stage::{Pipeline, Stage};
use crate::spatial::zoom::resample;
use crate::spatial::{Volume, VoxelType};

/// Stages and parameter lists for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Validated stage sequence
    pub pipeline: Pipeline,
    /// Thresholds for `T` stages, consumed from the end
    pub thresholds: Vec<f64>,
    /// Gaussian sigmas for `G` stages, consumed from the end
    pub sigmas: Vec<f64>,
    /// Median window sizes for `M` stages, consumed from the end
    pub median_sizes: Vec<f64>,
    /// Field diffusion iterations for `S` stages
    pub ssm_iterations: usize,
}

impl PipelineConfig {
    /// Configuration running `pipeline` with default parameters
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            thresholds: vec![DEFAULT_THRESHOLD],
            sigmas: vec![DEFAULT_SIGMA],
            median_sizes: vec![DEFAULT_MEDIAN_SIZE],
            ssm_iterations: DEFAULT_SSM_ITERATIONS,
        }
    }
}

/// Processed volume and its segmentation, both in the input element type
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Rescaled result of the last stage
    pub processed: Volume,
    /// Marker mask of the positive voxels in `processed`
    pub segmentation: Volume,
}

/// Runs a pipeline over volumes, optionally with a diffusion backend
pub struct PipelineRunner {
    config: PipelineConfig,
    backend: Option<Box<dyn DiffusionBackend>>,
}

impl PipelineRunner {
    /// Create a runner; `backend` is required only for pipelines with `A`
    pub fn new(config: PipelineConfig, backend: Option<Box<dyn DiffusionBackend>>) -> Self {
        Self { config, backend }
    }

    /// Active configuration
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all stages and post-process the result
    ///
    /// # Errors
    ///
    /// See [`Self::run_observed`]
    pub fn run(&mut self, volume: Volume) -> Result<PipelineOutput> {
        self.run_observed(volume, |_, _| {})
    }

    /// Run all stages, calling `observe` before each one
    ///
    /// All checks that do not depend on voxel data happen before the first
    /// stage runs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pipeline contains `A` but no diffusion backend was supplied
    /// - A parameter list used by the pipeline is empty
    /// - A median window size is below one
    /// - The diffusion backend fails
    /// - A stage returns a volume of a different shape
    pub fn run_observed(
        &mut self,
        volume: Volume,
        mut observe: impl FnMut(usize, Stage),
    ) -> Result<PipelineOutput> {
        let pipeline = self.config.pipeline.clone();
        self.validate()?;

        let mut thresholds = ParameterStack::new("threshold", self.config.thresholds.clone());
        let mut sigmas = ParameterStack::new("sigma", self.config.sigmas.clone());
        let mut median_sizes =
            ParameterStack::new("median_size", self.config.median_sizes.clone());

        let input_type = volume.voxel_type();
        let shape = volume.shape();
        let mut current = volume;

        for (index, &stage) in pipeline.stages().iter().enumerate() {
            observe(index, stage);
            debug!("Stage {index}: {stage}");
            current = match stage {
                Stage::Threshold => {
                    let threshold = take(&mut thresholds)?;
                    let mut current = current;
                    suppress_at_or_below(current.data_mut(), threshold);
                    current
                }
                Stage::Gaussian => {
                    let sigma = take(&mut sigmas)?;
                    let smoothed = gaussian_filter(current.data(), sigma);
                    current.with_data(smoothed)
                }
                Stage::Median => {
                    let size = take(&mut median_sizes)?;
                    let filtered = median_filter(current.data(), size)?;
                    current.with_data(filtered)
                }
                Stage::AnisotropicDiffusion => {
                    let backend = self.backend.as_mut().ok_or_else(missing_backend)?;
                    let diffused = backend.enhance(current)?;
                    diffused.restore_type(input_type)
                }
                Stage::Otsu => {
                    let mut current = current;
                    let threshold = suppress_below_otsu(current.data_mut());
                    debug!("Otsu threshold {threshold}");
                    current
                }
                Stage::DistanceSmoothing => {
                    let smoothed = distance_smoothing(current.data(), self.config.ssm_iterations);
                    current.with_data(smoothed)
                }
            };
            if current.shape() != shape {
                return Err(computation_error(
                    stage.name(),
                    &format!("stage changed shape {shape:?} to {:?}", current.shape()),
                ));
            }
        }

        let output = post_process(current, input_type);
        info!(
            "Pipeline {} kept {} foreground voxels",
            pipeline,
            output.segmentation.count_positive()
        );
        Ok(output)
    }

    fn validate(&self) -> Result<()> {
        let pipeline = &self.config.pipeline;
        if pipeline.contains(Stage::AnisotropicDiffusion) && self.backend.is_none() {
            return Err(missing_backend());
        }
        let lists: [(Stage, &'static str, &[f64]); 3] = [
            (Stage::Threshold, "threshold", &self.config.thresholds),
            (Stage::Gaussian, "sigma", &self.config.sigmas),
            (Stage::Median, "median_size", &self.config.median_sizes),
        ];
        for (stage, name, values) in lists {
            if pipeline.contains(stage) && values.is_empty() {
                return Err(invalid_parameter(name, &"[]", &"at least one value is required"));
            }
        }
        Ok(())
    }
}

fn take(stack: &mut ParameterStack) -> Result<f64> {
    stack
        .next_value()
        .ok_or_else(|| invalid_parameter(stack.name(), &"[]", &"at least one value is required"))
}

fn missing_backend() -> PreprocessError {
    external_tool_error(
        "vaa3d",
        &"anisotropic diffusion requires a Vaa3D installation (set V3DPATH)",
    )
}

/// Floor, rescale to the full range of `voxel_type` and derive the mask
pub fn post_process(volume: Volume, voxel_type: VoxelType) -> PipelineOutput {
    let mut data = volume.into_data();
    floor_values(&mut data);
    rescale_intensity(&mut data, voxel_type.max_value());
    let mask = segmentation_mask(&data);

    PipelineOutput {
        processed: Volume::new(data, voxel_type).restore_type(voxel_type),
        segmentation: Volume::new(mask, voxel_type).restore_type(voxel_type),
    }
}

/// Resample the processed volume onto `shape` and derive a fresh mask from it
///
/// The mask is recomputed rather than interpolated so that it keeps exactly
/// two values.
pub fn resample_output(output: PipelineOutput, shape: (usize, usize, usize)) -> PipelineOutput {
    let source = output.processed;
    let voxel_type = source.voxel_type();
    let data = resample(source.data(), shape);
    let processed = Volume::new(data, voxel_type).restore_type(voxel_type);
    let mask = segmentation_mask(processed.data());

    PipelineOutput {
        processed,
        segmentation: Volume::new(mask, voxel_type).restore_type(voxel_type),
    }
}
