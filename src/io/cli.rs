//! Command-line interface for preprocessing a single microscopy volume

use crate::io::configuration::{
    DEFAULT_MEDIAN_SIZE, DEFAULT_OUTPUT_EXTENSION, DEFAULT_PIPELINE, DEFAULT_SIGMA,
    DEFAULT_SSM_ITERATIONS, DEFAULT_THRESHOLD, DEFAULT_ZOOM_FACTOR, OUTPUT_SUFFIX,
    SEGMENTATION_SUFFIX, V3D_PATH_ENV,
};
use crate::io::error::{Result, external_tool_error, invalid_parameter};
use crate::io::progress::StageProgress;
use crate::io::volume::{VolumeFormat, load_volume, save_volume};
use crate::pipeline::diffusion::{DiffusionBackend, V3dConfig, V3dDiffusion};
use crate::pipeline::runner::{PipelineConfig, PipelineOutput, PipelineRunner, resample_output};
use crate::pipeline::stage::{Pipeline, Stage};
use crate::spatial::zoom::zoom;
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "volprep")]
#[command(
    author,
    version,
    about = "Preprocess 3D microscopy volumes with a stage-coded filter pipeline"
)]
/// Command-line arguments for the preprocessing tool
pub struct Cli {
    /// Input volume (.tif, .tiff, .v3draw or .raw)
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Output volume; defaults to <input>.pp.tif next to the input
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Thresholds for T stages, consumed from the last
    #[arg(
        long,
        num_args = 1..,
        allow_negative_numbers = true,
        default_values_t = [DEFAULT_THRESHOLD]
    )]
    pub threshold: Vec<f64>,

    /// Stage codes: T threshold, G gaussian, M median, A diffusion, O otsu, S distance smoothing
    #[arg(long, default_value = DEFAULT_PIPELINE)]
    pub pipeline: String,

    /// Gaussian sigmas for G stages, consumed from the last
    #[arg(
        long,
        num_args = 1..,
        allow_negative_numbers = true,
        default_values_t = [DEFAULT_SIGMA]
    )]
    pub sigma: Vec<f64>,

    /// Median window sizes for M stages, consumed from the last
    #[arg(
        long,
        alias = "median_size",
        num_args = 1..,
        allow_negative_numbers = true,
        default_values_t = [DEFAULT_MEDIAN_SIZE]
    )]
    pub median_size: Vec<f64>,

    /// Distance field smoothing iterations for S stages
    #[arg(long, default_value_t = DEFAULT_SSM_ITERATIONS)]
    pub ssmiter: usize,

    /// Resampling factor applied before the pipeline and undone afterwards
    #[arg(long, alias = "zoom_factor", default_value_t = DEFAULT_ZOOM_FACTOR)]
    pub zoom_factor: f64,

    /// Vaa3D installation root, needed for A stages
    #[arg(long, env = V3D_PATH_ENV, value_name = "DIR")]
    pub v3d_path: Option<PathBuf>,

    /// Keep the scratch files exchanged with Vaa3D
    #[arg(long)]
    pub keep_temp: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Processed output path, explicit or derived from the input
    pub fn output_path(&self) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| default_output_path(&self.file))
    }
}

// File name up to its first '.'
fn base_name(path: &Path) -> String {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    name.split('.').next().unwrap_or_default().to_string()
}

fn sibling(path: &Path, name: String) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// `<dir>/<base>.pp.tif` for an input at `<dir>/<base>.<anything>`
pub fn default_output_path(input_path: &Path) -> PathBuf {
    sibling(
        input_path,
        format!(
            "{}{OUTPUT_SUFFIX}.{DEFAULT_OUTPUT_EXTENSION}",
            base_name(input_path)
        ),
    )
}

/// `<dir>/<base>.seg.tif` for an output at `<dir>/<base>.<anything>`
pub fn segmentation_path(output_path: &Path) -> PathBuf {
    sibling(
        output_path,
        format!("{}{SEGMENTATION_SUFFIX}", base_name(output_path)),
    )
}

/// Loads, processes and saves one volume according to CLI arguments
pub struct VolumeProcessor {
    cli: Cli,
    progress: StageProgress,
}

impl VolumeProcessor {
    /// Create a processor for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = if cli.should_show_progress() {
            StageProgress::new()
        } else {
            StageProgress::hidden()
        };
        Self { cli, progress }
    }

    /// Parsed arguments
    pub const fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Run the whole pipeline and write both outputs
    ///
    /// Nothing is written unless every stage succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The zoom factor is not a positive number
    /// - The pipeline string contains an unknown stage code
    /// - The pipeline needs Vaa3D but no installation was given
    /// - An output path has an unsupported extension
    /// - The segmentation path would overwrite the processed output
    /// - Loading, any stage, or saving fails
    pub fn process(&self) -> Result<()> {
        let start_time = Instant::now();
        let zoom_factor = self.validated_zoom_factor()?;
        let pipeline = Pipeline::parse(&self.cli.pipeline)?;
        let output_path = self.cli.output_path();
        let segmentation_path = segmentation_path(&output_path);
        check_output_paths(&output_path, &segmentation_path)?;
        let backend = self.diffusion_backend(&pipeline)?;

        let volume = load_volume(&self.cli.file)?;
        let original_shape = volume.shape();
        let resampled = (zoom_factor - 1.0).abs() > f64::EPSILON;
        let working = if resampled {
            let zoomed = zoom(volume.data(), zoom_factor)?;
            volume.with_data(zoomed)
        } else {
            volume
        };
        info!(
            "Running pipeline {} on {} with shape {:?}",
            pipeline,
            self.cli.file.display(),
            working.shape()
        );

        let config = PipelineConfig {
            pipeline: pipeline.clone(),
            thresholds: self.cli.threshold.clone(),
            sigmas: self.cli.sigma.clone(),
            median_sizes: self.cli.median_size.clone(),
            ssm_iterations: self.cli.ssmiter,
        };
        let mut runner = PipelineRunner::new(config, backend);

        self.progress.start(pipeline.len());
        let result = runner.run_observed(working, |index, stage| self.progress.stage(index, stage));
        if result.is_err() {
            warn!(
                "Pipeline {} stopped at stage {} of {}",
                pipeline,
                self.progress.position() + 1,
                self.progress.length().unwrap_or_default()
            );
        }
        self.progress.finish();

        let mut output = result?;
        if resampled {
            output = resample_output(output, original_shape);
        }

        save_outputs(&output, &output_path, &segmentation_path)?;
        info!(
            "Finished {} in {:.2?}",
            self.cli.file.display(),
            start_time.elapsed()
        );

        // Allow print for the final user-facing summary
        #[allow(clippy::print_stdout)]
        {
            println!("Processed volume: {}", output_path.display());
            println!("Segmentation: {}", segmentation_path.display());
            println!("Preprocessing complete");
        }

        Ok(())
    }

    fn validated_zoom_factor(&self) -> Result<f64> {
        let factor = self.cli.zoom_factor;
        if factor.is_finite() && factor > 0.0 {
            Ok(factor)
        } else {
            Err(invalid_parameter(
                "zoom_factor",
                &factor,
                &"must be a positive number",
            ))
        }
    }

    fn diffusion_backend(&self, pipeline: &Pipeline) -> Result<Option<Box<dyn DiffusionBackend>>> {
        let Some(root) = &self.cli.v3d_path else {
            if pipeline.contains(Stage::AnisotropicDiffusion) {
                return Err(external_tool_error(
                    "vaa3d",
                    &format!("pipeline {pipeline} needs Vaa3D; set {V3D_PATH_ENV} or --v3d-path"),
                ));
            }
            return Ok(None);
        };

        let config = V3dConfig::new(root).with_keep_temporaries(self.cli.keep_temp);
        Ok(Some(Box::new(V3dDiffusion::new(config))))
    }
}

fn check_output_paths(output_path: &Path, segmentation_path: &Path) -> Result<()> {
    VolumeFormat::from_path(output_path)?;
    VolumeFormat::from_path(segmentation_path)?;
    if output_path == segmentation_path {
        return Err(invalid_parameter(
            "out",
            &output_path.display(),
            &"segmentation would overwrite the processed output",
        ));
    }
    Ok(())
}

// Writes both outputs or neither
fn save_outputs(
    output: &PipelineOutput,
    output_path: &Path,
    segmentation_path: &Path,
) -> Result<()> {
    let saved = save_volume(output_path, &output.processed)
        .and_then(|()| save_volume(segmentation_path, &output.segmentation));
    if saved.is_err() {
        for path in [output_path, segmentation_path] {
            match fs::remove_file(path) {
                Err(error) if error.kind() != io::ErrorKind::NotFound => {
                    warn!("Failed to remove partial output {}: {error}", path.display());
                }
                _ => {}
            }
        }
    }
    saved
}
