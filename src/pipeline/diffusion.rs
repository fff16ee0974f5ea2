//! Anisotropic diffusion through the Vaa3D desktop application
//!
//! The diffusion algorithm itself lives in a Vaa3D plugin and is treated as an
//! opaque process. The volume travels through scratch files: it is written as a
//! TIFF, diffused into a Vaa3D raw file, converted back to TIFF by a second
//! plugin, and read back. Scratch files are removed on every exit path.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::io::configuration::{
    CONVERSION_FUNCTION, CONVERSION_PLUGIN, CONVERTED_SUFFIX, DIFFUSION_FUNCTION,
    DIFFUSION_OUTPUT_SUFFIX, DIFFUSION_PLUGIN, TEMP_NAME_LENGTH,
};
use crate::io::error::{Result, external_tool_error};
use crate::io::tiff_stack::{read_tiff_stack, write_tiff_stack};
use crate::spatial::Volume;

/// Capability to replace a volume with its anisotropically diffused version
pub trait DiffusionBackend {
    /// Diffuse `volume` and return the result
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce a result
    fn enhance(&mut self, volume: Volume) -> Result<Volume>;
}

/// Location and plugin names of a Vaa3D installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3dConfig {
    /// Installation root, as given by `V3DPATH`
    pub install_root: PathBuf,
    /// Directory receiving scratch files
    pub scratch_dir: PathBuf,
    /// Plugin performing the diffusion
    pub diffusion_plugin: String,
    /// Function of the diffusion plugin
    pub diffusion_function: String,
    /// Plugin converting the raw result to TIFF
    pub conversion_plugin: String,
    /// Function of the conversion plugin
    pub conversion_function: String,
    /// Leave scratch files in place for inspection
    pub keep_temporaries: bool,
}

impl V3dConfig {
    /// Configuration with the default plugins and the system temp directory
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            scratch_dir: std::env::temp_dir(),
            diffusion_plugin: DIFFUSION_PLUGIN.to_string(),
            diffusion_function: DIFFUSION_FUNCTION.to_string(),
            conversion_plugin: CONVERSION_PLUGIN.to_string(),
            conversion_function: CONVERSION_FUNCTION.to_string(),
            keep_temporaries: false,
        }
    }

    /// Use `scratch_dir` for scratch files
    #[must_use]
    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    /// Keep or discard scratch files after each run
    #[must_use]
    pub const fn with_keep_temporaries(mut self, keep: bool) -> Self {
        self.keep_temporaries = keep;
        self
    }

    /// Path of the Vaa3D executable for the current platform
    pub fn executable(&self) -> PathBuf {
        if cfg!(target_os = "macos") {
            self.install_root
                .join("vaa3d64.app")
                .join("Contents")
                .join("MacOS")
                .join("vaa3d64")
        } else if cfg!(windows) {
            self.install_root.join("vaa3d_msvc.exe")
        } else {
            self.install_root.join("vaa3d")
        }
    }
}

/// Scratch files removed together when the set is dropped
#[derive(Debug)]
pub struct TempFileSet {
    paths: Vec<PathBuf>,
    keep: bool,
}

impl TempFileSet {
    /// Create an empty set; `keep` disables removal
    pub const fn new(keep: bool) -> Self {
        Self {
            paths: Vec::new(),
            keep,
        }
    }

    /// Register a path for removal and hand it back
    pub fn track(&mut self, path: PathBuf) -> PathBuf {
        self.paths.push(path.clone());
        path
    }
}

impl Drop for TempFileSet {
    fn drop(&mut self) {
        if self.keep {
            debug!("Keeping {} scratch files", self.paths.len());
            return;
        }
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Could not remove scratch file {}: {e}", path.display());
            }
        }
    }
}

/// Random alphanumeric scratch file stem
pub fn random_basename(rng: &mut impl Rng, length: usize) -> String {
    rng.sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

// Blocks until the tool exits; no timeout
fn run_tool(executable: &Path, args: &[&OsStr]) -> Result<()> {
    debug!("Running {} {:?}", executable.display(), args);
    let output = Command::new(executable)
        .args(args)
        .output()
        .map_err(|e| external_tool_error(executable, &format!("could not start: {e}")))?;

    if !output.stdout.is_empty() {
        debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
    }
    if !output.status.success() {
        warn!(
            "{} exited with {}: {}",
            executable.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
    Ok(())
}

/// Vaa3D-backed anisotropic diffusion
#[derive(Debug)]
pub struct V3dDiffusion {
    config: V3dConfig,
    rng: StdRng,
}

impl V3dDiffusion {
    /// Adapter for the installation described by `config`
    pub fn new(config: V3dConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Adapter with reproducible scratch file names
    pub fn with_seed(config: V3dConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &V3dConfig {
        &self.config
    }
}

impl DiffusionBackend for V3dDiffusion {
    fn enhance(&mut self, volume: Volume) -> Result<Volume> {
        let executable = self.config.executable();
        let stem = random_basename(&mut self.rng, TEMP_NAME_LENGTH);

        let mut scratch = TempFileSet::new(self.config.keep_temporaries);
        let input = scratch.track(self.config.scratch_dir.join(format!("{stem}.tif")));
        let diffused = scratch.track(with_suffix(&input, DIFFUSION_OUTPUT_SUFFIX));
        let converted = scratch.track(
            self.config
                .scratch_dir
                .join(format!("{stem}{CONVERTED_SUFFIX}")),
        );

        write_tiff_stack(&input, &volume)?;

        run_tool(
            &executable,
            &[
                OsStr::new("-x"),
                OsStr::new(&self.config.diffusion_plugin),
                OsStr::new("-f"),
                OsStr::new(&self.config.diffusion_function),
                OsStr::new("-i"),
                input.as_os_str(),
            ],
        )?;
        if !diffused.exists() {
            return Err(external_tool_error(
                &executable,
                &format!("diffusion produced no output at {}", diffused.display()),
            ));
        }

        run_tool(
            &executable,
            &[
                OsStr::new("-x"),
                OsStr::new(&self.config.conversion_plugin),
                OsStr::new("-f"),
                OsStr::new(&self.config.conversion_function),
                OsStr::new("-i"),
                diffused.as_os_str(),
                OsStr::new("-o"),
                converted.as_os_str(),
            ],
        )?;
        if !converted.exists() {
            return Err(external_tool_error(
                &executable,
                &format!("conversion produced no output at {}", converted.display()),
            ));
        }

        let enhanced = read_tiff_stack(&converted)?;
        if enhanced.shape() != volume.shape() {
            return Err(external_tool_error(
                &executable,
                &format!(
                    "result shape {:?} differs from input shape {:?}",
                    enhanced.shape(),
                    volume.shape()
                ),
            ));
        }
        Ok(enhanced)
    }
}
