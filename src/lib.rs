//! Stage-coded preprocessing pipeline for 3D microscopy volumes
//!
//! A volume is loaded, optionally resampled, passed through a sequence of
//! filters selected by single-character stage codes, and written back together
//! with a segmentation mask of its surviving foreground.

/// Numerical volume filters applied by the pipeline stages
pub mod filters;
/// Input/output operations and error handling
pub mod io;
/// Stage parsing, parameter stacks and pipeline execution
pub mod pipeline;
/// Volume data structures and resampling
pub mod spatial;

pub use io::error::{ErrorKind, PreprocessError, Result};
