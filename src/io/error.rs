//! Error types and classification for volume preprocessing

use std::fmt;
use std::path::PathBuf;

/// Coarse failure category used by callers to tell configuration mistakes
/// apart from external tool and I/O failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid pipeline code or parameter; never retryable
    Config,
    /// The external diffusion tool failed or produced no output
    ExternalTool,
    /// Reading or writing a volume or scratch file failed
    Io,
    /// A numerical routine received data it cannot handle
    Computation,
}

/// Main error type for all preprocessing operations
#[derive(Debug)]
pub enum PreprocessError {
    /// Pipeline string contains a character outside the stage alphabet
    InvalidStageCode {
        /// The offending character
        code: char,
        /// Zero-based position of the character in the pipeline string
        position: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// External diffusion tool could not be run or produced no usable output
    ExternalTool {
        /// Executable that was invoked
        program: PathBuf,
        /// Description of what went wrong
        reason: String,
    },

    /// File extension does not map to a known volume format
    UnsupportedFormat {
        /// Path with the unrecognised extension
        path: PathBuf,
    },

    /// Volume file was readable but its contents are inconsistent
    MalformedVolume {
        /// Path of the volume file
        path: PathBuf,
        /// Description of the inconsistency
        reason: String,
    },

    /// TIFF decoding or encoding failed
    Tiff {
        /// Path of the TIFF file
        path: PathBuf,
        /// Underlying codec error
        source: tiff::TiffError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Numerical computation produced an invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl PreprocessError {
    /// Category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStageCode { .. } | Self::InvalidParameter { .. } => ErrorKind::Config,
            Self::ExternalTool { .. } => ErrorKind::ExternalTool,
            Self::UnsupportedFormat { .. }
            | Self::MalformedVolume { .. }
            | Self::Tiff { .. }
            | Self::FileSystem { .. } => ErrorKind::Io,
            Self::Computation { .. } => ErrorKind::Computation,
        }
    }
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStageCode { code, position } => {
                write!(
                    f,
                    "Invalid pipeline stage code '{code}' at position {position} (expected one of T, G, M, A, O, S)"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ExternalTool { program, reason } => {
                write!(
                    f,
                    "External tool '{}' failed: {reason}",
                    program.display()
                )
            }
            Self::UnsupportedFormat { path } => {
                write!(
                    f,
                    "Unsupported volume format for '{}' (expected .tif, .tiff, .v3draw or .raw)",
                    path.display()
                )
            }
            Self::MalformedVolume { path, reason } => {
                write!(f, "Malformed volume '{}': {reason}", path.display())
            }
            Self::Tiff { path, source } => {
                write!(f, "TIFF error on '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for PreprocessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tiff { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for preprocessing results
pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PreprocessError {
    PreprocessError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> PreprocessError {
    PreprocessError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create an external tool error
pub fn external_tool_error(program: impl Into<PathBuf>, reason: &impl ToString) -> PreprocessError {
    PreprocessError::ExternalTool {
        program: program.into(),
        reason: reason.to_string(),
    }
}

/// Wrap an I/O error with the path and operation that produced it
pub fn file_system_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
    source: std::io::Error,
) -> PreprocessError {
    PreprocessError::FileSystem {
        path: path.into(),
        operation,
        source,
    }
}
