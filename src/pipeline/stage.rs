//! Stage-code alphabet and pipeline string validation

use std::fmt;

use crate::io::error::{PreprocessError, Result};

/// A single pipeline operation selected by its stage code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `T`: zero voxels at or below the next threshold
    Threshold,
    /// `G`: Gaussian smoothing with the next sigma
    Gaussian,
    /// `M`: median filter with the next window size
    Median,
    /// `A`: anisotropic diffusion through the external tool
    AnisotropicDiffusion,
    /// `O`: zero voxels at or below the Otsu threshold
    Otsu,
    /// `S`: binarised smoothing of the foreground distance field
    DistanceSmoothing,
}

impl Stage {
    /// All stages in code order
    pub const ALL: [Self; 6] = [
        Self::Threshold,
        Self::Gaussian,
        Self::Median,
        Self::AnisotropicDiffusion,
        Self::Otsu,
        Self::DistanceSmoothing,
    ];

    /// Parse a stage code
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'T' => Some(Self::Threshold),
            'G' => Some(Self::Gaussian),
            'M' => Some(Self::Median),
            'A' => Some(Self::AnisotropicDiffusion),
            'O' => Some(Self::Otsu),
            'S' => Some(Self::DistanceSmoothing),
            _ => None,
        }
    }

    /// Character selecting this stage
    pub const fn code(self) -> char {
        match self {
            Self::Threshold => 'T',
            Self::Gaussian => 'G',
            Self::Median => 'M',
            Self::AnisotropicDiffusion => 'A',
            Self::Otsu => 'O',
            Self::DistanceSmoothing => 'S',
        }
    }

    /// Human-readable stage name for progress and logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Gaussian => "gaussian",
            Self::Median => "median",
            Self::AnisotropicDiffusion => "anisotropic diffusion",
            Self::Otsu => "otsu",
            Self::DistanceSmoothing => "distance smoothing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

/// A validated, ordered sequence of stages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Parse and validate a pipeline string
    ///
    /// The whole string is checked before anything runs, so an invalid code
    /// anywhere aborts the pipeline without touching the volume.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidStageCode`] for the first character
    /// outside `{T, G, M, A, O, S}`
    pub fn parse(codes: &str) -> Result<Self> {
        let stages = codes
            .chars()
            .enumerate()
            .map(|(position, code)| {
                Stage::from_code(code)
                    .ok_or(PreprocessError::InvalidStageCode { code, position })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stages })
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages
    pub const fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages
    pub const fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether any stage is `stage`
    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            write!(f, "{}", stage.code())?;
        }
        Ok(())
    }
}
