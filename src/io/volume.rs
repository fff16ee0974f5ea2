//! Volume file format detection and load/save dispatch

use std::path::Path;

use log::debug;

use crate::io::error::{PreprocessError, Result};
use crate::io::tiff_stack::{read_tiff_stack, write_tiff_stack};
use crate::io::v3draw::{read_v3draw, write_v3draw};
use crate::spatial::Volume;

/// On-disk volume formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    /// Multi-page TIFF (`.tif`, `.tiff`)
    Tiff,
    /// Vaa3D raw stack (`.v3draw`, `.raw`)
    V3dRaw,
}

impl VolumeFormat {
    /// Infer the format from a file extension, ignoring case
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::UnsupportedFormat`] for any other extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("tif" | "tiff") => Ok(Self::Tiff),
            Some("v3draw" | "raw") => Ok(Self::V3dRaw),
            _ => Err(PreprocessError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load a volume, choosing the decoder from the file extension
///
/// # Errors
///
/// Returns an error if the extension is unsupported or decoding fails
pub fn load_volume(path: &Path) -> Result<Volume> {
    let volume = match VolumeFormat::from_path(path)? {
        VolumeFormat::Tiff => read_tiff_stack(path)?,
        VolumeFormat::V3dRaw => read_v3draw(path)?,
    };
    debug!(
        "Loaded {} with shape {:?} as {:?}",
        path.display(),
        volume.shape(),
        volume.voxel_type()
    );
    Ok(volume)
}

/// Save a volume, choosing the encoder from the file extension
///
/// # Errors
///
/// Returns an error if the extension is unsupported or encoding fails
pub fn save_volume(path: &Path, volume: &Volume) -> Result<()> {
    match VolumeFormat::from_path(path)? {
        VolumeFormat::Tiff => write_tiff_stack(path, volume)?,
        VolumeFormat::V3dRaw => write_v3draw(path, volume)?,
    }
    debug!("Saved {} with shape {:?}", path.display(), volume.shape());
    Ok(())
}
