//! Tests for multi-page TIFF volume reading and writing

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use std::fs::File;
    use tempfile::TempDir;
    use tiff::encoder::{TiffEncoder, colortype};
    use volprep::ErrorKind;
    use volprep::io::tiff_stack::{read_tiff_stack, write_tiff_stack};
    use volprep::spatial::{Volume, VoxelType};

    fn ramp(shape: (usize, usize, usize), scale: f64) -> Array3<f64> {
        Array3::from_shape_fn(shape, |(z, y, x)| (z * 100 + y * 10 + x) as f64 * scale)
    }

    // Tests every supported element type survives a write/read cycle
    // Verified by writing all types as 8-bit pages
    #[test]
    fn test_element_types_are_preserved() {
        let temp_dir = TempDir::new().unwrap();

        for (voxel_type, scale) in [
            (VoxelType::U8, 1.0),
            (VoxelType::U16, 200.0),
            (VoxelType::F32, 0.25),
        ] {
            let path = temp_dir.path().join(format!("{voxel_type:?}.tif"));
            let volume = Volume::new(ramp((3, 2, 4), scale), voxel_type).restore_type(voxel_type);

            write_tiff_stack(&path, &volume).unwrap();
            let loaded = read_tiff_stack(&path).unwrap();

            assert_eq!(loaded.voxel_type(), voxel_type);
            assert_eq!(loaded.shape(), (3, 2, 4));
            assert_eq!(loaded.data(), volume.data());
        }
    }

    #[test]
    fn test_values_are_clamped_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clamped.tif");
        let volume = Volume::new(Array3::from_elem((1, 1, 2), 400.0), VoxelType::U8);

        write_tiff_stack(&path, &volume).unwrap();
        let loaded = read_tiff_stack(&path).unwrap();
        assert!(loaded.data().iter().all(|&v| v == 255.0));
    }

    // Tests parent directories are created for nested outputs
    // Verified by removing directory creation
    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("deeper").join("out.tif");
        let volume = Volume::new(Array3::zeros((2, 2, 2)), VoxelType::U16);

        write_tiff_stack(&path, &volume).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rejects_empty_volume() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.tif");
        let volume = Volume::new(Array3::zeros((0, 3, 3)), VoxelType::U8);

        let error = write_tiff_stack(&path, &volume).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(!path.exists());
    }

    // Tests colour pages collapse to their per-pixel channel maximum
    // Verified by keeping only the first channel
    #[test]
    fn test_rgb_pages_reduce_to_channel_max() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("colour.tif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(file).unwrap();
            let pixels: [u8; 6] = [10, 200, 30, 90, 5, 60];
            encoder
                .write_image::<colortype::RGB8>(2, 1, &pixels)
                .unwrap();
        }

        let loaded = read_tiff_stack(&path).unwrap();
        assert_eq!(loaded.shape(), (1, 1, 2));
        assert_eq!(loaded.voxel_type(), VoxelType::U8);
        assert_eq!(loaded.data().iter().copied().collect::<Vec<_>>(), vec![200.0, 90.0]);
    }

    #[test]
    fn test_read_errors() {
        let temp_dir = TempDir::new().unwrap();

        let missing = read_tiff_stack(&temp_dir.path().join("missing.tif")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Io);

        let garbage_path = temp_dir.path().join("garbage.tif");
        std::fs::write(&garbage_path, b"definitely not a tiff").unwrap();
        let garbage = read_tiff_stack(&garbage_path).unwrap_err();
        assert_eq!(garbage.kind(), ErrorKind::Io);
    }
}
