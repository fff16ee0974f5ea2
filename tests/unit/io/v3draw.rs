//! Tests for Vaa3D raw stack encoding and decoding

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use std::path::Path;
    use tempfile::TempDir;
    use volprep::ErrorKind;
    use volprep::io::v3draw::{
        V3DRAW_MAGIC, decode_v3draw, encode_v3draw, read_v3draw, write_v3draw,
    };
    use volprep::spatial::{Volume, VoxelType};

    fn header(endian: u8, datatype: [u8; 2]) -> Vec<u8> {
        let mut bytes = V3DRAW_MAGIC.to_vec();
        bytes.push(endian);
        bytes.extend_from_slice(&datatype);
        bytes
    }

    // Tests the header layout of encoded stacks
    // Verified by writing sizes in z, y, x order
    #[test]
    fn test_encoded_header_layout() {
        let volume = Volume::new(Array3::zeros((2, 3, 4)), VoxelType::U16);
        let bytes = encode_v3draw(&volume);

        assert!(bytes.starts_with(V3DRAW_MAGIC));
        let offset = V3DRAW_MAGIC.len();
        assert_eq!(bytes[offset], b'L');
        assert_eq!(&bytes[offset + 1..offset + 3], &2u16.to_le_bytes());
        assert_eq!(&bytes[offset + 3..offset + 7], &4u32.to_le_bytes());
        assert_eq!(&bytes[offset + 15..offset + 19], &1u32.to_le_bytes());
        assert_eq!(bytes.len(), offset + 19 + 2 * 3 * 4 * 2);
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack.v3draw");
        let data = Array3::from_shape_fn((2, 2, 3), |(z, y, x)| (z * 6 + y * 3 + x) as f64);
        let volume = Volume::new(data, VoxelType::U8);

        write_v3draw(&path, &volume).unwrap();
        let loaded = read_v3draw(&path).unwrap();
        assert_eq!(loaded, volume);
    }

    // Tests big-endian files with legacy 2-byte sizes
    // Verified by always assuming 4-byte sizes
    #[test]
    fn test_decodes_big_endian_short_sizes() {
        let mut bytes = header(b'B', 2u16.to_be_bytes());
        for size in [2u16, 1, 1, 1] {
            bytes.extend_from_slice(&size.to_be_bytes());
        }
        bytes.extend_from_slice(&300u16.to_be_bytes());
        bytes.extend_from_slice(&7u16.to_be_bytes());

        let volume = decode_v3draw(&bytes, Path::new("legacy.raw")).unwrap();
        assert_eq!(volume.voxel_type(), VoxelType::U16);
        assert_eq!(volume.shape(), (1, 1, 2));
        assert_eq!(volume.data().iter().copied().collect::<Vec<_>>(), vec![300.0, 7.0]);
    }

    // Tests channels merge by per-voxel maximum
    // Verified by returning only the first channel
    #[test]
    fn test_multi_channel_reduces_to_max() {
        let mut bytes = header(b'L', 1u16.to_le_bytes());
        for size in [3u32, 1, 1, 2] {
            bytes.extend_from_slice(&size.to_le_bytes());
        }
        bytes.extend_from_slice(&[1, 50, 3]);
        bytes.extend_from_slice(&[9, 2, 30]);

        let volume = decode_v3draw(&bytes, Path::new("two.v3draw")).unwrap();
        assert_eq!(volume.shape(), (1, 1, 3));
        assert_eq!(volume.data().iter().copied().collect::<Vec<_>>(), vec![9.0, 50.0, 30.0]);
    }

    #[test]
    fn test_float_samples() {
        let mut bytes = header(b'L', 4u16.to_le_bytes());
        for size in [1u32, 1, 1, 1] {
            bytes.extend_from_slice(&size.to_le_bytes());
        }
        bytes.extend_from_slice(&0.75f32.to_le_bytes());

        let volume = decode_v3draw(&bytes, Path::new("float.v3draw")).unwrap();
        assert_eq!(volume.voxel_type(), VoxelType::F32);
        assert_eq!(volume.data()[[0, 0, 0]], 0.75);
    }

    // Tests malformed inputs are rejected with Io errors
    // Verified by skipping the length check
    #[test]
    fn test_rejects_malformed_input() {
        let path = Path::new("bad.v3draw");

        let no_magic = decode_v3draw(b"not a vaa3d file at all, sorry", path).unwrap_err();
        assert_eq!(no_magic.kind(), ErrorKind::Io);

        let mut bad_endian = header(b'X', 1u16.to_le_bytes());
        bad_endian.extend_from_slice(&[0; 16]);
        assert!(decode_v3draw(&bad_endian, path).is_err());

        let mut bad_type = header(b'L', 8u16.to_le_bytes());
        bad_type.extend_from_slice(&[0; 16]);
        assert!(decode_v3draw(&bad_type, path).is_err());

        let mut truncated = header(b'L', 1u16.to_le_bytes());
        for size in [4u32, 4, 4, 1] {
            truncated.extend_from_slice(&size.to_le_bytes());
        }
        truncated.extend_from_slice(&[0; 10]);
        assert!(decode_v3draw(&truncated, path).is_err());
    }
}
