//! Frame size arithmetic for 8-bit 4:2:0

use crate::error::{Error, Result};
use crate::types::Rotation;

/// Bytes needed for a 4:2:0 frame: full luma plane plus half as much chroma.
pub fn packed_size(width: u32, height: u32) -> Result<usize> {
    let overflow = || Error::SizeOverflow { width, height };
    let luma = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(overflow)?;
    luma.checked_add(luma / 2).ok_or_else(overflow)
}

/// Output dimensions after rotating a `width` x `height` frame by `degrees`.
pub fn rotated_dimensions(width: u32, height: u32, degrees: i32) -> (u32, u32) {
    if Rotation::from_degrees(degrees).swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Chroma plane dimensions for a 4:2:0 frame
pub(crate) fn chroma_dimensions(width: u32, height: u32) -> (usize, usize) {
    (width as usize / 2, height as usize / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_size() {
        assert_eq!(packed_size(4, 2).unwrap(), 12);
        assert_eq!(packed_size(640, 480).unwrap(), 640 * 480 + 640 * 480 / 2);
        assert_eq!(packed_size(1920, 1080).unwrap(), 3_110_400);
        assert_eq!(packed_size(0, 480).unwrap(), 0);
    }

    #[test]
    fn test_packed_size_even_grid() {
        for w in (2..64).step_by(2) {
            for h in (2..64).step_by(2) {
                let n = (w * h) as usize;
                assert_eq!(packed_size(w, h).unwrap(), n + n / 2);
            }
        }
    }

    #[test]
    fn test_packed_size_overflow() {
        assert!(matches!(
            packed_size(u32::MAX, u32::MAX),
            Err(Error::SizeOverflow { .. })
        ));
    }

    #[test]
    fn test_rotated_dimensions() {
        assert_eq!(rotated_dimensions(640, 480, 0), (640, 480));
        assert_eq!(rotated_dimensions(640, 480, 90), (480, 640));
        assert_eq!(rotated_dimensions(640, 480, 180), (640, 480));
        assert_eq!(rotated_dimensions(640, 480, 270), (480, 640));
    }

    #[test]
    fn test_rotated_dimensions_wraps_angles() {
        assert_eq!(
            rotated_dimensions(640, 480, -90),
            rotated_dimensions(640, 480, 270)
        );
        assert_eq!(
            rotated_dimensions(640, 480, 450),
            rotated_dimensions(640, 480, 90)
        );
        assert_eq!(rotated_dimensions(640, 480, -180), (640, 480));
    }
}
