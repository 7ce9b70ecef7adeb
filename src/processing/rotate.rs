//! NV21 rotation
//!
//! Rotation runs as NV21 -> I420 -> rotated I420 -> NV21 through the
//! backend. Every size check happens in [`plan`] before any scratch memory
//! is touched, so a rejected call has no side effects.

use super::buffer::{I420Buffer, Nv21Buffer};
use super::convert::{SoftwareConverter, YuvConverter};
use super::size::{packed_size, rotated_dimensions};
use crate::error::{Error, Result};
use crate::types::{PackedFrame, Resolution, Rotation};

/// One NV21 and one I420 buffer of the same resolution
#[derive(Debug)]
pub(crate) struct ScratchPair {
    pub(crate) resolution: Resolution,
    pub(crate) nv21: Nv21Buffer,
    pub(crate) i420: I420Buffer,
}

impl ScratchPair {
    pub(crate) fn allocate(resolution: Resolution) -> Result<Self> {
        Ok(Self {
            resolution,
            nv21: Nv21Buffer::allocate(resolution.width, resolution.height)?,
            i420: I420Buffer::allocate(resolution.width, resolution.height)?,
        })
    }
}

/// What a validated rotate call has to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Plan {
    /// Angle is a multiple of 360: copy `len` bytes
    Copy { len: usize },
    /// Full staging through the backend
    Rotate {
        rotation: Rotation,
        source: Resolution,
        rotated: Resolution,
        dst_len: usize,
    },
}

/// Validate a rotate request against the source and destination lengths
pub(crate) fn plan(
    src_len: usize,
    width: u32,
    height: u32,
    degrees: i32,
    dst_len: usize,
) -> Result<Plan> {
    let rotation = Rotation::from_degrees(degrees);
    let need_src = packed_size(width, height)?;

    if rotation == Rotation::Rotation0 {
        if dst_len < need_src {
            return Err(Error::too_small("dst", need_src, dst_len));
        }
        if src_len < need_src {
            return Err(Error::too_small("src", need_src, src_len));
        }
        return Ok(Plan::Copy { len: need_src });
    }

    if width % 2 != 0 || height % 2 != 0 {
        return Err(Error::InvalidDimensions(format!(
            "NV21 rotate requires even width/height, got {}x{}",
            width, height
        )));
    }

    let (out_w, out_h) = rotated_dimensions(width, height, degrees);
    let need_dst = packed_size(out_w, out_h)?;
    if src_len < need_src {
        return Err(Error::too_small("src", need_src, src_len));
    }
    if dst_len < need_dst {
        return Err(Error::too_small("dst", need_dst, dst_len));
    }

    Ok(Plan::Rotate {
        rotation,
        source: Resolution::new(width, height),
        rotated: Resolution::new(out_w, out_h),
        dst_len: need_dst,
    })
}

/// Run `src` through the backend, leaving the result in `rotated.nv21`
pub(crate) fn stage<C: YuvConverter>(
    converter: &C,
    src: &[u8],
    source: &mut ScratchPair,
    rotated: &mut ScratchPair,
    rotation: Rotation,
) -> Result<()> {
    let staged = source.nv21.as_bytes_mut();
    let len = staged.len();
    staged.copy_from_slice(&src[..len]);

    converter.nv21_to_i420(&source.nv21, &mut source.i420)?;
    converter.rotate_i420(&source.i420, &mut rotated.i420, rotation)?;
    converter.i420_to_nv21(&rotated.i420, &mut rotated.nv21)?;
    Ok(())
}

/// Rotate an NV21 frame into a freshly allocated, independently owned frame.
///
/// A zero rotation returns a copy of the first `packed_size(width, height)`
/// bytes of `src`.
pub fn rotate_nv21(src: &[u8], width: u32, height: u32, degrees: i32) -> Result<PackedFrame> {
    rotate_nv21_with(&SoftwareConverter::new(), src, width, height, degrees)
}

/// [`rotate_nv21`] with an explicit backend
pub fn rotate_nv21_with<C: YuvConverter>(
    converter: &C,
    src: &[u8],
    width: u32,
    height: u32,
    degrees: i32,
) -> Result<PackedFrame> {
    let (out_w, out_h) = rotated_dimensions(width, height, degrees);
    let need_dst = packed_size(out_w, out_h)?;

    match plan(src.len(), width, height, degrees, need_dst)? {
        Plan::Copy { len } => Ok(PackedFrame {
            data: src[..len].to_vec(),
            width,
            height,
        }),
        Plan::Rotate {
            rotation,
            source,
            rotated,
            ..
        } => {
            let mut source = ScratchPair::allocate(source)?;
            let mut rotated_pair = ScratchPair::allocate(rotated)?;
            stage(converter, src, &mut source, &mut rotated_pair, rotation)?;
            Ok(PackedFrame {
                data: rotated_pair.nv21.into_vec(),
                width: rotated.width,
                height: rotated.height,
            })
        }
    }
}

/// Rotate an NV21 frame into `dst` without a caller-owned workspace.
///
/// Scratch buffers are allocated for this call only. `dst` must hold at
/// least `packed_size` of the rotated dimensions.
pub fn rotate_nv21_into(
    src: &[u8],
    width: u32,
    height: u32,
    degrees: i32,
    dst: &mut [u8],
) -> Result<()> {
    let converter = SoftwareConverter::new();
    match plan(src.len(), width, height, degrees, dst.len())? {
        Plan::Copy { len } => {
            dst[..len].copy_from_slice(&src[..len]);
            Ok(())
        }
        Plan::Rotate {
            rotation,
            source,
            rotated,
            dst_len,
        } => {
            let mut source = ScratchPair::allocate(source)?;
            let mut rotated = ScratchPair::allocate(rotated)?;
            stage(&converter, src, &mut source, &mut rotated, rotation)?;
            dst[..dst_len].copy_from_slice(rotated.nv21.as_bytes());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(width: u32, height: u32) -> Vec<u8> {
        let n = packed_size(width, height).unwrap();
        (0..n).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn test_plan_zero_rotation_is_copy() {
        assert_eq!(plan(12, 4, 2, 0, 12).unwrap(), Plan::Copy { len: 12 });
        assert_eq!(plan(12, 4, 2, 360, 20).unwrap(), Plan::Copy { len: 12 });
        assert_eq!(plan(12, 4, 2, -720, 12).unwrap(), Plan::Copy { len: 12 });
        // Odd sizes are fine when nothing rotates
        assert_eq!(plan(13, 3, 3, 0, 13).unwrap(), Plan::Copy { len: 13 });
    }

    #[test]
    fn test_plan_checks_order() {
        assert!(matches!(
            plan(12, 3, 2, 90, 12),
            Err(Error::InvalidDimensions(_))
        ));
        assert!(matches!(
            plan(11, 4, 2, 90, 12),
            Err(Error::BufferTooSmall {
                what: "src",
                required: 12,
                actual: 11
            })
        ));
        assert!(matches!(
            plan(12, 4, 2, 270, 10),
            Err(Error::BufferTooSmall {
                what: "dst",
                required: 12,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_rotate_zero_returns_prefix_copy() {
        let mut src = synthetic(4, 2);
        src.extend_from_slice(&[1, 2, 3]);
        let out = rotate_nv21(&src, 4, 2, 0).unwrap();
        assert_eq!(out.data, &src[..12]);
        assert_eq!(out.resolution(), Resolution::new(4, 2));
    }

    #[test]
    fn test_rotate_180_twice_is_identity() {
        let src = synthetic(6, 4);
        let once = rotate_nv21(&src, 6, 4, 180).unwrap();
        assert_ne!(once.data, src);
        let twice = rotate_nv21(&once.data, 6, 4, 180).unwrap();
        assert_eq!(twice.data, src);
    }

    #[test]
    fn test_rotate_into_matches_allocating_variant() {
        let src = synthetic(8, 4);
        let expected = rotate_nv21(&src, 8, 4, 90).unwrap();
        let mut dst = vec![0xAAu8; expected.data.len() + 4];
        rotate_nv21_into(&src, 8, 4, 90, &mut dst).unwrap();
        assert_eq!(&dst[..expected.data.len()], expected.data.as_slice());
        assert_eq!(&dst[expected.data.len()..], &[0xAA; 4]);
    }

    #[test]
    fn test_rotate_nv21_chroma_pairs_stay_together() {
        // 2x2 frame has a single VU pair; any rotation keeps it intact
        let src = [1, 2, 3, 4, 200, 100];
        let out = rotate_nv21(&src, 2, 2, 90).unwrap();
        assert_eq!(out.data, vec![3, 1, 4, 2, 200, 100]);
    }
}
