//! Colorspace reformatting and rotation backend
//!
//! The pipeline only ever asks a backend for three things: NV21 -> I420,
//! I420 -> NV21, and rotating an I420 frame. Sizing, allocation and staging
//! all happen in the callers; a backend only checks that the buffers it is
//! handed agree with each other.

use super::buffer::{I420Buffer, Nv21Buffer};
use super::size::chroma_dimensions;
use crate::error::{Error, Result};
use crate::types::{Resolution, Rotation};

/// Trait for 4:2:0 conversion backends
pub trait YuvConverter {
    /// De-interleave the VU plane into separate U and V planes
    fn nv21_to_i420(&self, src: &Nv21Buffer, dst: &mut I420Buffer) -> Result<()>;

    /// Interleave U and V planes into a VU plane
    fn i420_to_nv21(&self, src: &I420Buffer, dst: &mut Nv21Buffer) -> Result<()>;

    /// Rotate all three planes clockwise by `rotation`
    fn rotate_i420(&self, src: &I420Buffer, dst: &mut I420Buffer, rotation: Rotation)
        -> Result<()>;
}

/// Scalar CPU backend
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareConverter;

impl SoftwareConverter {
    pub fn new() -> Self {
        Self
    }
}

impl YuvConverter for SoftwareConverter {
    fn nv21_to_i420(&self, src: &Nv21Buffer, dst: &mut I420Buffer) -> Result<()> {
        same_resolution(src.resolution(), dst.resolution())?;

        let (src_y, src_vu) = src.planes();
        let (dst_y, dst_u, dst_v) = dst.planes_mut();
        dst_y.copy_from_slice(src_y);

        for ((vu, u), v) in src_vu
            .chunks_exact(2)
            .zip(dst_u.iter_mut())
            .zip(dst_v.iter_mut())
        {
            *v = vu[0];
            *u = vu[1];
        }

        Ok(())
    }

    fn i420_to_nv21(&self, src: &I420Buffer, dst: &mut Nv21Buffer) -> Result<()> {
        same_resolution(src.resolution(), dst.resolution())?;

        let (src_y, src_u, src_v) = src.planes();
        let (dst_y, dst_vu) = dst.planes_mut();
        dst_y.copy_from_slice(src_y);

        for ((vu, u), v) in dst_vu
            .chunks_exact_mut(2)
            .zip(src_u.iter())
            .zip(src_v.iter())
        {
            vu[0] = *v;
            vu[1] = *u;
        }

        Ok(())
    }

    fn rotate_i420(
        &self,
        src: &I420Buffer,
        dst: &mut I420Buffer,
        rotation: Rotation,
    ) -> Result<()> {
        let from = src.resolution();
        let expected = if rotation.swaps_dimensions() {
            from.transposed()
        } else {
            from
        };
        same_resolution(expected, dst.resolution())?;

        let (w, h) = (from.width as usize, from.height as usize);
        let (cw, ch) = chroma_dimensions(from.width, from.height);

        let (src_y, src_u, src_v) = src.planes();
        let (dst_y, dst_u, dst_v) = dst.planes_mut();
        rotate_plane(src_y, dst_y, w, h, rotation);
        rotate_plane(src_u, dst_u, cw, ch, rotation);
        rotate_plane(src_v, dst_v, cw, ch, rotation);

        Ok(())
    }
}

pub(super) fn same_resolution(expected: Resolution, actual: Resolution) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidDimensions(format!(
            "conversion expects {} destination, got {}",
            expected, actual
        )));
    }
    Ok(())
}

/// Rotate one tightly packed `w` x `h` plane clockwise into `dst`.
fn rotate_plane(src: &[u8], dst: &mut [u8], w: usize, h: usize, rotation: Rotation) {
    if w == 0 || h == 0 {
        return;
    }
    match rotation {
        Rotation::Rotation0 => dst[..w * h].copy_from_slice(&src[..w * h]),
        Rotation::Rotation180 => {
            for (d, s) in dst[..w * h].iter_mut().zip(src[..w * h].iter().rev()) {
                *d = *s;
            }
        }
        // Output is h wide and w tall
        Rotation::Rotation90 => {
            for (y, row) in dst.chunks_exact_mut(h).take(w).enumerate() {
                for (x, d) in row.iter_mut().enumerate() {
                    *d = src[(h - 1 - x) * w + y];
                }
            }
        }
        Rotation::Rotation270 => {
            for (y, row) in dst.chunks_exact_mut(h).take(w).enumerate() {
                for (x, d) in row.iter_mut().enumerate() {
                    *d = src[x * w + (w - 1 - y)];
                }
            }
        }
    }
}
