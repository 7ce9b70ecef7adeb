//! Captured image -> packed NV21
//!
//! The three planes of a flexible YUV 4:2:0 capture are normalized into an
//! I420 scratch frame, which the backend then interleaves into NV21.

use super::buffer::{I420Buffer, Nv21Buffer, OutputPolicy};
use super::convert::{SoftwareConverter, YuvConverter};
use super::plane::{normalize_plane, CHROMA_PAD, LUMA_PAD};
use super::size::{chroma_dimensions, packed_size};
use crate::error::{Error, Result};
use crate::types::{CapturedImage, FrameFormat, PackedFrame, Resolution};

/// Converts captured images to NV21, keeping its planar scratch frame
/// between calls while the capture size stays the same.
pub struct FrameAssembler<C: YuvConverter = SoftwareConverter> {
    converter: C,
    scratch: Option<I420Buffer>,
}

impl FrameAssembler<SoftwareConverter> {
    pub fn new() -> Self {
        Self::with_converter(SoftwareConverter::new())
    }
}

impl Default for FrameAssembler<SoftwareConverter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: YuvConverter> FrameAssembler<C> {
    pub fn with_converter(converter: C) -> Self {
        Self {
            converter,
            scratch: None,
        }
    }

    /// Convert `image` to NV21, obtaining the output buffer per `policy`
    pub fn assemble(
        &mut self,
        image: &CapturedImage<'_>,
        policy: OutputPolicy,
    ) -> Result<PackedFrame> {
        let need = validate_image(image)?;
        policy.check(need)?;

        let res = image.resolution();
        let mut i420 = self.take_scratch(res)?;
        let converter = &self.converter;
        let result = fill_i420(image, &mut i420).and_then(|()| {
            let mut nv21 = Nv21Buffer::from_vec(res.width, res.height, policy.take(need)?)?;
            converter.i420_to_nv21(&i420, &mut nv21)?;
            Ok(nv21)
        });
        self.scratch = Some(i420);

        Ok(PackedFrame {
            data: result?.into_vec(),
            width: res.width,
            height: res.height,
        })
    }

    /// Drop the planar scratch frame
    pub fn release(&mut self) {
        if self.scratch.take().is_some() {
            tracing::debug!("Assembler scratch released");
        }
    }

    fn take_scratch(&mut self, res: Resolution) -> Result<I420Buffer> {
        match self.scratch.take() {
            Some(buf) if buf.resolution() == res => Ok(buf),
            _ => {
                tracing::debug!("Allocating {} I420 assembler scratch", res);
                I420Buffer::allocate(res.width, res.height)
            }
        }
    }
}

/// Check format and dimensions, returning the packed NV21 size.
pub fn validate_image(image: &CapturedImage<'_>) -> Result<usize> {
    if image.format != FrameFormat::Yuv420Flexible {
        return Err(Error::InvalidFormat(format!(
            "image must be {}, got {}",
            FrameFormat::Yuv420Flexible,
            image.format
        )));
    }
    let res = image.resolution();
    if res.width < 2 || res.height < 2 || !res.is_even() {
        return Err(Error::InvalidDimensions(format!(
            "4:2:0 capture must be even and at least 2x2, got {}",
            res
        )));
    }
    packed_size(res.width, res.height)
}

/// Normalize all three planes of `image` into `dst`
fn fill_i420(image: &CapturedImage<'_>, dst: &mut I420Buffer) -> Result<()> {
    let (w, h) = (image.width as usize, image.height as usize);
    let (cw, ch) = chroma_dimensions(image.width, image.height);
    let stride_y = dst.stride_y();
    let stride_uv = dst.stride_uv();

    let (y, u, v) = dst.planes_mut();
    normalize_plane(&image.y, y, stride_y, w, h, LUMA_PAD)?;
    normalize_plane(&image.u, u, stride_uv, cw, ch, CHROMA_PAD)?;
    normalize_plane(&image.v, v, stride_uv, cw, ch, CHROMA_PAD)?;
    Ok(())
}

/// Normalize a captured image into a freshly allocated I420 frame
pub fn image_to_i420(image: &CapturedImage<'_>) -> Result<I420Buffer> {
    validate_image(image)?;
    let mut i420 = I420Buffer::allocate(image.width, image.height)?;
    fill_i420(image, &mut i420)?;
    Ok(i420)
}

/// Convert a captured image to a freshly allocated NV21 frame
pub fn image_to_nv21(image: &CapturedImage<'_>) -> Result<PackedFrame> {
    image_to_nv21_with(image, OutputPolicy::AllocateFresh)
}

/// Convert a captured image to NV21 with an explicit output allocation policy
pub fn image_to_nv21_with(
    image: &CapturedImage<'_>,
    policy: OutputPolicy,
) -> Result<PackedFrame> {
    FrameAssembler::new().assemble(image, policy)
}
