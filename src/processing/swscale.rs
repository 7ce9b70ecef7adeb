//! NV21 <-> I420 reformatting using FFmpeg swscale

use super::buffer::{I420Buffer, Nv21Buffer};
use super::convert::{same_resolution, SoftwareConverter, YuvConverter};
use crate::error::{Error, Result};
use crate::types::Rotation;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{Context as SwsContext, Flags as SwsFlags};

/// Converter that runs the colorspace legs through swscale.
///
/// swscale cannot rotate, so `rotate_i420` uses the scalar backend.
#[derive(Debug, Clone, Copy)]
pub struct SwscaleConverter {
    rotator: SoftwareConverter,
}

impl SwscaleConverter {
    pub fn new() -> Self {
        // Initialize FFmpeg once
        let _ = ffmpeg::init();
        Self {
            rotator: SoftwareConverter::new(),
        }
    }
}

impl Default for SwscaleConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl YuvConverter for SwscaleConverter {
    fn nv21_to_i420(&self, src: &Nv21Buffer, dst: &mut I420Buffer) -> Result<()> {
        same_resolution(src.resolution(), dst.resolution())?;
        let res = src.resolution();
        if res.width == 0 || res.height == 0 {
            return Ok(());
        }

        let (y, vu) = src.planes();
        let mut src_frame = ffmpeg::frame::Video::new(Pixel::NV21, res.width, res.height);
        write_plane(&mut src_frame, 0, y, src.stride());
        write_plane(&mut src_frame, 1, vu, src.stride());

        let mut dst_frame = ffmpeg::frame::Video::new(Pixel::YUV420P, res.width, res.height);
        run_swscale(&src_frame, &mut dst_frame)?;

        let (stride_y, stride_uv) = (dst.stride_y(), dst.stride_uv());
        let (dst_y, dst_u, dst_v) = dst.planes_mut();
        read_plane(&dst_frame, 0, dst_y, stride_y);
        read_plane(&dst_frame, 1, dst_u, stride_uv);
        read_plane(&dst_frame, 2, dst_v, stride_uv);
        Ok(())
    }

    fn i420_to_nv21(&self, src: &I420Buffer, dst: &mut Nv21Buffer) -> Result<()> {
        same_resolution(src.resolution(), dst.resolution())?;
        let res = src.resolution();
        if res.width == 0 || res.height == 0 {
            return Ok(());
        }

        let (y, u, v) = src.planes();
        let mut src_frame = ffmpeg::frame::Video::new(Pixel::YUV420P, res.width, res.height);
        write_plane(&mut src_frame, 0, y, src.stride_y());
        write_plane(&mut src_frame, 1, u, src.stride_uv());
        write_plane(&mut src_frame, 2, v, src.stride_uv());

        let mut dst_frame = ffmpeg::frame::Video::new(Pixel::NV21, res.width, res.height);
        run_swscale(&src_frame, &mut dst_frame)?;

        let stride = dst.stride();
        let (dst_y, dst_vu) = dst.planes_mut();
        read_plane(&dst_frame, 0, dst_y, stride);
        read_plane(&dst_frame, 1, dst_vu, stride);
        Ok(())
    }

    fn rotate_i420(
        &self,
        src: &I420Buffer,
        dst: &mut I420Buffer,
        rotation: Rotation,
    ) -> Result<()> {
        self.rotator.rotate_i420(src, dst, rotation)
    }
}

/// Run a same-size swscale pass between two allocated frames
fn run_swscale(src: &ffmpeg::frame::Video, dst: &mut ffmpeg::frame::Video) -> Result<()> {
    let mut scaler = SwsContext::get(
        src.format(),
        src.width(),
        src.height(),
        dst.format(),
        dst.width(),
        dst.height(),
        SwsFlags::POINT,
    )
    .map_err(|e| Error::ColorspaceConversion(format!("Failed to create scaler: {}", e)))?;

    scaler
        .run(src, dst)
        .map_err(|e| Error::ColorspaceConversion(format!("Conversion failed: {}", e)))
}

/// Copy a tightly packed plane into a frame plane with its own stride
fn write_plane(frame: &mut ffmpeg::frame::Video, index: usize, src: &[u8], row_len: usize) {
    let stride = frame.stride(index);
    let plane = frame.data_mut(index);
    for (row, dst) in src.chunks_exact(row_len).zip(plane.chunks_mut(stride)) {
        dst[..row_len].copy_from_slice(row);
    }
}

/// Copy a frame plane out into a tightly packed plane
fn read_plane(frame: &ffmpeg::frame::Video, index: usize, dst: &mut [u8], row_len: usize) {
    let stride = frame.stride(index);
    let plane = frame.data(index);
    for (row, src) in dst.chunks_exact_mut(row_len).zip(plane.chunks(stride)) {
        row.copy_from_slice(&src[..row_len]);
    }
}
