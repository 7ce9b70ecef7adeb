//! Common types used throughout camyuv

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Frame resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Default camera preview size
    pub const VGA: Self = Self::new(640, 480);

    /// Width and height swapped
    pub const fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Both dimensions even, as 4:2:0 chroma subsampling requires
    pub fn is_even(&self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel format reported by the capture source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameFormat {
    /// Flexible YUV 4:2:0, three planes with arbitrary strides (the only accepted input)
    Yuv420Flexible,
    /// NV21 - Y plane + interleaved VU (output only)
    Nv21,
}

impl FrameFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            FrameFormat::Yuv420Flexible => "YUV_420_888",
            FrameFormat::Nv21 => "NV21",
        }
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        FrameFormat::Yuv420Flexible
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Axis-aligned clockwise rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation (0 degrees)
    #[default]
    Rotation0,
    /// Rotate 90 degrees clockwise
    Rotation90,
    /// Rotate 180 degrees
    Rotation180,
    /// Rotate 270 degrees clockwise (90 degrees counter-clockwise)
    Rotation270,
}

impl Rotation {
    /// Normalize an angle in degrees into `[0, 360)` and map it to a rotation.
    ///
    /// Negative angles wrap (`-90` is `Rotation270`). Angles that are not a
    /// multiple of 90 map to `Rotation0`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Rotation90,
            180 => Rotation::Rotation180,
            270 => Rotation::Rotation270,
            _ => Rotation::Rotation0,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }

    /// Does this rotation swap width and height?
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Rotation90 | Rotation::Rotation270)
    }

    /// Rotation that undoes this one
    pub fn inverse(&self) -> Self {
        match self {
            Rotation::Rotation0 => Rotation::Rotation0,
            Rotation::Rotation90 => Rotation::Rotation270,
            Rotation::Rotation180 => Rotation::Rotation180,
            Rotation::Rotation270 => Rotation::Rotation90,
        }
    }

    /// EXIF orientation tag value describing this rotation
    pub fn exif_orientation(&self) -> u16 {
        match self {
            Rotation::Rotation0 => 1,
            Rotation::Rotation90 => 6,
            Rotation::Rotation180 => 3,
            Rotation::Rotation270 => 8,
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Borrowed view over one color plane of a captured image.
///
/// `row_stride` is the byte distance between rows and `pixel_stride` the byte
/// distance between samples in a row. The slice may be shorter than
/// `row_stride * height`; the normalizer pads whatever is missing.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    data: &'a [u8],
    row_stride: usize,
    pixel_stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Result<Self> {
        if pixel_stride == 0 {
            return Err(Error::InvalidDimensions("pixel stride must be at least 1".into()));
        }
        Ok(Self {
            data,
            row_stride,
            pixel_stride,
        })
    }

    /// Tightly packed plane: one byte per sample, rows `width` bytes apart
    pub fn packed(data: &'a [u8], width: usize) -> Self {
        Self {
            data,
            row_stride: width,
            pixel_stride: 1,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }
}

/// A captured image as delivered by the camera: Y, U (Cb) and V (Cr) planes.
#[derive(Debug, Clone, Copy)]
pub struct CapturedImage<'a> {
    pub format: FrameFormat,
    pub width: u32,
    pub height: u32,
    pub y: Plane<'a>,
    pub u: Plane<'a>,
    pub v: Plane<'a>,
}

impl<'a> CapturedImage<'a> {
    pub fn new(width: u32, height: u32, y: Plane<'a>, u: Plane<'a>, v: Plane<'a>) -> Self {
        Self {
            format: FrameFormat::Yuv420Flexible,
            width,
            height,
            y,
            u,
            v,
        }
    }

    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Tightly packed NV21 frame owned by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedFrame {
    /// Y plane followed by interleaved VU
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PackedFrame {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
