//! camyuv: camera YUV 4:2:0 staging
//!
//! Turns the three-plane YUV captures camera HALs deliver (padded rows,
//! strided chroma, occasionally truncated buffers) into tightly packed NV21,
//! and rotates NV21 frames by 90/180/270 degrees without allocating on every
//! frame.
//!
//! # Features
//!
//! - **Normalize**: strided plane copy with deterministic padding
//! - **Assemble**: captured planes -> NV21
//! - **Rotate**: NV21 rotation through reusable scratch buffers
//! - **Store**: throttled last-frame store for snapshot readers
//!
//! # Example
//!
//! ```rust
//! use camyuv::{image_to_nv21, CapturedImage, Plane, RotationWorkspace};
//!
//! # fn main() -> camyuv::Result<()> {
//! let y = [16u8; 8];
//! let u = [128u8; 2];
//! let v = [128u8; 2];
//! let image = CapturedImage::new(
//!     4,
//!     2,
//!     Plane::packed(&y, 4),
//!     Plane::packed(&u, 2),
//!     Plane::packed(&v, 2),
//! );
//! let frame = image_to_nv21(&image)?;
//!
//! let mut workspace = RotationWorkspace::new();
//! let mut rotated = vec![0u8; frame.data.len()];
//! let res = workspace.rotate_into(&frame.data, 4, 2, 90, &mut rotated)?;
//! assert_eq!((res.width, res.height), (2, 4));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod processing;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::{Config, RotationConfig, StoreConfig};
pub use error::{Error, Result};
pub use processing::{
    image_to_nv21, image_to_nv21_with, packed_size, rotate_nv21, rotate_nv21_into,
    rotated_dimensions, FrameAssembler, OutputPolicy, RotationWorkspace, SharedWorkspace,
};
#[cfg(feature = "ffmpeg")]
pub use processing::SwscaleConverter;
pub use store::{FrameStore, StoredFrame};
pub use types::{CapturedImage, FrameFormat, PackedFrame, Plane, Resolution, Rotation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pixel formats accepted as capture input
pub fn supported_input_formats() -> &'static [FrameFormat] {
    &[FrameFormat::Yuv420Flexible]
}
