//! Frame processing module
//!
//! Provides the capture-to-NV21 path:
//! - Strided plane normalization
//! - Planar -> NV21 assembly
//! - NV21 rotation with reusable scratch buffers
//!
//! With the `ffmpeg` feature, `SwscaleConverter` handles the NV21 <-> I420
//! legs through FFmpeg swscale.

mod assemble;
mod buffer;
mod convert;
mod plane;
mod rotate;
mod size;
#[cfg(feature = "ffmpeg")]
mod swscale;
mod workspace;

pub use assemble::{
    image_to_i420, image_to_nv21, image_to_nv21_with, validate_image, FrameAssembler,
};
pub use buffer::{I420Buffer, Nv21Buffer, OutputPolicy};
pub use convert::{SoftwareConverter, YuvConverter};
pub use plane::{normalize_plane, CHROMA_PAD, LUMA_PAD};
pub use rotate::{rotate_nv21, rotate_nv21_into, rotate_nv21_with};
pub use size::{packed_size, rotated_dimensions};
#[cfg(feature = "ffmpeg")]
pub use swscale::SwscaleConverter;
pub use workspace::{RotationWorkspace, SharedWorkspace, WorkspaceStats};
