//! Reusable rotation scratch space
//!
//! A camera stream delivers thousands of frames at the same size, so the four
//! intermediate buffers of a rotation are kept between calls and replaced
//! only when the dimensions they were sized for change.

use super::convert::{SoftwareConverter, YuvConverter};
use super::rotate::{plan, stage, Plan, ScratchPair};
use super::size::rotated_dimensions;
use crate::error::Result;
use crate::types::{Resolution, Rotation};

use parking_lot::Mutex;
use std::sync::Arc;

/// Scratch pairs of a ready workspace
#[derive(Debug)]
struct Scratch {
    /// Sized for the input frame
    source: ScratchPair,
    /// Sized for the rotated frame
    rotated: ScratchPair,
}

/// Workspace counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkspaceStats {
    /// Times the source-sized pair was (re)allocated
    pub source_allocations: u64,
    /// Times the rotated-sized pair was (re)allocated
    pub rotated_allocations: u64,
    /// Frames staged through the backend
    pub frames_rotated: u64,
    /// Frames handled by the zero-rotation copy
    pub frames_copied: u64,
}

/// Rotation scratch buffers kept across frames.
///
/// Holds at most one NV21 and one I420 buffer at the source size and one of
/// each at the rotated size. Not for concurrent use; give each stream its own
/// workspace or share one through [`SharedWorkspace`].
#[derive(Debug)]
pub struct RotationWorkspace<C: YuvConverter = SoftwareConverter> {
    converter: C,
    /// `None` until the first rotation, and again after `close`
    scratch: Option<Scratch>,
    stats: WorkspaceStats,
}

impl RotationWorkspace<SoftwareConverter> {
    pub fn new() -> Self {
        Self::with_converter(SoftwareConverter::new())
    }
}

impl Default for RotationWorkspace<SoftwareConverter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: YuvConverter> RotationWorkspace<C> {
    pub fn with_converter(converter: C) -> Self {
        Self {
            converter,
            scratch: None,
            stats: WorkspaceStats::default(),
        }
    }

    /// Make sure scratch buffers exist for a `width` x `height` source rotated
    /// by `degrees`. Returns the rotated resolution.
    ///
    /// The source pair and the rotated pair are checked independently: a new
    /// angle at the same source size only replaces the rotated pair, and only
    /// if it changes the rotated dimensions.
    pub fn ensure(&mut self, width: u32, height: u32, degrees: i32) -> Result<Resolution> {
        let scratch = ready_scratch(&mut self.scratch, &mut self.stats, width, height, degrees)?;
        Ok(scratch.rotated.resolution)
    }

    /// Rotate NV21 `src` into `dst`, reusing this workspace's scratch buffers.
    ///
    /// Returns the resolution of the frame written to `dst`.
    pub fn rotate_into(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        degrees: i32,
        dst: &mut [u8],
    ) -> Result<Resolution> {
        match plan(src.len(), width, height, degrees, dst.len())? {
            Plan::Copy { len } => {
                dst[..len].copy_from_slice(&src[..len]);
                self.stats.frames_copied += 1;
                Ok(Resolution::new(width, height))
            }
            Plan::Rotate {
                rotation, dst_len, ..
            } => {
                let scratch =
                    ready_scratch(&mut self.scratch, &mut self.stats, width, height, degrees)?;
                stage_into(&self.converter, scratch, src, rotation, &mut dst[..dst_len])?;
                let rotated_res = scratch.rotated.resolution;
                self.stats.frames_rotated += 1;
                Ok(rotated_res)
            }
        }
    }

    /// Release all scratch buffers. A later call allocates them again.
    pub fn close(&mut self) {
        if self.scratch.take().is_some() {
            tracing::debug!("Rotation workspace closed");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.scratch.is_some()
    }

    /// Source size the scratch buffers are currently allocated for
    pub fn source_resolution(&self) -> Option<Resolution> {
        self.scratch.as_ref().map(|s| s.source.resolution)
    }

    /// Rotated size the scratch buffers are currently allocated for
    pub fn rotated_resolution(&self) -> Option<Resolution> {
        self.scratch.as_ref().map(|s| s.rotated.resolution)
    }

    pub fn stats(&self) -> WorkspaceStats {
        self.stats
    }

    /// Storage addresses of the source pair and the rotated pair
    #[cfg(test)]
    fn storage(&self) -> Option<([*const u8; 2], [*const u8; 2])> {
        self.scratch.as_ref().map(|s| {
            (
                [s.source.nv21.storage_ptr(), s.source.i420.storage_ptr()],
                [s.rotated.i420.storage_ptr(), s.rotated.nv21.storage_ptr()],
            )
        })
    }
}

/// Bring `slot` to the sizes needed for this frame and hand back its pairs
fn ready_scratch<'a>(
    slot: &'a mut Option<Scratch>,
    stats: &mut WorkspaceStats,
    width: u32,
    height: u32,
    degrees: i32,
) -> Result<&'a mut Scratch> {
    let source_res = Resolution::new(width, height);
    let (out_w, out_h) = rotated_dimensions(width, height, degrees);
    let rotated_res = Resolution::new(out_w, out_h);

    match *slot {
        Some(ref mut scratch) => {
            if scratch.source.resolution != source_res {
                tracing::debug!(
                    "Reallocating source scratch {} -> {}",
                    scratch.source.resolution,
                    source_res
                );
                scratch.source = ScratchPair::allocate(source_res)?;
                stats.source_allocations += 1;
            }
            if scratch.rotated.resolution != rotated_res {
                tracing::debug!(
                    "Reallocating rotated scratch {} -> {}",
                    scratch.rotated.resolution,
                    rotated_res
                );
                scratch.rotated = ScratchPair::allocate(rotated_res)?;
                stats.rotated_allocations += 1;
            }
            Ok(scratch)
        }
        None => {
            tracing::debug!(
                "Allocating rotation scratch: source {}, rotated {}",
                source_res,
                rotated_res
            );
            let scratch = Scratch {
                source: ScratchPair::allocate(source_res)?,
                rotated: ScratchPair::allocate(rotated_res)?,
            };
            stats.source_allocations += 1;
            stats.rotated_allocations += 1;
            Ok(slot.insert(scratch))
        }
    }
}

fn stage_into<C: YuvConverter>(
    converter: &C,
    scratch: &mut Scratch,
    src: &[u8],
    rotation: Rotation,
    dst: &mut [u8],
) -> Result<()> {
    stage(converter, src, &mut scratch.source, &mut scratch.rotated, rotation)?;
    dst.copy_from_slice(scratch.rotated.nv21.as_bytes());
    Ok(())
}

/// A [`RotationWorkspace`] behind a mutex, for streams that cannot own one.
///
/// Callers are serialized: a second frame waits for the first to finish.
#[derive(Debug)]
pub struct SharedWorkspace<C: YuvConverter = SoftwareConverter> {
    inner: Arc<Mutex<RotationWorkspace<C>>>,
}

impl SharedWorkspace<SoftwareConverter> {
    pub fn new() -> Self {
        Self::from_workspace(RotationWorkspace::new())
    }
}

impl Default for SharedWorkspace<SoftwareConverter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: YuvConverter> SharedWorkspace<C> {
    pub fn from_workspace(workspace: RotationWorkspace<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(workspace)),
        }
    }

    pub fn rotate_into(
        &self,
        src: &[u8],
        width: u32,
        height: u32,
        degrees: i32,
        dst: &mut [u8],
    ) -> Result<Resolution> {
        self.inner.lock().rotate_into(src, width, height, degrees, dst)
    }

    pub fn close(&self) {
        self.inner.lock().close();
    }

    pub fn stats(&self) -> WorkspaceStats {
        self.inner.lock().stats()
    }
}

impl<C: YuvConverter> Clone for SharedWorkspace<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::processing::size::packed_size;

    fn synthetic(width: u32, height: u32) -> Vec<u8> {
        let n = packed_size(width, height).unwrap();
        (0..n).map(|i| (i * 13 % 256) as u8).collect()
    }

    #[test]
    fn test_ensure_reallocates_only_changed_pair() {
        let mut ws = RotationWorkspace::new();
        assert!(ws.storage().is_none());

        assert_eq!(ws.ensure(640, 480, 90).unwrap(), Resolution::new(480, 640));
        let (src1, rot1) = ws.storage().unwrap();

        ws.ensure(640, 480, 90).unwrap();
        let (src2, rot2) = ws.storage().unwrap();
        assert_eq!(src1, src2);
        assert_eq!(rot1, rot2);

        assert_eq!(ws.ensure(640, 480, 180).unwrap(), Resolution::new(640, 480));
        let (src3, rot3) = ws.storage().unwrap();
        assert_eq!(src2, src3);
        assert_ne!(rot2[0], rot3[0]);
        assert_ne!(rot2[1], rot3[1]);

        let stats = ws.stats();
        assert_eq!(stats.source_allocations, 1);
        assert_eq!(stats.rotated_allocations, 2);
    }

    #[test]
    fn test_ensure_same_rotated_size_keeps_rotated_pair() {
        let mut ws = RotationWorkspace::new();
        ws.ensure(640, 480, 90).unwrap();
        let (_, rot1) = ws.storage().unwrap();
        ws.ensure(640, 480, 270).unwrap();
        let (_, rot2) = ws.storage().unwrap();
        assert_eq!(rot1, rot2);
        assert_eq!(ws.stats().rotated_allocations, 1);
    }

    #[test]
    fn test_ensure_new_source_size() {
        let mut ws = RotationWorkspace::new();
        ws.ensure(640, 480, 0).unwrap();
        let (src1, rot1) = ws.storage().unwrap();
        ws.ensure(480, 640, 90).unwrap();
        let (src2, rot2) = ws.storage().unwrap();
        assert_ne!(src1, src2);
        // 480x640 rotated by 90 is 640x480 again
        assert_eq!(rot1, rot2);
        assert_eq!(ws.source_resolution(), Some(Resolution::new(480, 640)));
        assert_eq!(ws.rotated_resolution(), Some(Resolution::new(640, 480)));
    }

    #[test]
    fn test_close_returns_to_uninitialized() {
        let mut ws = RotationWorkspace::new();
        ws.ensure(64, 48, 90).unwrap();
        assert!(ws.is_ready());
        ws.close();
        assert!(!ws.is_ready());
        assert_eq!(ws.rotated_resolution(), None);

        ws.ensure(64, 48, 90).unwrap();
        assert!(ws.is_ready());
        assert_eq!(ws.stats().source_allocations, 2);
    }

    #[test]
    fn test_rotate_after_close_allocates_again() {
        let src = synthetic(8, 4);
        let expected = crate::processing::rotate_nv21(&src, 8, 4, 270).unwrap();
        let mut ws = RotationWorkspace::new();
        let mut dst = vec![0u8; src.len()];

        ws.rotate_into(&src, 8, 4, 270, &mut dst).unwrap();
        ws.close();
        dst.fill(0);
        let res = ws.rotate_into(&src, 8, 4, 270, &mut dst).unwrap();

        assert_eq!(res, Resolution::new(4, 8));
        assert_eq!(dst, expected.data);
        assert!(ws.is_ready());
        assert_eq!(ws.stats().source_allocations, 2);
        assert_eq!(ws.stats().rotated_allocations, 2);
    }

    #[test]
    fn test_rotate_into_matches_one_shot() {
        let src = synthetic(16, 8);
        let mut ws = RotationWorkspace::new();
        for degrees in [90, 180, 270, -90, 90] {
            let expected = crate::processing::rotate_nv21(&src, 16, 8, degrees).unwrap();
            let mut dst = vec![0u8; expected.data.len()];
            let res = ws.rotate_into(&src, 16, 8, degrees, &mut dst).unwrap();
            assert_eq!(res, expected.resolution());
            assert_eq!(dst, expected.data);
        }
        assert_eq!(ws.stats().frames_rotated, 5);
        assert_eq!(ws.stats().source_allocations, 1);
    }

    #[test]
    fn test_zero_rotation_skips_scratch() {
        let src = synthetic(6, 4);
        let mut dst = vec![0u8; src.len()];
        let mut ws = RotationWorkspace::new();
        ws.rotate_into(&src, 6, 4, 360, &mut dst).unwrap();
        assert_eq!(dst, src);
        assert!(!ws.is_ready());
        assert_eq!(ws.stats().frames_copied, 1);
    }

    #[test]
    fn test_failed_validation_has_no_side_effects() {
        let src = synthetic(6, 4);
        let mut ws = RotationWorkspace::new();

        let mut small = vec![0u8; 10];
        let err = ws.rotate_into(&src, 6, 4, 90, &mut small).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { .. }));

        let mut dst = vec![0u8; 64];
        let err = ws.rotate_into(&src, 5, 4, 90, &mut dst).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions(_)));

        assert!(!ws.is_ready());
        assert_eq!(ws.stats(), WorkspaceStats::default());
    }

    #[test]
    fn test_shared_workspace_across_threads() {
        let shared = SharedWorkspace::new();
        let src = synthetic(8, 4);
        let expected = crate::processing::rotate_nv21(&src, 8, 4, 90).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let src = src.clone();
                std::thread::spawn(move || {
                    let mut dst = vec![0u8; src.len()];
                    shared.rotate_into(&src, 8, 4, 90, &mut dst).unwrap();
                    dst
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected.data);
        }
        assert_eq!(shared.stats().frames_rotated, 4);
        assert_eq!(shared.stats().source_allocations, 1);
    }
}
