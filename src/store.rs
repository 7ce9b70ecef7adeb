//! Last-frame store
//!
//! Converts a throttled subset of preview frames to NV21 and keeps the most
//! recent one for a snapshot reader on another thread. Output buffers cycle
//! through a small ring so a frame a reader is still holding is never
//! overwritten; a ring slot is recycled only once nobody else references it.
//!
//! Encoding a snapshot (JPEG or otherwise) is left to the consumer: take
//! [`FrameStore::rotated_latest`] for upright pixels, or keep the stored
//! orientation and tag the file with [`Rotation::exif_orientation`].
//!
//! [`Rotation::exif_orientation`]: crate::types::Rotation::exif_orientation

use crate::config::StoreConfig;
use crate::error::Result;
use crate::processing::{rotate_nv21, FrameAssembler, OutputPolicy};
use crate::types::{CapturedImage, PackedFrame};

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;

/// A converted frame and when it was accepted
#[derive(Debug)]
pub struct StoredFrame {
    pub frame: PackedFrame,
    pub captured_at: Instant,
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Frames converted and published
    pub accepted: u64,
    /// Frames skipped by the rate limit
    pub throttled: u64,
    /// Frames that failed conversion
    pub dropped: u64,
    /// Accepted frames written into a recycled ring buffer
    pub buffers_reused: u64,
}

struct WriterState {
    assembler: FrameAssembler,
    ring: Vec<Option<Arc<StoredFrame>>>,
    ring_idx: usize,
    last_accept: Option<Instant>,
    stats: StoreStats,
}

/// Keeps the latest accepted camera frame as NV21
pub struct FrameStore {
    config: StoreConfig,
    writer: Mutex<WriterState>,
    latest: RwLock<Option<Arc<StoredFrame>>>,
}

impl FrameStore {
    pub fn new(config: StoreConfig) -> Self {
        let ring_size = config.ring_size.max(1);
        Self {
            config,
            writer: Mutex::new(WriterState {
                assembler: FrameAssembler::new(),
                ring: vec![None; ring_size],
                ring_idx: 0,
                last_accept: None,
                stats: StoreStats::default(),
            }),
            latest: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Convert and publish `image` unless the previous accepted frame is less
    /// than the configured interval older than `now`.
    ///
    /// Returns `Ok(false)` when throttled. A conversion error drops the frame
    /// and leaves the previously published frame in place.
    pub fn accept(&self, image: &CapturedImage<'_>, now: Instant) -> Result<bool> {
        let mut guard = self.writer.lock();
        let state = &mut *guard;

        if let Some(prev) = state.last_accept {
            if now.saturating_duration_since(prev) < self.config.min_interval() {
                state.stats.throttled += 1;
                return Ok(false);
            }
        }

        let idx = state.ring_idx;
        let recycled = state.ring[idx]
            .take()
            .and_then(|stored| Arc::try_unwrap(stored).ok())
            .map(|stored| stored.frame.into_data());
        let reused = recycled.is_some();
        let policy = match recycled {
            Some(buf) => OutputPolicy::ReuseIfMatching(buf),
            None => OutputPolicy::AllocateFresh,
        };

        let frame = match state.assembler.assemble(image, policy) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Dropping {} frame: {}", image.resolution(), e);
                state.stats.dropped += 1;
                return Err(e);
            }
        };

        let stored = Arc::new(StoredFrame {
            frame,
            captured_at: now,
        });
        state.ring[idx] = Some(Arc::clone(&stored));
        state.ring_idx = (idx + 1) % state.ring.len();
        state.last_accept = Some(now);
        state.stats.accepted += 1;
        if reused {
            state.stats.buffers_reused += 1;
        }
        *self.latest.write() = Some(stored);

        Ok(true)
    }

    /// [`accept`](Self::accept) stamped with the current time
    pub fn accept_now(&self, image: &CapturedImage<'_>) -> Result<bool> {
        self.accept(image, Instant::now())
    }

    /// Most recently published frame
    pub fn latest(&self) -> Option<Arc<StoredFrame>> {
        self.latest.read().clone()
    }

    pub fn has_frame(&self) -> bool {
        self.latest.read().is_some()
    }

    /// Copy of the latest frame rotated clockwise by `degrees`
    pub fn rotated_latest(&self, degrees: i32) -> Result<Option<PackedFrame>> {
        let Some(stored) = self.latest() else {
            return Ok(None);
        };
        let frame = &stored.frame;
        rotate_nv21(&frame.data, frame.width, frame.height, degrees).map(Some)
    }

    pub fn stats(&self) -> StoreStats {
        self.writer.lock().stats
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
