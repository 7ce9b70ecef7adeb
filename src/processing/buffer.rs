//! Owned 4:2:0 frame buffers
//!
//! Both layouts occupy [`packed_size`] bytes. They differ only in how the
//! chroma half is arranged.

use super::size::{chroma_dimensions, packed_size};
use crate::error::{Error, Result};
use crate::types::Resolution;

/// Planar 4:2:0: Y plane, then U plane, then V plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I420Buffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl I420Buffer {
    /// Allocate a zeroed buffer for a `width` x `height` frame
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            data: vec![0u8; packed_size(width, height)?],
        })
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Row stride of the Y plane
    pub fn stride_y(&self) -> usize {
        self.width as usize
    }

    /// Row stride of the U and V planes
    pub fn stride_uv(&self) -> usize {
        self.width as usize / 2
    }

    /// Y, U and V planes
    pub fn planes(&self) -> (&[u8], &[u8], &[u8]) {
        let (y_len, c_len) = self.plane_lengths();
        let (y, chroma) = self.data.split_at(y_len);
        let (u, v) = chroma.split_at(c_len);
        (y, u, &v[..c_len])
    }

    /// Mutable Y, U and V planes
    pub fn planes_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        let (y_len, c_len) = self.plane_lengths();
        let (y, chroma) = self.data.split_at_mut(y_len);
        let (u, v) = chroma.split_at_mut(c_len);
        (y, u, &mut v[..c_len])
    }

    #[cfg(test)]
    pub(crate) fn storage_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    fn plane_lengths(&self) -> (usize, usize) {
        let (cw, ch) = chroma_dimensions(self.width, self.height);
        (self.width as usize * self.height as usize, cw * ch)
    }
}

/// Semi-planar 4:2:0: Y plane, then interleaved V/U pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nv21Buffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Nv21Buffer {
    /// Allocate a zeroed buffer for a `width` x `height` frame
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            data: vec![0u8; packed_size(width, height)?],
        })
    }

    /// Wrap an existing allocation; its length must be exactly the frame size
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let required = packed_size(width, height)?;
        if data.len() != required {
            return Err(Error::BufferSizeMismatch {
                what: "NV21",
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Row stride of both the Y plane and the VU plane
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    /// Y plane and interleaved VU plane
    pub fn planes(&self) -> (&[u8], &[u8]) {
        let y_len = self.width as usize * self.height as usize;
        let (y, vu) = self.data.split_at(y_len);
        (y, &vu[..self.vu_len()])
    }

    /// Mutable Y plane and interleaved VU plane
    pub fn planes_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        let y_len = self.width as usize * self.height as usize;
        let vu_len = self.vu_len();
        let (y, vu) = self.data.split_at_mut(y_len);
        (y, &mut vu[..vu_len])
    }

    #[cfg(test)]
    pub(crate) fn storage_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    fn vu_len(&self) -> usize {
        let (cw, ch) = chroma_dimensions(self.width, self.height);
        cw * ch * 2
    }
}

/// How an output buffer is obtained for a conversion result
#[derive(Debug, Default)]
pub enum OutputPolicy {
    /// Always allocate a new buffer
    #[default]
    AllocateFresh,
    /// Reuse the given buffer if its length matches exactly, otherwise allocate
    ReuseIfMatching(Vec<u8>),
    /// Reuse the given buffer; fail unless its length matches exactly
    RequireExact(Vec<u8>),
}

impl OutputPolicy {
    /// Produce a buffer of exactly `required` bytes according to the policy.
    ///
    /// Reused buffers keep their old contents; callers overwrite every byte.
    pub fn take(self, required: usize) -> Result<Vec<u8>> {
        match self {
            OutputPolicy::AllocateFresh => Ok(vec![0u8; required]),
            OutputPolicy::ReuseIfMatching(buf) if buf.len() == required => Ok(buf),
            OutputPolicy::ReuseIfMatching(_) => Ok(vec![0u8; required]),
            OutputPolicy::RequireExact(buf) if buf.len() == required => Ok(buf),
            OutputPolicy::RequireExact(buf) => Err(Error::BufferSizeMismatch {
                what: "output",
                required,
                actual: buf.len(),
            }),
        }
    }

    /// Check the policy can be satisfied without consuming it
    pub(crate) fn check(&self, required: usize) -> Result<()> {
        match self {
            OutputPolicy::RequireExact(buf) if buf.len() != required => {
                Err(Error::BufferSizeMismatch {
                    what: "output",
                    required,
                    actual: buf.len(),
                })
            }
            _ => Ok(()),
        }
    }
}
